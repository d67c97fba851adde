use clap::{Parser, Subcommand, ValueEnum};
use promo_harvest::parsers::PromoFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "promo-harvest")]
#[command(about = "Scrapes the deals catalog of a retail site into SQLite")]
#[command(version)]
pub struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides the configuration)
    #[arg(long)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk the deals catalog and store every listing
    Scrape {
        /// Maximum number of catalog pages to scrape
        #[arg(short, long)]
        max_pages: Option<usize>,

        /// Run the browser without a window
        #[arg(long)]
        headless: bool,
    },

    /// Print stored deals as JSON, cheapest first
    Export {
        /// Maximum number of deals
        #[arg(short, long, default_value_t = promo_harvest::store::VIEWER_LIMIT)]
        limit: usize,

        /// Promotion kind to keep
        #[arg(long, value_enum, default_value_t = PromoArg::All)]
        promo: PromoArg,

        /// Keep deals whose seller contains this text
        #[arg(long)]
        seller: Option<String>,

        /// Keep deals whose name, description or features contain this text
        #[arg(short, long)]
        query: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PromoArg {
    All,
    Percent,
    Euro,
    None,
}

/// Convert from CLI argument promo kind to the record filter
pub fn convert_promo(arg: PromoArg) -> PromoFilter {
    match arg {
        PromoArg::All => PromoFilter::All,
        PromoArg::Percent => PromoFilter::Percent,
        PromoArg::Euro => PromoFilter::Euro,
        PromoArg::None => PromoFilter::None,
    }
}
