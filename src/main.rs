use clap::Parser;
use promo_harvest::parsers::DealFilter;
use promo_harvest::{Harvest, ScraperConfig, SqliteStore};
use std::process::ExitCode;

mod args;
use args::{Args, Command, convert_promo};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match ScraperConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                ::log::error!("Failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => ScraperConfig::default(),
    };
    if let Some(db) = &args.db {
        config.db_path = db.display().to_string();
    }

    let mut store = match SqliteStore::open(&config.db_path) {
        Ok(store) => store,
        Err(e) => {
            ::log::error!("Failed to open {}: {}", config.db_path, e);
            return ExitCode::FAILURE;
        }
    };

    match args.command {
        Command::Scrape {
            max_pages,
            headless,
        } => {
            println!("Note: scraping requires a WebDriver server (e.g., ChromeDriver).");
            println!(
                "Set WEBDRIVER_URL environment variable if not using the default {}",
                config.webdriver_url
            );

            let mut harvest = Harvest::new(config);
            if headless {
                harvest = harvest.with_headless(true);
            }
            if let Some(max_pages) = max_pages {
                harvest = harvest.with_max_pages(max_pages);
            }

            let start_time = std::time::Instant::now();
            match harvest.run(&mut store).await {
                Ok(report) => {
                    ::log::info!(
                        "Scrape complete - {} records from {} pages in {:.2} seconds ({:?})",
                        report.records,
                        report.pages,
                        start_time.elapsed().as_secs_f64(),
                        report.status
                    );
                    if report.is_success() {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::FAILURE
                    }
                }
                Err(e) => {
                    ::log::error!("Failed to start scraping: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Command::Export {
            limit,
            promo,
            seller,
            query,
        } => {
            let filter = DealFilter {
                query,
                seller,
                promo: convert_promo(promo),
            };
            let deals = match store.deals_for_viewer(limit) {
                Ok(deals) => deals,
                Err(e) => {
                    ::log::error!("Failed to read deals: {}", e);
                    return ExitCode::FAILURE;
                }
            };

            let kept = deals
                .into_iter()
                .filter(|deal| filter.matches(deal))
                .collect::<Vec<_>>();
            ::log::debug!("Exporting {} deals", kept.len());

            match serde_json::to_string_pretty(&kept) {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    ::log::error!("Failed to serialize deals: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
