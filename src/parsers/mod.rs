//! Pure text parsers for the values read off listing and detail pages
pub mod detail;
pub mod price;
pub mod promo;
pub mod seller;

#[cfg(test)]
mod tests;

pub use detail::{DetailText, split_characteristics};
pub use price::parse_price;
pub use promo::{DealFilter, PromoFilter, PromoKind};
pub use seller::clean_seller;
