use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scraped product occurrence
///
/// Every field but `scraped_at` is best-effort and may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Serialized under the viewer's historical `sold_by` key
    #[serde(rename = "sold_by")]
    pub seller_name: Option<String>,
    pub product_name: Option<String>,
    pub discount_text: Option<String>,
    pub price_eur: Option<f64>,
    pub page_url: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    /// `Label: Value` pairs joined with ` | `
    pub features: Option<String>,
    pub category: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

/// Fields read from a listing card on the catalog page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingSummary {
    pub seller_name: Option<String>,
    pub product_name: Option<String>,
    pub discount_text: Option<String>,
    pub price_eur: Option<f64>,
    pub page_url: Option<String>,
    pub image_url: Option<String>,
}

/// Fields read from a product's detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub description: Option<String>,
    pub features: Option<String>,
    pub category: Option<String>,
}

impl ListingRecord {
    /// Merge the two partial results of one listing
    pub fn new(summary: ListingSummary, details: DetailFields, scraped_at: DateTime<Utc>) -> Self {
        Self {
            seller_name: summary.seller_name,
            product_name: summary.product_name,
            discount_text: summary.discount_text,
            price_eur: summary.price_eur,
            page_url: summary.page_url,
            image_url: summary.image_url,
            description: details.description,
            features: details.features,
            category: details.category,
            scraped_at,
        }
    }
}

/// How a pipeline run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// The page budget was used up
    BudgetExhausted,
    /// No further page could be reached
    CatalogEnd,
    /// A fault escaped every local boundary
    Failed(String),
}

/// Summary of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub pages: usize,
    pub records: usize,
    pub status: RunStatus,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        !matches!(self.status, RunStatus::Failed(_))
    }
}
