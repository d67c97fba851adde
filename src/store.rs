use crate::error::Result;
use crate::results::ListingRecord;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, Row, params};
use std::path::Path;

/// Rows returned to the viewer when no limit is given
pub const VIEWER_LIMIT: usize = 2000;

/// Destination for scraped records. Appends only; nothing is deduplicated.
pub trait Sink {
    /// Store one page's records, returning how many were kept
    fn append(&mut self, records: &[ListingRecord]) -> Result<usize>;
}

/// Keeps every appended batch in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub batches: Vec<Vec<ListingRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> impl Iterator<Item = &ListingRecord> {
        self.batches.iter().flatten()
    }
}

impl Sink for MemorySink {
    fn append(&mut self, records: &[ListingRecord]) -> Result<usize> {
        self.batches.push(records.to_vec());
        Ok(records.len())
    }
}

/// SQLite table of scraped deals
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS leclerc_deals (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                sold_by       TEXT,
                product_name  TEXT,
                discount_text TEXT,
                price_eur     REAL,
                page_url      TEXT,
                image_url     TEXT,
                description   TEXT,
                features      TEXT,
                category      TEXT,
                scraped_at    TEXT NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }

    /// Every stored deal, cheapest first with unpriced deals last.
    ///
    /// Rows without a readable `scraped_at` are logged and left out.
    pub fn deals_for_viewer(&self, limit: usize) -> Result<Vec<ListingRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, sold_by, product_name, discount_text, price_eur, page_url, image_url,
                    description, features, category, scraped_at
             FROM leclerc_deals
             ORDER BY price_eur IS NULL, price_eur ASC, id ASC
             LIMIT ?1",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit], record_from_row)?;

        let mut deals = Vec::new();
        for row in rows {
            if let Some(record) = row? {
                deals.push(record);
            }
        }
        Ok(deals)
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM leclerc_deals", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

/// Read a stored timestamp.
///
/// Rows written by this crate hold RFC 3339 text. Older databases hold naive
/// ISO 8601 timestamps, which are UTC.
pub fn parse_scraped_at(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|t| t.and_utc())
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<Option<ListingRecord>> {
    let id: i64 = row.get(0)?;
    let raw: Option<String> = row.get(10)?;
    let Some(scraped_at) = raw.as_deref().and_then(parse_scraped_at) else {
        ::log::warn!("Skipping deal {}: unreadable scraped_at {:?}", id, raw);
        return Ok(None);
    };

    Ok(Some(ListingRecord {
        seller_name: row.get(1)?,
        product_name: row.get(2)?,
        discount_text: row.get(3)?,
        price_eur: row.get(4)?,
        page_url: row.get(5)?,
        image_url: row.get(6)?,
        description: row.get(7)?,
        features: row.get(8)?,
        category: row.get(9)?,
        scraped_at,
    }))
}

impl Sink for SqliteStore {
    fn append(&mut self, records: &[ListingRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut stored = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO leclerc_deals
                 (sold_by, product_name, discount_text, price_eur, page_url, image_url,
                  description, features, category, scraped_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for record in records {
                let inserted = stmt.execute(params![
                    record.seller_name,
                    record.product_name,
                    record.discount_text,
                    record.price_eur,
                    record.page_url,
                    record.image_url,
                    record.description,
                    record.features,
                    record.category,
                    record.scraped_at.to_rfc3339(),
                ]);
                match inserted {
                    Ok(_) => stored += 1,
                    Err(e) => ::log::warn!(
                        "Dropping record {:?}: {}",
                        record.product_name.as_deref().unwrap_or("<unnamed>"),
                        e
                    ),
                }
            }
        }
        tx.commit()?;
        Ok(stored)
    }
}
