use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::assets::Asset;
use crate::prices::PricePoint;
use crate::transactions::Transaction;

/// A full snapshot of the tracked entities, suitable for export and for a
/// wipe-and-reload restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSnapshot {
    pub date: NaiveDateTime,
    pub assets: Vec<Asset>,
    pub transactions: Vec<Transaction>,
    pub prices: Vec<PricePoint>,
}

/// One CSV document per entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvExport {
    pub assets: String,
    pub transactions: String,
    pub prices: String,
}

/// Counts of restored records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreSummary {
    pub assets: usize,
    pub transactions: usize,
    pub prices: usize,
}
