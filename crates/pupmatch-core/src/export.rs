//! Downloadable backup of the catalog and the adoption book.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{AdoptionRecord, Dog};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportPayload {
    pub dogs: Vec<Dog>,
    pub adoptions: Vec<AdoptionRecord>,
}

impl ExportPayload {
    /// Pretty-printed with two-space indentation.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `pupmatch-data-YYYY-MM-DD.json`
pub fn export_filename(date: NaiveDate) -> String {
    format!("pupmatch-data-{}.json", date.format("%Y-%m-%d"))
}
