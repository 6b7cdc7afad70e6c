//! Equity table ingestion
//!
//! This module handles:
//! - The `EquityRecord` row type (ESG scores, sector, market cap, beta)
//! - Parsing the averaged-scores CSV table, dropping malformed rows
//! - Loading the same table from a JSON array

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Number of columns in the source table:
/// ticker, E, S, G, ESG, sector, market cap, one-year beta.
const COLUMN_COUNT: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityRecord {
    pub ticker: String,
    #[serde(alias = "E_score")]
    pub environmental_score: f64,
    #[serde(alias = "S_score")]
    pub social_score: f64,
    #[serde(alias = "G_score")]
    pub governance_score: f64,
    #[serde(alias = "ESG_score")]
    pub esg_score: f64,
    #[serde(alias = "Sectors")]
    pub sector: String,
    #[serde(alias = "Market_Cap")]
    pub market_cap: f64,
    #[serde(alias = "Beta_1Y")]
    pub beta: f64,
}

impl EquityRecord {
    /// True when every numeric field is finite. Rows that fail this never
    /// reach scoring.
    pub fn is_well_formed(&self) -> bool {
        [
            self.environmental_score,
            self.social_score,
            self.governance_score,
            self.esg_score,
            self.market_cap,
            self.beta,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

fn parse_number(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_row(line: &str) -> Option<EquityRecord> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < COLUMN_COUNT {
        return None;
    }

    let ticker = parts[0].trim();
    if ticker.is_empty() {
        return None;
    }

    Some(EquityRecord {
        ticker: ticker.to_string(),
        environmental_score: parse_number(parts[1])?,
        social_score: parse_number(parts[2])?,
        governance_score: parse_number(parts[3])?,
        esg_score: parse_number(parts[4])?,
        sector: parts[5].trim().to_string(),
        market_cap: parse_number(parts[6])?,
        beta: parse_number(parts[7])?,
    })
}

/// Parse the equity table. The first non-blank line is the header.
///
/// Rows with missing columns, an empty ticker or a non-numeric/non-finite
/// score are dropped. A repeated ticker keeps its first occurrence.
pub fn parse_equities(text: &str) -> Vec<EquityRecord> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    // header
    lines.next();

    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();

    for (idx, line) in lines.enumerate() {
        let Some(record) = parse_row(line) else {
            warn!(row = idx + 1, line, "dropping malformed equity row");
            continue;
        };

        if !seen.insert(record.ticker.clone()) {
            warn!(row = idx + 1, ticker = %record.ticker, "dropping duplicate ticker");
            continue;
        }

        records.push(record);
    }

    debug!(count = records.len(), "parsed equity table");
    records
}

/// Load the equity table from a CSV file.
pub fn load_equities(path: impl AsRef<Path>) -> Result<Vec<EquityRecord>> {
    let contents = fs::read_to_string(path.as_ref())?;
    Ok(parse_equities(&contents))
}

/// Load equities from a JSON array. Same validation as the CSV path.
pub fn load_equities_json(path: impl AsRef<Path>) -> Result<Vec<EquityRecord>> {
    let contents = fs::read_to_string(path.as_ref())?;
    let raw: Vec<EquityRecord> = serde_json::from_str(&contents)?;

    let mut seen: HashSet<String> = HashSet::new();
    let records: Vec<EquityRecord> = raw
        .into_iter()
        .filter(|r| {
            if r.ticker.trim().is_empty() || !r.is_well_formed() {
                warn!(ticker = %r.ticker, "dropping malformed equity record");
                return false;
            }
            if !seen.insert(r.ticker.clone()) {
                warn!(ticker = %r.ticker, "dropping duplicate ticker");
                return false;
            }
            true
        })
        .collect();

    Ok(records)
}
