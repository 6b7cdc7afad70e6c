use crate::equity::EquityRecord;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorSummary {
    pub sector: String,
    pub companies: usize,
    pub average_esg: f64,
}

/// Distinct sectors in the order they first appear.
pub fn distinct_sectors(records: &[EquityRecord]) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for r in records {
        if !out.contains(&r.sector.as_str()) {
            out.push(&r.sector);
        }
    }
    out
}

/// Equities whose sector matches exactly, in input order.
pub fn in_sector<'a>(records: &'a [EquityRecord], sector: &str) -> Vec<&'a EquityRecord> {
    records.iter().filter(|r| r.sector == sector).collect()
}

/// Company count and mean ESG score per sector, first-seen order.
/// Records with non-finite fields are skipped.
pub fn summarize(records: &[EquityRecord]) -> Vec<SectorSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, (usize, f64)> = HashMap::new();

    for r in records.iter().filter(|r| r.is_well_formed()) {
        let entry = totals.entry(r.sector.as_str()).or_insert_with(|| {
            order.push(r.sector.as_str());
            (0, 0.0)
        });
        entry.0 += 1;
        entry.1 += r.esg_score;
    }

    order
        .into_iter()
        .map(|sector| {
            let (companies, esg_sum) = totals[sector];
            SectorSummary {
                sector: sector.to_string(),
                companies,
                average_esg: esg_sum / companies as f64,
            }
        })
        .collect()
}
