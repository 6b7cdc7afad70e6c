//! ESG equity ranking.
//!
//! Loads an equity table (ESG scores, sector, market cap, one-year beta),
//! buckets it by risk profile and returns the top recommendations for each
//! bucket. Also wraps the external calculator service used for budget
//! allocation and ROI.

pub mod client;
pub mod config;
pub mod equity;
pub mod error;
pub mod profile;
pub mod ranker;
pub mod report;
pub mod sectors;

pub use equity::EquityRecord;
pub use error::{EsgError, Result};
pub use profile::{BetaBand, RiskProfile};
pub use ranker::{rank, rank_by_label, rank_scored, ScoredEquity, MAX_RECOMMENDATIONS};
