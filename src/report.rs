use crate::profile::{BetaBand, RiskProfile};
use crate::ranker::ScoredEquity;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize)]
pub struct ReportEntry<'a> {
    pub rank: usize,
    pub ticker: &'a str,
    pub score: f64,
    pub esg_score: f64,
    pub environmental_score: f64,
    pub social_score: f64,
    pub governance_score: f64,
    pub sector: &'a str,
    pub market_cap: f64,
    pub beta: f64,
    pub beta_band: BetaBand,
}

/// Recommendations for one profile, as emitted by `rank --json`.
#[derive(Debug, Serialize)]
pub struct RankingReport<'a> {
    pub generated_at: String,
    pub profile: Option<RiskProfile>,
    pub recommendations: Vec<ReportEntry<'a>>,
}

impl<'a> RankingReport<'a> {
    pub fn new(profile: Option<RiskProfile>, ranked: &[ScoredEquity<'a>]) -> Self {
        let recommendations = ranked
            .iter()
            .map(|s| ReportEntry {
                rank: s.rank,
                ticker: &s.record.ticker,
                score: s.score,
                esg_score: s.record.esg_score,
                environmental_score: s.record.environmental_score,
                social_score: s.record.social_score,
                governance_score: s.record.governance_score,
                sector: &s.record.sector,
                market_cap: s.record.market_cap,
                beta: s.record.beta,
                beta_band: BetaBand::classify(s.record.beta),
            })
            .collect();

        RankingReport {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            profile,
            recommendations,
        }
    }
}

/// Plain-text table for terminal output.
impl fmt::Display for RankingReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.profile.map(|p| p.label()).unwrap_or("Select");
        writeln!(f, "{} Investment Recommendations", title)?;

        if self.recommendations.is_empty() {
            return writeln!(f, "  (no matching equities)");
        }

        writeln!(
            f,
            "  {:<4} {:<8} {:>10} {:>6} {:<24} {:>12} {:>6} {:<9} {:>6} {:>6} {:>6}",
            "#", "Ticker", "Score", "ESG", "Sector", "Market Cap", "Beta", "Band", "E", "S", "G"
        )?;
        for e in &self.recommendations {
            writeln!(
                f,
                "  {:<4} {:<8} {:>10.2} {:>6.1} {:<24} {:>12.1} {:>6.2} {:<9} {:>6.1} {:>6.1} {:>6.1}",
                e.rank,
                e.ticker,
                e.score,
                e.esg_score,
                e.sector,
                e.market_cap,
                e.beta,
                e.beta_band.to_string(),
                e.environmental_score,
                e.social_score,
                e.governance_score,
            )?;
        }
        Ok(())
    }
}
