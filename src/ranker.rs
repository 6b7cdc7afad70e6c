use crate::equity::EquityRecord;
use crate::profile::RiskProfile;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

// Hard cap on the number of recommendations returned for a profile
pub const MAX_RECOMMENDATIONS: usize = 5;

// Beta cut-offs for each bucket
const HIGH_RISK_MIN_BETA: f64 = 1.2; // exclusive
const LOW_RISK_MAX_BETA: f64 = 1.0; // exclusive
const BALANCED_BETA_RANGE: (f64, f64) = (0.8, 1.2); // inclusive

// High risk: high beta, large market cap, ESG considered least
const HIGH_RISK_WEIGHTS: (f64, f64, f64) = (0.4, 0.4, 0.2); // beta, cap, esg
// Low risk: ESG first, inverse beta for stability, cap least
const LOW_RISK_WEIGHTS: (f64, f64, f64) = (0.4, 0.4, 0.2); // esg, 1/beta, cap
// Balanced: ESG, decent cap, closeness of beta to the market
const BALANCED_WEIGHTS: (f64, f64, f64) = (0.4, 0.3, 0.3); // esg, cap, beta fit

/// A ranked recommendation with the score it was ordered by.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredEquity<'a> {
    pub rank: usize,
    pub score: f64,
    pub record: &'a EquityRecord,
}

/// Check whether a record belongs to the profile's beta bucket and can be
/// scored.
///
/// Records with any non-finite field never pass, and neither do records
/// whose score is not finite (a zero or subnormal beta under LowRisk, or
/// values large enough to overflow). Everything that passes reaches the sort.
pub fn passes_filter(record: &EquityRecord, profile: RiskProfile) -> bool {
    if !record.is_well_formed() {
        return false;
    }

    let beta = record.beta;
    let in_bucket = match profile {
        RiskProfile::HighRisk => beta > HIGH_RISK_MIN_BETA,
        RiskProfile::LowRisk => beta < LOW_RISK_MAX_BETA,
        RiskProfile::Balanced => {
            let (lo, hi) = BALANCED_BETA_RANGE;
            (lo..=hi).contains(&beta)
        }
    };

    in_bucket && score(record, profile).is_finite()
}

/// Weighted score for a record under a profile. Higher is better.
///
/// Only meaningful for records that pass `passes_filter`; a zero beta under
/// LowRisk yields an infinite score here, which the filter rejects.
pub fn score(record: &EquityRecord, profile: RiskProfile) -> f64 {
    match profile {
        RiskProfile::HighRisk => {
            let (w_beta, w_cap, w_esg) = HIGH_RISK_WEIGHTS;
            w_beta * record.beta + w_cap * record.market_cap + w_esg * record.esg_score
        }
        RiskProfile::LowRisk => {
            let (w_esg, w_inv_beta, w_cap) = LOW_RISK_WEIGHTS;
            w_esg * record.esg_score + w_inv_beta * (1.0 / record.beta) + w_cap * record.market_cap
        }
        RiskProfile::Balanced => {
            let (w_esg, w_cap, w_fit) = BALANCED_WEIGHTS;
            let beta_fit = 1.0 - (1.0 - record.beta).abs();
            w_esg * record.esg_score + w_cap * record.market_cap + w_fit * beta_fit
        }
    }
}

/// Filter, score and order records for a profile, keeping the top
/// `MAX_RECOMMENDATIONS`. Equal scores keep their input order.
pub fn rank_scored(records: &[EquityRecord], profile: Option<RiskProfile>) -> Vec<ScoredEquity<'_>> {
    let Some(profile) = profile else {
        return Vec::new();
    };

    let mut scored: Vec<(&EquityRecord, f64)> = records
        .iter()
        .filter(|r| passes_filter(r, profile))
        .map(|r| (r, score(r, profile)))
        .collect();

    // Vec::sort_by is stable
    scored.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    debug!(
        %profile,
        candidates = scored.len(),
        total = records.len(),
        "ranked equities"
    );

    scored
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .enumerate()
        .map(|(i, (record, score))| ScoredEquity { rank: i + 1, score, record })
        .collect()
}

/// Top recommendations for a profile. `None` gives an empty result.
pub fn rank(records: &[EquityRecord], profile: Option<RiskProfile>) -> Vec<&EquityRecord> {
    rank_scored(records, profile)
        .into_iter()
        .map(|s| s.record)
        .collect()
}

/// Rank using a user-facing label; an absent or unknown label gives an
/// empty result.
pub fn rank_by_label<'a>(records: &'a [EquityRecord], label: Option<&str>) -> Vec<&'a EquityRecord> {
    rank(records, label.and_then(RiskProfile::from_label))
}
