use crate::error::EsgError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// "High-Risk", "HighRisk", "high risk", "high_risk", "Low-Risk", "Balanced"
static PROFILE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)\s*(?:(high|low)[\s_-]*risk|(balanced))\s*$")
        .expect("profile label pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskProfile {
    HighRisk,  // Volatile names, growth and size weighted
    LowRisk,   // Calm names, ESG and stability weighted
    Balanced,  // Market-like volatility, ESG first
}

impl RiskProfile {
    /// Dashboard order.
    pub const ALL: [RiskProfile; 3] = [
        RiskProfile::HighRisk,
        RiskProfile::Balanced,
        RiskProfile::LowRisk,
    ];

    /// Resolve a user-facing label. Unrecognised labels give `None`, which
    /// the ranker treats as "no profile selected".
    pub fn from_label(label: &str) -> Option<Self> {
        let caps = PROFILE_LABEL.captures(label)?;
        if caps.get(2).is_some() {
            return Some(RiskProfile::Balanced);
        }
        match caps.get(1)?.as_str().to_ascii_lowercase().as_str() {
            "high" => Some(RiskProfile::HighRisk),
            "low" => Some(RiskProfile::LowRisk),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskProfile::HighRisk => "High-Risk",
            RiskProfile::LowRisk => "Low-Risk",
            RiskProfile::Balanced => "Balanced",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskProfile::HighRisk => "Aggressive growth strategy with potentially higher returns and higher risk",
            RiskProfile::Balanced => "Moderate strategy balancing growth and stability",
            RiskProfile::LowRisk => "Conservative strategy focused on capital preservation with stable returns",
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskProfile {
    type Err = EsgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiskProfile::from_label(s).ok_or_else(|| EsgError::UnknownProfile(s.to_string()))
    }
}

/// Volatility band used to tag equities in listings. Not the same cut-offs
/// as the ranking filters: Low here is beta < 0.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BetaBand {
    High,
    Moderate,
    Low,
}

impl BetaBand {
    pub fn classify(beta: f64) -> Self {
        if beta > 1.2 {
            BetaBand::High
        } else if beta < 0.8 {
            BetaBand::Low
        } else {
            BetaBand::Moderate
        }
    }
}

impl fmt::Display for BetaBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BetaBand::High => "high",
            BetaBand::Moderate => "moderate",
            BetaBand::Low => "low",
        };
        f.write_str(s)
    }
}
