//! Tiered price computation.
//!
//! Tiers are evaluated in the order they were configured, never sorted. An
//! infinite bucket matches everything, so placing it before finer tiers
//! shadows them. That is an operator hazard and is reproduced as-is.

/// Threshold keys treated as the catch-all bucket (case-insensitive).
pub const INFINITE_KEYS: &[&str] = &["inf", "infinite", "infinity"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TierBound {
    /// Matches prices `<= threshold`.
    UpTo(f64),
    Infinite,
}

impl TierBound {
    pub fn parse(raw: &str) -> Result<Self, TierConfigError> {
        let t = raw.trim();
        if INFINITE_KEYS.iter().any(|k| t.eq_ignore_ascii_case(k)) {
            return Ok(Self::Infinite);
        }
        match t.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Self::UpTo(v)),
            _ => Err(TierConfigError::InvalidThreshold(raw.to_string())),
        }
    }

    fn matches(&self, price: f64) -> bool {
        match *self {
            Self::Infinite => true,
            Self::UpTo(threshold) => price <= threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceTier {
    pub bound: TierBound,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TierConfigError {
    #[error("price tier threshold '{0}' is neither numeric nor an infinite key")]
    InvalidThreshold(String),
    #[error("price tier '{threshold}' has invalid multiplier {multiplier} (must be finite and >= 0)")]
    InvalidMultiplier { threshold: String, multiplier: f64 },
}

/// Ordered tier list as declared in configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTiers {
    tiers: Vec<PriceTier>,
}

impl PriceTiers {
    pub fn new(tiers: Vec<PriceTier>) -> Self {
        Self { tiers }
    }

    /// Build from `(threshold key, multiplier)` pairs, keeping their order.
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self, TierConfigError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut tiers = Vec::new();
        for (key, multiplier) in pairs {
            let key = key.as_ref();
            if !multiplier.is_finite() || multiplier < 0.0 {
                return Err(TierConfigError::InvalidMultiplier {
                    threshold: key.to_string(),
                    multiplier,
                });
            }
            tiers.push(PriceTier {
                bound: TierBound::parse(key)?,
                multiplier,
            });
        }
        Ok(Self { tiers })
    }

    pub fn as_slice(&self) -> &[PriceTier] {
        &self.tiers
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Tiers that can never match because an infinite bucket precedes them.
    pub fn shadowed_count(&self) -> usize {
        match self
            .tiers
            .iter()
            .position(|t| t.bound == TierBound::Infinite)
        {
            Some(idx) => self.tiers.len() - idx - 1,
            None => 0,
        }
    }

    pub fn apply(&self, min_raw_price: f64) -> f64 {
        tier_price(min_raw_price, &self.tiers)
    }
}

/// First tier (in slice order) that matches sets the multiplier; no match
/// passes the price through unchanged.
pub fn tier_price(min_raw_price: f64, tiers: &[PriceTier]) -> f64 {
    tiers
        .iter()
        .find(|t| t.bound.matches(min_raw_price))
        .map(|t| min_raw_price * t.multiplier)
        .unwrap_or(min_raw_price)
}
