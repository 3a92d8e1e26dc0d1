/// Integer identity used to join desired skus against the destination.
///
/// Skus that do not coerce to an integer become `Unmatchable`: they never
/// join anything, so they can neither block a create nor trigger an update.
/// The diff only ever joins on [`SkuIdentity::key`], so two `Unmatchable`
/// values never meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkuIdentity {
    Numeric(i64),
    Unmatchable,
}

impl SkuIdentity {
    /// Accepts plain integers ("0123" => 123) and integral decimals
    /// ("123.0", "1e3").
    pub fn coerce(raw: &str) -> Self {
        let t = raw.trim();
        if let Ok(v) = t.parse::<i64>() {
            return Self::Numeric(v);
        }
        match t.parse::<f64>() {
            Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
                Self::Numeric(v as i64)
            }
            _ => Self::Unmatchable,
        }
    }

    pub fn key(&self) -> Option<i64> {
        match *self {
            Self::Numeric(v) => Some(v),
            Self::Unmatchable => None,
        }
    }
}
