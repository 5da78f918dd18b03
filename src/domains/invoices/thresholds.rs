//! Overdue tier thresholds.

use super::error::InvoiceError;

/// Thresholds used when the caller does not supply any.
pub const DEFAULT_THRESHOLDS: [i64; 3] = [7, 14, 21];

/// Positive, deduplicated, ascending overdue-day thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueThresholds(Vec<u32>);

impl OverdueThresholds {
    /// Drop non-positive values, deduplicate and sort ascending.
    pub fn normalize(raw: &[i64]) -> Result<Self, InvoiceError> {
        let mut values: Vec<u32> = raw
            .iter()
            .filter(|t| **t > 0)
            .map(|t| u32::try_from(*t).unwrap_or(u32::MAX))
            .collect();
        values.sort_unstable();
        values.dedup();

        if values.is_empty() {
            return Err(InvoiceError::NoPositiveThresholds);
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// The largest threshold `days_overdue` meets or exceeds.
    pub fn tier_for(&self, days_overdue: i64) -> Option<u32> {
        self.0
            .iter()
            .rev()
            .find(|t| days_overdue >= i64::from(**t))
            .copied()
    }
}

impl Default for OverdueThresholds {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLDS.iter().map(|t| *t as u32).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_non_positive() {
        let thresholds = OverdueThresholds::normalize(&[0, -3, 7]).unwrap();
        assert_eq!(thresholds.as_slice(), &[7]);
    }

    #[test]
    fn test_normalize_sorts_and_dedupes() {
        let thresholds = OverdueThresholds::normalize(&[21, 7, 14, 7, 21]).unwrap();
        assert_eq!(thresholds.as_slice(), &[7, 14, 21]);
        assert_eq!(thresholds, OverdueThresholds::default());
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(matches!(
            OverdueThresholds::normalize(&[]),
            Err(InvoiceError::NoPositiveThresholds)
        ));
        assert!(matches!(
            OverdueThresholds::normalize(&[0, -1]),
            Err(InvoiceError::NoPositiveThresholds)
        ));
    }

    #[test]
    fn test_tier_is_largest_met_threshold() {
        let thresholds = OverdueThresholds::default();
        assert_eq!(thresholds.tier_for(6), None);
        assert_eq!(thresholds.tier_for(7), Some(7));
        assert_eq!(thresholds.tier_for(13), Some(7));
        assert_eq!(thresholds.tier_for(14), Some(14));
        assert_eq!(thresholds.tier_for(20), Some(14));
        assert_eq!(thresholds.tier_for(21), Some(21));
        assert_eq!(thresholds.tier_for(400), Some(21));
    }
}
