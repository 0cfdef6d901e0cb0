use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use super::advisory::Severity;

/// Client impact totals for some slice of an advisory's affected area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub farmers: u64,
    pub hectares: f64,
    pub insured_amount: f64,
}

impl Metrics {
    pub fn new(farmers: u64, hectares: f64, insured_amount: f64) -> Self {
        Self { farmers, hectares, insured_amount }
    }

    /// Insured amount in millions, as shown on the panels.
    #[inline]
    pub fn insured_millions(&self) -> f64 { self.insured_amount / 1e6 }
}

impl AddAssign for Metrics {
    fn add_assign(&mut self, rhs: Self) {
        self.farmers += rhs.farmers;
        self.hectares += rhs.hectares;
        self.insured_amount += rhs.insured_amount;
    }
}

/// Whole-advisory KPIs. Fetched once per advisory, independent of the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvisorySummary {
    pub color: Severity,
    pub critical: u64,
    pub high_risk: u64,
    pub totals: Metrics,
}

#[cfg(test)]
mod tests {
    use super::Metrics;

    #[test]
    fn add_assign_sums_fields() {
        let mut m = Metrics::new(2, 1.5, 1_000_000.0);
        m += Metrics::new(3, 2.5, 500_000.0);
        assert_eq!(m, Metrics::new(5, 4.0, 1_500_000.0));
        assert_eq!(m.insured_millions(), 1.5);
    }
}
