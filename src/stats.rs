use std::sync::atomic::{AtomicU64, Ordering};

use crate::selection::Filters;
use crate::types::{Metrics, PlaceName};

/// Query for the scoped statistics endpoint. Only set filters constrain it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopedQuery {
    pub department: Option<PlaceName>,
    pub province: Option<PlaceName>,
    pub district: Option<PlaceName>,
}

impl ScopedQuery {
    pub fn from_filters(filters: &Filters) -> Self {
        Self {
            department: filters.department.clone(),
            province: filters.province.clone(),
            district: filters.district.clone(),
        }
    }

    /// Query-string pairs for the non-null filters, in hierarchy order.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [("depto", &self.department), ("provincia", &self.province), ("distrito", &self.district)]
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key, v.as_str())))
            .collect()
    }
}

/// Identifies the transition a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    #[inline]
    pub fn get(&self) -> u64 { self.0 }
}

/// Issues monotonically increasing tokens; only the latest is current.
#[derive(Debug, Default)]
pub struct TokenGate {
    latest: AtomicU64,
}

impl TokenGate {
    pub fn new() -> Self { Self::default() }

    /// Supersede every earlier token.
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[inline]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    #[inline]
    pub fn latest(&self) -> RequestToken {
        RequestToken(self.latest.load(Ordering::SeqCst))
    }
}

/// Dependent statistics panel contents.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedStats {
    pub title: String,
    pub metrics: Metrics,
    pub token: RequestToken,
}

/// Panel heading for the deepest active filter.
pub fn panel_title(filters: &Filters) -> String {
    if let Some(district) = &filters.district {
        format!("DISTRICT: {district}")
    } else if let Some(province) = &filters.province {
        format!("PROVINCE: {province}")
    } else if let Some(department) = &filters.department {
        format!("DEPARTMENT: {department}")
    } else {
        "NATIONAL".to_string()
    }
}
