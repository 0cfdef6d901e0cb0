use std::fmt;

use serde::{Deserialize, Serialize};

pub type AdvisoryId = u32;

/// Severity color of an advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Red,
    Orange,
    Yellow,
    Green,
    #[default]
    Grey,
}

impl Severity {
    pub fn to_str(&self) -> &'static str {
        match self {
            Severity::Red => "rojo",
            Severity::Orange => "naranja",
            Severity::Yellow => "amarillo",
            Severity::Green => "verde",
            Severity::Grey => "plomo",
        }
    }

    /// Unknown colors fall back to grey.
    pub fn from_str(s: &str) -> Severity {
        match s.trim().to_ascii_lowercase().as_str() {
            "rojo" | "red" => Severity::Red,
            "naranja" | "orange" => Severity::Orange,
            "amarillo" | "yellow" => Severity::Yellow,
            "verde" | "green" => Severity::Green,
            _ => Severity::Grey,
        }
    }

    /// Only red and orange advisories get per-department maps.
    #[inline]
    pub fn allows_map_generation(&self) -> bool {
        matches!(self, Severity::Red | Severity::Orange)
    }

    /// Severity of a hazard polygon from its `nivel` column ("Nivel 1".."Nivel 4").
    pub fn from_risk_level(s: &str) -> Option<Severity> {
        let level = s.trim().to_ascii_lowercase();
        match level.strip_prefix("nivel").map(str::trim) {
            Some("4") => Some(Severity::Red),
            Some("3") => Some(Severity::Orange),
            Some("2") => Some(Severity::Yellow),
            Some("1") => Some(Severity::Green),
            _ => None,
        }
    }

    /// Fill color used on the hazard layer; green areas are not drawn.
    pub fn fill_color(&self) -> Option<&'static str> {
        match self {
            Severity::Red => Some("#FF0000"),
            Severity::Orange => Some("#FF8C00"),
            Severity::Yellow => Some("#FFFF00"),
            Severity::Green => None,
            Severity::Grey => Some("#E8E8E8"),
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self { Severity::from_str(&s) }
}

impl From<Severity> for String {
    fn from(s: Severity) -> Self { s.to_str().to_string() }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// A weather-hazard notice, as listed by the advisory endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    #[serde(alias = "numero")]
    pub id: AdvisoryId,
    #[serde(default)]
    pub color: Severity,
    #[serde(alias = "titulo", default)]
    pub title: String,
}

/// Ordering for advisory listings, by advisory number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvisoryOrder {
    #[default]
    Ascending,
    Descending,
}

/// Filter advisories by color (if given) and sort by number.
pub fn filter_advisories(advisories: &[Advisory], color: Option<Severity>, order: AdvisoryOrder) -> Vec<Advisory> {
    let mut out: Vec<Advisory> = advisories.iter()
        .filter(|a| color.is_none_or(|c| a.color == c))
        .cloned()
        .collect();
    match order {
        AdvisoryOrder::Ascending => out.sort_by_key(|a| a.id),
        AdvisoryOrder::Descending => out.sort_by_key(|a| std::cmp::Reverse(a.id)),
    }
    out
}
