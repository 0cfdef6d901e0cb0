use std::fmt;

use serde::{Deserialize, Serialize};

/// Depth of the administrative hierarchy a selection is filtered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    National,   // No filter at all
    Department, // Department -> National
    Province,   // Province -> Department
    District,   // Lowest-level entity
}

impl Level {
    pub const ALL: [Level; 4] = [Level::National, Level::Department, Level::Province, Level::District];

    /// Levels that carry boundary geometry and a filter slot.
    pub const ADMINISTRATIVE: [Level; 3] = [Level::Department, Level::Province, Level::District];

    pub fn to_str(&self) -> &'static str {
        match self {
            Level::National => "national",
            Level::Department => "department",
            Level::Province => "province",
            Level::District => "district",
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        match self {
            Level::National => 0,
            Level::Department => 1,
            Level::Province => 2,
            Level::District => 3,
        }
    }

    pub fn parent(&self) -> Option<Level> {
        match self {
            Level::National => None,
            Level::Department => Some(Level::National),
            Level::Province => Some(Level::Department),
            Level::District => Some(Level::Province),
        }
    }

    #[inline]
    pub fn is_administrative(&self) -> bool { *self != Level::National }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Level;

    #[test]
    fn parents_step_up_one_level() {
        for pair in Level::ALL.windows(2) {
            assert_eq!(pair[1].parent(), Some(pair[0]));
            assert_eq!(pair[1].depth(), pair[0].depth() + 1);
        }
        assert_eq!(Level::National.parent(), None);
    }

    #[test]
    fn only_national_lacks_boundaries() {
        assert!(!Level::National.is_administrative());
        assert!(Level::ADMINISTRATIVE.iter().all(Level::is_administrative));
        assert_eq!(Level::Province.to_string(), "province");
    }
}
