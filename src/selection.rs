use serde::Serialize;

use crate::aggregation::AggregationIndex;
use crate::error::{FilterError, FilterResult};
use crate::types::{AdvisoryId, Level, PlaceName};

/// The three filter slots. Never holds a value below an empty slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub department: Option<PlaceName>,
    pub province: Option<PlaceName>,
    pub district: Option<PlaceName>,
}

impl Filters {
    pub fn get(&self, level: Level) -> Option<&PlaceName> {
        match level {
            Level::National => None,
            Level::Department => self.department.as_ref(),
            Level::Province => self.province.as_ref(),
            Level::District => self.district.as_ref(),
        }
    }

    /// Deepest level that has a value.
    pub fn level(&self) -> Level {
        if self.district.is_some() {
            Level::District
        } else if self.province.is_some() {
            Level::Province
        } else if self.department.is_some() {
            Level::Department
        } else {
            Level::National
        }
    }

    /// No slot is set while its parent slot is empty.
    pub fn is_consistent(&self) -> bool {
        !(self.province.is_some() && self.department.is_none())
            && !(self.district.is_some() && self.province.is_none())
    }

    /// Empty this slot and every slot below it.
    fn clear_from(&mut self, level: Level) {
        match level {
            Level::National | Level::Department => {
                self.department = None;
                self.province = None;
                self.district = None;
            }
            Level::Province => {
                self.province = None;
                self.district = None;
            }
            Level::District => self.district = None,
        }
    }
}

/// What a successful transition did, used to drive its side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Set(Level),
    Clear(Level),
}

/// Current advisory plus the department/province/district filter.
///
/// All mutation goes through the transition methods below, which either apply
/// fully or return an error and leave the selection untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    advisory: Option<AdvisoryId>,
    filters: Filters,
}

impl Selection {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn advisory(&self) -> Option<AdvisoryId> { self.advisory }
    #[inline] pub fn filters(&self) -> &Filters { &self.filters }
    #[inline] pub fn level(&self) -> Level { self.filters.level() }

    /// Switch to a new advisory; every filter resets to national.
    pub fn begin_advisory(&mut self, advisory: AdvisoryId) {
        self.advisory = Some(advisory);
        self.filters = Filters::default();
    }

    /// Set the filter at `level` to `name`, validated against `index`.
    /// Every deeper filter is cleared.
    pub fn set(&mut self, level: Level, name: &str, index: &AggregationIndex) -> FilterResult<Transition> {
        if self.advisory.is_none() {
            return Err(FilterError::NoAdvisory);
        }
        let place = PlaceName::new(name).ok_or(FilterError::EmptyName { level })?;
        let unknown = || FilterError::UnknownPlace { level, name: place.to_string() };

        match level {
            Level::National => return Err(FilterError::NotFilterable { level }),
            Level::Department => {
                if !index.contains_department(place.as_str()) {
                    return Err(unknown());
                }
            }
            Level::Province => {
                let dept = self.require_parent(level)?;
                if !index.contains_province(dept.as_str(), place.as_str()) {
                    return Err(unknown());
                }
            }
            Level::District => {
                let prov = self.require_parent(level)?;
                let dept = self.require_parent(Level::Province)?;
                if !index.contains_district(dept.as_str(), prov.as_str(), place.as_str()) {
                    return Err(unknown());
                }
            }
        }

        self.filters.clear_from(level);
        match level {
            Level::Department => self.filters.department = Some(place),
            Level::Province => self.filters.province = Some(place),
            Level::District => self.filters.district = Some(place),
            Level::National => {}
        }
        Ok(Transition::Set(level))
    }

    /// Clear the filter at `level` and everything below it.
    /// Clearing province or district requires its parent to be set.
    pub fn clear(&mut self, level: Level) -> FilterResult<Transition> {
        match level {
            Level::National => return Err(FilterError::NotFilterable { level }),
            Level::Department => {}
            Level::Province | Level::District => {
                self.require_parent(level)?;
            }
        }
        self.filters.clear_from(level);
        Ok(Transition::Clear(level))
    }

    /// Reset to national without touching the advisory.
    pub fn clear_all(&mut self) -> Transition {
        self.filters.clear_from(Level::Department);
        Transition::Clear(Level::Department)
    }

    fn require_parent(&self, level: Level) -> FilterResult<&PlaceName> {
        level.parent()
            .and_then(|parent| self.filters.get(parent))
            .ok_or(FilterError::ParentNotSelected { level })
    }
}
