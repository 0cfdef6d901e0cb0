mod advisory;
mod level;
mod metrics;
mod place;

pub use advisory::{filter_advisories, Advisory, AdvisoryId, AdvisoryOrder, Severity};
pub use level::Level;
pub use metrics::{AdvisorySummary, Metrics};
pub use place::{normalize_name, PlaceName};
