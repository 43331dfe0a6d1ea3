//! Scholarship slab model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One admissible scholarship tier of a cohort.
///
/// The `clearance` label describes the qualifying criterion (for example an
/// interview score band). It is carried through to the output but never
/// evaluated by the engine.
///
/// # Example
///
/// ```
/// use fee_schedule_engine::models::ScholarshipSlab;
/// use rust_decimal::Decimal;
///
/// let slab = ScholarshipSlab::new("Excellence", Decimal::from(25), "Top 5% in interview");
/// assert_eq!(slab.name, "Excellence");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScholarshipSlab {
    /// Slab name, unique within a cohort.
    pub name: String,
    /// Share of the base fee waived, in percent (0-100).
    pub percentage: Decimal,
    /// Qualifying criterion label.
    #[serde(default)]
    pub clearance: String,
}

impl ScholarshipSlab {
    /// Creates a slab.
    pub fn new(
        name: impl Into<String>,
        percentage: Decimal,
        clearance: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            percentage,
            clearance: clearance.into(),
        }
    }
}
