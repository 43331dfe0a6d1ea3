//! Engine settings types.
//!
//! These are the strongly-typed settings deserialized from `engine.yaml`.
//! Every field has a default so a partial file (or no file at all) yields
//! a usable configuration.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Largest supported currency scale (number of decimal places in a minor unit).
pub const MAX_CURRENCY_SCALE: u32 = 6;

/// Default ceiling on `number_of_semesters * installments_per_semester`.
pub const DEFAULT_MAX_INSTALLMENTS: u32 = 240;

/// Step function used to stamp due dates onto the installment template.
///
/// # Example
///
/// ```
/// use fee_schedule_engine::config::Cadence;
///
/// let cadence: Cadence = serde_yaml::from_str("kind: every_months\nmonths: 2").unwrap();
/// assert_eq!(cadence, Cadence::EveryMonths { months: 2 });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cadence {
    /// One calendar month between consecutive installments.
    #[default]
    Monthly,
    /// A fixed number of calendar months between consecutive installments.
    EveryMonths {
        /// Months between installments (at least 1).
        months: u32,
    },
    /// Each semester opens on its own boundary; installments are spread
    /// across the semester.
    SemesterAligned {
        /// Length of a semester in calendar months (at least 1).
        months_per_semester: u32,
    },
}

impl Cadence {
    fn validate(&self) -> Result<(), String> {
        match *self {
            Cadence::Monthly => Ok(()),
            Cadence::EveryMonths { months } if months == 0 => {
                Err("cadence.months must be at least 1".to_string())
            }
            Cadence::SemesterAligned {
                months_per_semester,
            } if months_per_semester == 0 => {
                Err("cadence.months_per_semester must be at least 1".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Engine-wide settings.
///
/// # Example
///
/// ```
/// use fee_schedule_engine::config::{Cadence, EngineSettings};
///
/// let settings = EngineSettings::default();
/// assert_eq!(settings.currency_scale, 0);
/// assert_eq!(settings.max_installments, 240);
/// assert_eq!(settings.cadence, Cadence::Monthly);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    /// Decimal places of the smallest currency unit (0 = whole units).
    pub currency_scale: u32,
    /// Maximum number of installments a single schedule may hold.
    pub max_installments: u32,
    /// Due date step function.
    pub cadence: Cadence,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            currency_scale: 0,
            max_installments: DEFAULT_MAX_INSTALLMENTS,
            cadence: Cadence::Monthly,
        }
    }
}

impl EngineSettings {
    /// Checks value ranges, labelling any failure with `source`.
    pub fn validate(&self, source: &str) -> EngineResult<()> {
        let fail = |message: String| EngineError::SettingsParseError {
            path: source.to_string(),
            message,
        };

        if self.currency_scale > MAX_CURRENCY_SCALE {
            return Err(fail(format!(
                "currency_scale {} exceeds maximum of {}",
                self.currency_scale, MAX_CURRENCY_SCALE
            )));
        }
        if self.max_installments == 0 {
            return Err(fail("max_installments must be at least 1".to_string()));
        }
        self.cadence.validate().map_err(fail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EngineSettings::default().validate("default").is_ok());
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let settings: EngineSettings = serde_yaml::from_str("currency_scale: 2").unwrap();
        assert_eq!(settings.currency_scale, 2);
        assert_eq!(settings.max_installments, DEFAULT_MAX_INSTALLMENTS);
        assert_eq!(settings.cadence, Cadence::Monthly);
    }

    #[test]
    fn test_semester_aligned_cadence_deserializes() {
        let yaml = "cadence:\n  kind: semester_aligned\n  months_per_semester: 6\n";
        let settings: EngineSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            settings.cadence,
            Cadence::SemesterAligned {
                months_per_semester: 6
            }
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<EngineSettings, _> = serde_yaml::from_str("currency: INR");
        assert!(result.is_err());
    }

    #[test]
    fn test_scale_above_maximum_rejected() {
        let settings = EngineSettings {
            currency_scale: 7,
            ..EngineSettings::default()
        };
        match settings.validate("inline") {
            Err(EngineError::SettingsParseError { path, message }) => {
                assert_eq!(path, "inline");
                assert!(message.contains("currency_scale"));
            }
            other => panic!("Expected SettingsParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_month_cadence_rejected() {
        let settings = EngineSettings {
            cadence: Cadence::EveryMonths { months: 0 },
            ..EngineSettings::default()
        };
        assert!(settings.validate("inline").is_err());
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        let settings = EngineSettings {
            max_installments: 0,
            ..EngineSettings::default()
        };
        assert!(settings.validate("inline").is_err());
    }
}
