//! Fee configuration model.
//!
//! A cohort's fee configuration arrives as a loosely-typed
//! [`FeeConfigInput`] (whatever the fee-setup form collected) and is turned
//! into an immutable [`FeeConfig`] by a validating factory. The engine only
//! ever computes on a `FeeConfig`, so a partially valid configuration cannot
//! reach the schedule arithmetic.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Raw fee configuration as collected from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeConfigInput {
    /// Fee charged when the application is submitted.
    pub application_fee: Decimal,
    /// One-time admission ("token") fee, paid outside the installment schedule.
    pub admission_fee: Decimal,
    /// Total program tuition subject to scholarship and splitting.
    pub base_fee: Decimal,
    /// Whether GST is levied on top of payable amounts.
    #[serde(default)]
    pub is_gst_included: bool,
    /// GST rate in percent (0-100).
    #[serde(default)]
    pub gst_percent: Decimal,
    /// Number of semesters in the program.
    pub number_of_semesters: u32,
    /// Number of installments in every semester.
    pub installments_per_semester: u32,
    /// Discount in percent granted for paying the whole base fee upfront.
    #[serde(default)]
    pub one_shot_discount_percent: Decimal,
    /// First day of the cohort; the first installment falls due on it.
    pub cohort_start_date: NaiveDate,
}

/// Validated, immutable fee configuration for one cohort.
///
/// # Example
///
/// ```
/// use fee_schedule_engine::models::{FeeConfig, FeeConfigInput};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let config = FeeConfig::new(FeeConfigInput {
///     application_fee: Decimal::from(500),
///     admission_fee: Decimal::from(50_000),
///     base_fee: Decimal::from(300_000),
///     is_gst_included: false,
///     gst_percent: Decimal::ZERO,
///     number_of_semesters: 3,
///     installments_per_semester: 3,
///     one_shot_discount_percent: Decimal::from(10),
///     cohort_start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
/// })
/// .unwrap();
///
/// assert_eq!(config.total_installments(), 9);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FeeConfigInput", into = "FeeConfigInput")]
pub struct FeeConfig {
    application_fee: Decimal,
    admission_fee: Decimal,
    base_fee: Decimal,
    is_gst_included: bool,
    gst_percent: Decimal,
    number_of_semesters: u32,
    installments_per_semester: u32,
    one_shot_discount_percent: Decimal,
    cohort_start_date: NaiveDate,
}

impl FeeConfig {
    /// Validates `input` and yields an immutable configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any fee is not strictly positive, when the
    /// semester or installment count is zero, or when the GST or one-shot
    /// discount percentage lies outside `[0, 100]`.
    pub fn new(input: FeeConfigInput) -> EngineResult<Self> {
        require_positive("application_fee", input.application_fee)?;
        require_positive("admission_fee", input.admission_fee)?;
        require_positive("base_fee", input.base_fee)?;
        require_percentage("gst_percent", input.gst_percent)?;
        require_percentage(
            "one_shot_discount_percent",
            input.one_shot_discount_percent,
        )?;

        if input.number_of_semesters < 1 {
            return Err(EngineError::config(
                "number_of_semesters",
                "must be at least 1",
            ));
        }
        if input.installments_per_semester < 1 {
            return Err(EngineError::config(
                "installments_per_semester",
                "must be at least 1",
            ));
        }

        Ok(Self {
            application_fee: input.application_fee,
            admission_fee: input.admission_fee,
            base_fee: input.base_fee,
            is_gst_included: input.is_gst_included,
            gst_percent: input.gst_percent,
            number_of_semesters: input.number_of_semesters,
            installments_per_semester: input.installments_per_semester,
            one_shot_discount_percent: input.one_shot_discount_percent,
            cohort_start_date: input.cohort_start_date,
        })
    }

    /// Fee charged when the application is submitted.
    pub fn application_fee(&self) -> Decimal {
        self.application_fee
    }

    /// One-time admission fee.
    pub fn admission_fee(&self) -> Decimal {
        self.admission_fee
    }

    /// Total program tuition.
    pub fn base_fee(&self) -> Decimal {
        self.base_fee
    }

    /// Whether GST is levied.
    pub fn is_gst_included(&self) -> bool {
        self.is_gst_included
    }

    /// Configured GST rate in percent, regardless of whether GST is enabled.
    pub fn gst_percent(&self) -> Decimal {
        self.gst_percent
    }

    /// GST rate that actually applies: the configured rate, or zero when disabled.
    pub fn effective_gst_percent(&self) -> Decimal {
        if self.is_gst_included {
            self.gst_percent
        } else {
            Decimal::ZERO
        }
    }

    /// Number of semesters.
    pub fn number_of_semesters(&self) -> u32 {
        self.number_of_semesters
    }

    /// Installments in each semester.
    pub fn installments_per_semester(&self) -> u32 {
        self.installments_per_semester
    }

    /// Total installment count across all semesters.
    pub fn total_installments(&self) -> u64 {
        u64::from(self.number_of_semesters) * u64::from(self.installments_per_semester)
    }

    /// Upfront payment discount in percent.
    pub fn one_shot_discount_percent(&self) -> Decimal {
        self.one_shot_discount_percent
    }

    /// First day of the cohort.
    pub fn cohort_start_date(&self) -> NaiveDate {
        self.cohort_start_date
    }
}

impl TryFrom<FeeConfigInput> for FeeConfig {
    type Error = EngineError;

    fn try_from(input: FeeConfigInput) -> Result<Self, Self::Error> {
        FeeConfig::new(input)
    }
}

impl From<FeeConfig> for FeeConfigInput {
    fn from(config: FeeConfig) -> Self {
        FeeConfigInput {
            application_fee: config.application_fee,
            admission_fee: config.admission_fee,
            base_fee: config.base_fee,
            is_gst_included: config.is_gst_included,
            gst_percent: config.gst_percent,
            number_of_semesters: config.number_of_semesters,
            installments_per_semester: config.installments_per_semester,
            one_shot_discount_percent: config.one_shot_discount_percent,
            cohort_start_date: config.cohort_start_date,
        }
    }
}

fn require_positive(field: &str, value: Decimal) -> EngineResult<()> {
    if value <= Decimal::ZERO {
        return Err(EngineError::config(
            field,
            format!("must be greater than zero, got {}", value),
        ));
    }
    Ok(())
}

fn require_percentage(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO || value > HUNDRED {
        return Err(EngineError::config(
            field,
            format!("must be between 0 and 100, got {}", value),
        ));
    }
    Ok(())
}
