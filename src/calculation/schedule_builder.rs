//! Base installment template construction.
//!
//! This module turns a [`FeeConfig`] into the ordered, date-stamped list of
//! installments every scholarship schedule is derived from. No waiver or GST
//! is applied here.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use crate::config::{Cadence, EngineSettings};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, FeeConfig, Installment};

use super::CurrencyMath;

/// The base template and the audit step recording how it was built.
#[derive(Debug, Clone)]
pub struct BaseTemplate {
    /// Template installments, semester by semester.
    pub installments: Vec<Installment>,
    /// The base fee share of each semester.
    pub semester_shares: Vec<Decimal>,
    /// The audit step recording the split.
    pub audit_step: AuditStep,
}

/// Month offsets from the cohort start date for every installment.
///
/// Offsets are strictly increasing for every cadence.
///
/// # Errors
///
/// `SettingsParseError` when the settings are out of range (for example a
/// zero-month cadence); `ConfigError` when the installment count exceeds
/// `settings.max_installments`.
///
/// # Examples
///
/// ```
/// use fee_schedule_engine::calculation::due_month_offsets;
/// use fee_schedule_engine::config::{Cadence, EngineSettings};
///
/// let monthly = EngineSettings::default();
/// assert_eq!(due_month_offsets(&monthly, 2, 2).unwrap(), vec![0, 1, 2, 3]);
///
/// let aligned = EngineSettings {
///     cadence: Cadence::SemesterAligned { months_per_semester: 6 },
///     ..EngineSettings::default()
/// };
/// assert_eq!(
///     due_month_offsets(&aligned, 2, 3).unwrap(),
///     vec![0, 2, 4, 6, 8, 10]
/// );
/// ```
pub fn due_month_offsets(
    settings: &EngineSettings,
    number_of_semesters: u32,
    installments_per_semester: u32,
) -> EngineResult<Vec<u32>> {
    settings.validate("engine settings")?;
    check_installment_ceiling(number_of_semesters, installments_per_semester, settings)?;

    let semesters = u64::from(number_of_semesters);
    let per_semester = u64::from(installments_per_semester);
    let mut offsets: Vec<u64> = Vec::with_capacity((semesters * per_semester) as usize);

    match settings.cadence {
        Cadence::Monthly => offsets.extend(0..semesters * per_semester),
        Cadence::EveryMonths { months } => {
            offsets.extend((0..semesters * per_semester).map(|k| k * u64::from(months)))
        }
        Cadence::SemesterAligned {
            months_per_semester,
        } => {
            let semester_months = u64::from(months_per_semester);
            let spacing = (semester_months / per_semester).max(1);
            for semester in 0..semesters {
                for index in 0..per_semester {
                    let aligned = semester * semester_months + index * spacing;
                    // A semester shorter than its installment run pushes the
                    // next semester's opening back.
                    let offset = match offsets.last() {
                        Some(previous) => aligned.max(previous + 1),
                        None => aligned,
                    };
                    offsets.push(offset);
                }
            }
        }
    }

    offsets
        .into_iter()
        .map(|offset| {
            u32::try_from(offset).map_err(|_| {
                EngineError::config("cohort_start_date", "due dates run past the supported range")
            })
        })
        .collect()
}

/// Rejects a configuration whose installment count exceeds the ceiling.
pub(crate) fn check_installment_ceiling(
    number_of_semesters: u32,
    installments_per_semester: u32,
    settings: &EngineSettings,
) -> EngineResult<()> {
    let total = u64::from(number_of_semesters) * u64::from(installments_per_semester);
    if total > u64::from(settings.max_installments) {
        return Err(EngineError::config(
            "installments_per_semester",
            format!(
                "{} semesters x {} installments exceeds the limit of {} installments",
                number_of_semesters, installments_per_semester, settings.max_installments
            ),
        ));
    }
    Ok(())
}

fn due_date(start: NaiveDate, offset: u32) -> EngineResult<NaiveDate> {
    // Always offset from the start so a 31st start date is not clamped
    // progressively earlier month after month.
    start.checked_add_months(Months::new(offset)).ok_or_else(|| {
        EngineError::config(
            "cohort_start_date",
            format!("due date {} months after {} is out of range", offset, start),
        )
    })
}

/// Builds the base installment template for a fee configuration.
///
/// The base fee is split evenly across semesters, then each semester share is
/// split evenly across its installments. Both splits hand leftover units to
/// the earliest entries, so the template always sums to the base fee exactly.
///
/// # Errors
///
/// `ConfigError` when there are no semesters or installments, the base fee is
/// not positive or not representable at the currency scale, the installment
/// count exceeds `settings.max_installments`, or a due date overflows.
///
/// # Examples
///
/// ```
/// use fee_schedule_engine::calculation::{CurrencyMath, build_base_template};
/// use fee_schedule_engine::config::EngineSettings;
/// use fee_schedule_engine::models::{FeeConfig, FeeConfigInput};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let config = FeeConfig::new(FeeConfigInput {
///     application_fee: Decimal::from(500),
///     admission_fee: Decimal::from(50_000),
///     base_fee: Decimal::from(1000),
///     is_gst_included: false,
///     gst_percent: Decimal::ZERO,
///     number_of_semesters: 1,
///     installments_per_semester: 3,
///     one_shot_discount_percent: Decimal::ZERO,
///     cohort_start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
/// })
/// .unwrap();
///
/// let template = build_base_template(&config, &EngineSettings::default(), &CurrencyMath::default()).unwrap();
/// let shares: Vec<Decimal> = template.installments.iter().map(|i| i.base_fee_share).collect();
/// assert_eq!(shares, vec![Decimal::from(334), Decimal::from(333), Decimal::from(333)]);
/// ```
pub fn build_base_template(
    config: &FeeConfig,
    settings: &EngineSettings,
    math: &CurrencyMath,
) -> EngineResult<BaseTemplate> {
    let semesters = config.number_of_semesters();
    let per_semester = config.installments_per_semester();
    let base_fee = config.base_fee();

    if semesters < 1 {
        return Err(EngineError::config("number_of_semesters", "must be at least 1"));
    }
    if per_semester < 1 {
        return Err(EngineError::config(
            "installments_per_semester",
            "must be at least 1",
        ));
    }
    if base_fee <= Decimal::ZERO {
        return Err(EngineError::config("base_fee", "must be greater than zero"));
    }
    if !math.is_representable(base_fee) {
        return Err(EngineError::config(
            "base_fee",
            format!(
                "{} has more than {} decimal places",
                base_fee,
                math.scale()
            ),
        ));
    }
    let offsets = due_month_offsets(settings, semesters, per_semester)?;
    let start = config.cohort_start_date();
    let semester_shares = math.split_evenly(base_fee, semesters)?;

    let mut installments = Vec::with_capacity(offsets.len());
    let mut offset_iter = offsets.iter();
    for (semester_index, semester_share) in (1..=semesters).zip(&semester_shares) {
        let shares = math.split_evenly(*semester_share, per_semester)?;
        for (installment_index, share) in (1..=per_semester).zip(shares) {
            let offset = offset_iter.next().copied().ok_or_else(|| {
                EngineError::calculation("fewer due dates than installments")
            })?;
            installments.push(Installment::template(
                semester_index,
                installment_index,
                due_date(start, offset)?,
                share,
            ));
        }
    }

    let first_due = installments.first().map(|i| i.due_date.to_string());
    let last_due = installments.last().map(|i| i.due_date.to_string());
    let audit_step = AuditStep {
        step_number: 0,
        rule_id: "base_fee_split".to_string(),
        rule_name: "Base Fee Split".to_string(),
        schedule: None,
        input: serde_json::json!({
            "base_fee": base_fee.to_string(),
            "number_of_semesters": semesters,
            "installments_per_semester": per_semester,
            "cohort_start_date": start.to_string(),
            "cadence": settings.cadence,
        }),
        output: serde_json::json!({
            "semester_shares": semester_shares.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            "installment_count": installments.len(),
            "first_due_date": first_due,
            "last_due_date": last_due,
        }),
        reasoning: format!(
            "{} split across {} semesters, each semester across {} installments; leftover units go to the earliest entries",
            base_fee, semesters, per_semester
        ),
    };

    Ok(BaseTemplate {
        installments,
        semester_shares,
        audit_step,
    })
}
