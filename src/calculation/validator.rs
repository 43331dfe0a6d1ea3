//! Configuration and schedule validation.
//!
//! [`validate_config`] rejects input that must never reach the schedule
//! arithmetic. [`validate_schedules`] re-derives every figure of an already
//! built result with exact arithmetic and reports each mismatch as a
//! [`ScheduleInconsistency`]; it never fails.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    FeeConfig, FeeSchedules, InconsistencyCode, ONE_SHOT_SCHEDULE, OneShotPayment, Schedule,
    ScheduleInconsistency, ScheduleTotals, ScholarshipSlab,
};

use super::schedule_builder::check_installment_ceiling;
use super::{CurrencyMath, calculate_one_shot, validate_slabs};

/// Checks a configuration and slab list against the engine settings.
///
/// Configuration problems are reported before slab problems.
///
/// # Errors
///
/// `ConfigError` when a fee has more decimal places than the currency scale
/// or the installment count exceeds the ceiling; `SlabError` from
/// [`validate_slabs`].
pub fn validate_config(
    config: &FeeConfig,
    slabs: &[ScholarshipSlab],
    settings: &EngineSettings,
) -> EngineResult<()> {
    let math = CurrencyMath::new(settings.currency_scale);

    for (field, amount) in [
        ("application_fee", config.application_fee()),
        ("admission_fee", config.admission_fee()),
        ("base_fee", config.base_fee()),
    ] {
        if !math.is_representable(amount) {
            return Err(EngineError::config(
                field,
                format!(
                    "{} has more than {} decimal places",
                    amount, settings.currency_scale
                ),
            ));
        }
    }

    check_installment_ceiling(
        config.number_of_semesters(),
        config.installments_per_semester(),
        settings,
    )?;

    validate_slabs(slabs)
}

struct Findings {
    items: Vec<ScheduleInconsistency>,
}

impl Findings {
    fn push(
        &mut self,
        schedule: &str,
        code: InconsistencyCode,
        discrepancy: Decimal,
        message: String,
    ) {
        warn!(
            schedule = %schedule,
            code = ?code,
            discrepancy = %discrepancy,
            "{}", message
        );
        self.items.push(ScheduleInconsistency {
            schedule: schedule.to_string(),
            code,
            discrepancy,
            message,
        });
    }

    fn compare(
        &mut self,
        schedule: &str,
        code: InconsistencyCode,
        what: &str,
        actual: Decimal,
        expected: Decimal,
    ) {
        if actual != expected {
            self.push(
                schedule,
                code,
                difference(actual, expected),
                format!("{} is {}, expected {}", what, actual, expected),
            );
        }
    }

    fn overflow(&mut self, schedule: &str, what: String) {
        self.push(
            schedule,
            InconsistencyCode::Overflow,
            Decimal::ZERO,
            format!("{} overflows", what),
        );
    }

    fn negative(&mut self, schedule: &str, what: String, amount: Decimal) {
        if amount < Decimal::ZERO {
            self.push(
                schedule,
                InconsistencyCode::NegativeAmount,
                amount,
                format!("{} is negative ({})", what, amount),
            );
        }
    }
}

/// Re-derives every figure in `schedules` and reports each mismatch.
///
/// Comparisons are exact; there is no tolerance. An empty result means every
/// invariant holds.
///
/// # Examples
///
/// ```
/// use fee_schedule_engine::build_schedules;
/// use fee_schedule_engine::calculation::validate_schedules;
/// use fee_schedule_engine::models::{FeeConfig, FeeConfigInput, ScholarshipSlab};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let config = FeeConfig::new(FeeConfigInput {
///     application_fee: Decimal::from(500),
///     admission_fee: Decimal::from(50_000),
///     base_fee: Decimal::from(300_000),
///     is_gst_included: true,
///     gst_percent: Decimal::from(18),
///     number_of_semesters: 3,
///     installments_per_semester: 3,
///     one_shot_discount_percent: Decimal::from(10),
///     cohort_start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
/// })
/// .unwrap();
/// let slabs = vec![ScholarshipSlab::new("Merit", Decimal::from(10), "")];
///
/// let mut schedules = build_schedules(&config, &slabs).unwrap();
/// assert!(validate_schedules(&schedules).is_empty());
///
/// schedules.per_slab[0].installments[0].amount_payable += Decimal::ONE;
/// assert!(!validate_schedules(&schedules).is_empty());
/// ```
pub fn validate_schedules(schedules: &FeeSchedules) -> Vec<ScheduleInconsistency> {
    let math = CurrencyMath::new(schedules.currency_scale);
    let mut findings = Findings { items: Vec::new() };

    for schedule in &schedules.per_slab {
        check_schedule(&schedules.config, schedule, &math, &mut findings);
    }
    check_one_shot(&schedules.config, &schedules.one_shot, &math, &mut findings);

    findings.items
}

fn check_schedule(
    config: &FeeConfig,
    schedule: &Schedule,
    math: &CurrencyMath,
    findings: &mut Findings,
) {
    let name = schedule.slab_name.as_str();

    let mut previous_due: Option<NaiveDate> = None;
    for line in &schedule.installments {
        let label = format!(
            "semester {} installment {}",
            line.semester_index, line.installment_index
        );
        findings.negative(name, format!("{} base fee share", label), line.base_fee_share);
        findings.negative(name, format!("{} scholarship amount", label), line.scholarship_amount);
        findings.negative(name, format!("{} GST amount", label), line.gst_amount);
        findings.negative(name, format!("{} amount payable", label), line.amount_payable);

        match line
            .base_fee_share
            .checked_sub(line.scholarship_amount)
            .and_then(|net| net.checked_add(line.gst_amount))
        {
            Some(expected) => findings.compare(
                name,
                InconsistencyCode::LineMismatch,
                &format!("{} amount payable", label),
                line.amount_payable,
                expected,
            ),
            None => findings.overflow(name, format!("{} share less waiver plus GST", label)),
        }

        if let Some(previous) = previous_due {
            if line.due_date <= previous {
                findings.push(
                    name,
                    InconsistencyCode::DueDateOrder,
                    Decimal::ZERO,
                    format!(
                        "{} is due {} which is not after {}",
                        label, line.due_date, previous
                    ),
                );
            }
        }
        previous_due = Some(line.due_date);
    }

    let mut per_semester: BTreeMap<u32, u32> = BTreeMap::new();
    for line in &schedule.installments {
        *per_semester.entry(line.semester_index).or_default() += 1;
    }
    let expected_count = config.installments_per_semester();
    for semester in 1..=config.number_of_semesters() {
        let count = per_semester.remove(&semester).unwrap_or(0);
        if count != expected_count {
            findings.push(
                name,
                InconsistencyCode::InstallmentCount,
                Decimal::from(i64::from(count) - i64::from(expected_count)),
                format!(
                    "semester {} has {} installments, expected {}",
                    semester, count, expected_count
                ),
            );
        }
    }
    for (semester, count) in per_semester {
        findings.push(
            name,
            InconsistencyCode::InstallmentCount,
            Decimal::from(count),
            format!(
                "semester {} is outside the configured {} semesters",
                semester,
                config.number_of_semesters()
            ),
        );
    }

    let Some(resummed) =
        ScheduleTotals::from_installments(config.base_fee(), &schedule.installments)
    else {
        findings.overflow(name, "sum of installment amounts".to_string());
        return;
    };

    match resummed
        .amount_payable
        .checked_sub(resummed.gst_amount)
        .and_then(|pre_gst| pre_gst.checked_add(resummed.scholarship_waived))
    {
        Some(reconstructed) => findings.compare(
            name,
            InconsistencyCode::BaseFeeMismatch,
            "amount payable less GST plus scholarship",
            reconstructed,
            config.base_fee(),
        ),
        None => findings.overflow(name, "amount payable less GST plus scholarship".to_string()),
    }

    match math.percentage_of(config.base_fee(), schedule.scholarship_percentage) {
        Ok(expected_waiver) => findings.compare(
            name,
            InconsistencyCode::WaiverMismatch,
            "scholarship waived",
            resummed.scholarship_waived,
            expected_waiver,
        ),
        Err(err) => warn!(schedule = %name, error = %err, "Could not re-derive waiver"),
    }

    match math.percentage_of(resummed.net_payable, config.effective_gst_percent()) {
        Ok(expected_gst) => findings.compare(
            name,
            InconsistencyCode::GstMismatch,
            "GST",
            resummed.gst_amount,
            expected_gst,
        ),
        Err(err) => warn!(schedule = %name, error = %err, "Could not re-derive GST"),
    }

    if schedule.totals != resummed {
        findings.push(
            name,
            InconsistencyCode::TotalsMismatch,
            difference(schedule.totals.amount_payable, resummed.amount_payable),
            format!(
                "stored totals {:?} differ from re-summed installments {:?}",
                schedule.totals, resummed
            ),
        );
    }
}

/// `actual - expected`, saturating at the `Decimal` bounds.
fn difference(actual: Decimal, expected: Decimal) -> Decimal {
    actual.checked_sub(expected).unwrap_or(if actual > expected {
        Decimal::MAX
    } else {
        Decimal::MIN
    })
}

fn check_one_shot(
    config: &FeeConfig,
    payment: &OneShotPayment,
    math: &CurrencyMath,
    findings: &mut Findings,
) {
    findings.negative(
        ONE_SHOT_SCHEDULE,
        "one-shot amount payable".to_string(),
        payment.amount_payable,
    );

    match calculate_one_shot(config, math) {
        Ok(expected) if expected.payment != *payment => findings.push(
            ONE_SHOT_SCHEDULE,
            InconsistencyCode::OneShotMismatch,
            difference(payment.amount_payable, expected.payment.amount_payable),
            format!(
                "one-shot payment {:?} does not match re-derived {:?}",
                payment, expected.payment
            ),
        ),
        Ok(_) => {}
        Err(err) => warn!(error = %err, "Could not re-derive one-shot payment"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_schedules;
    use crate::models::FeeConfigInput;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_config(base_fee: &str) -> FeeConfig {
        FeeConfig::new(FeeConfigInput {
            application_fee: dec("500"),
            admission_fee: dec("50000"),
            base_fee: dec(base_fee),
            is_gst_included: true,
            gst_percent: dec("18"),
            number_of_semesters: 2,
            installments_per_semester: 3,
            one_shot_discount_percent: dec("10"),
            cohort_start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        })
        .unwrap()
    }

    fn create_schedules() -> FeeSchedules {
        let slabs = vec![
            ScholarshipSlab::new("Excellence", dec("30"), "A"),
            ScholarshipSlab::new("Merit", dec("15"), "B"),
        ];
        build_schedules(&create_config("250001"), &slabs).unwrap()
    }

    fn codes(findings: &[ScheduleInconsistency]) -> Vec<InconsistencyCode> {
        findings.iter().map(|f| f.code).collect()
    }

    fn found_only_in(findings: &[ScheduleInconsistency], schedule: &str) -> bool {
        findings.iter().all(|f| f.schedule == schedule)
    }

    /// SV-001: freshly built schedules are consistent
    #[test]
    fn test_built_schedules_are_consistent() {
        assert!(validate_schedules(&create_schedules()).is_empty());
    }

    /// SV-002: tampered waiver no longer matches the slab percentage
    #[test]
    fn test_tampered_waiver_detected() {
        let mut schedules = create_schedules();
        let line = &mut schedules.per_slab[1].installments[2];
        line.scholarship_amount += dec("5");
        line.amount_payable -= dec("5");

        let findings = validate_schedules(&schedules);
        let found = codes(&findings);
        assert!(found.contains(&InconsistencyCode::WaiverMismatch));
        assert!(found.contains(&InconsistencyCode::GstMismatch));
        assert!(found.contains(&InconsistencyCode::TotalsMismatch));
        assert!(!found.contains(&InconsistencyCode::BaseFeeMismatch));

        let waiver = findings
            .iter()
            .find(|f| f.code == InconsistencyCode::WaiverMismatch)
            .unwrap();
        assert_eq!(waiver.schedule, "Merit");
        assert_eq!(waiver.discrepancy, dec("5"));
    }

    #[test]
    fn test_tampered_share_breaks_base_fee_identity() {
        let mut schedules = create_schedules();
        let line = &mut schedules.per_slab[0].installments[0];
        line.base_fee_share += Decimal::ONE;
        line.amount_payable += Decimal::ONE;

        let findings = validate_schedules(&schedules);
        let base = findings
            .iter()
            .find(|f| f.code == InconsistencyCode::BaseFeeMismatch)
            .unwrap();
        assert_eq!(base.schedule, "Excellence");
        assert_eq!(base.discrepancy, Decimal::ONE);
    }

    /// SV-003: swapped due dates detected
    #[test]
    fn test_due_date_order_detected() {
        let mut schedules = create_schedules();
        let installments = &mut schedules.per_slab[0].installments;
        let first = installments[0].due_date;
        installments[0].due_date = installments[1].due_date;
        installments[1].due_date = first;

        let findings = validate_schedules(&schedules);
        assert_eq!(codes(&findings), vec![InconsistencyCode::DueDateOrder]);
        assert_eq!(findings[0].schedule, "Excellence");
    }

    /// SV-004: missing installment detected
    #[test]
    fn test_missing_installment_detected() {
        let mut schedules = create_schedules();
        schedules.per_slab[0].installments.pop();

        let findings = validate_schedules(&schedules);
        let count = findings
            .iter()
            .find(|f| f.code == InconsistencyCode::InstallmentCount)
            .unwrap();
        assert_eq!(count.discrepancy, dec("-1"));
        assert!(count.message.contains("semester 2"));
    }

    #[test]
    fn test_negative_amount_detected() {
        let mut schedules = create_schedules();
        let line = &mut schedules.per_slab[0].installments[0];
        line.gst_amount = -line.gst_amount;
        line.amount_payable = line.base_fee_share - line.scholarship_amount + line.gst_amount;

        let found = codes(&validate_schedules(&schedules));
        assert!(found.contains(&InconsistencyCode::NegativeAmount));
        assert!(found.contains(&InconsistencyCode::GstMismatch));
    }

    #[test]
    fn test_line_mismatch_detected() {
        let mut schedules = create_schedules();
        schedules.per_slab[0].installments[4].amount_payable += Decimal::ONE;

        let found = codes(&validate_schedules(&schedules));
        assert!(found.contains(&InconsistencyCode::LineMismatch));
        assert!(found.contains(&InconsistencyCode::TotalsMismatch));
    }

    #[test]
    fn test_overflowing_amounts_reported_not_panicking() {
        let mut schedules = create_schedules();
        let installments = &mut schedules.per_slab[0].installments;
        installments[0].amount_payable = Decimal::MAX;
        installments[1].amount_payable = Decimal::MAX;

        let findings = validate_schedules(&schedules);
        let overflow = findings
            .iter()
            .find(|f| f.code == InconsistencyCode::Overflow)
            .unwrap();
        assert_eq!(overflow.schedule, "Excellence");
        assert!(found_only_in(&findings, "Excellence"));
    }

    #[test]
    fn test_overflowing_line_reported() {
        let mut schedules = create_schedules();
        let line = &mut schedules.per_slab[1].installments[0];
        line.base_fee_share = Decimal::MAX;
        line.gst_amount = Decimal::MAX;

        let found = codes(&validate_schedules(&schedules));
        assert!(found.contains(&InconsistencyCode::Overflow));
    }

    #[test]
    fn test_extreme_discrepancy_saturates() {
        assert_eq!(difference(Decimal::MAX, Decimal::MIN), Decimal::MAX);
        assert_eq!(difference(Decimal::MIN, Decimal::MAX), Decimal::MIN);
        assert_eq!(difference(dec("5"), dec("3")), dec("2"));
    }

    #[test]
    fn test_one_shot_mismatch_detected() {
        let mut schedules = create_schedules();
        schedules.one_shot.amount_payable -= dec("100");

        let findings = validate_schedules(&schedules);
        assert_eq!(codes(&findings), vec![InconsistencyCode::OneShotMismatch]);
        assert_eq!(findings[0].schedule, "one-shot");
        assert_eq!(findings[0].discrepancy, dec("-100"));
    }

    #[test]
    fn test_validate_config_rejects_fractional_fee_at_whole_units() {
        let config = create_config("1000.5");
        match validate_config(&config, &[], &EngineSettings::default()) {
            Err(EngineError::ConfigError { field, .. }) => assert_eq!(field, "base_fee"),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_config_accepts_fractional_fee_at_paise() {
        let config = create_config("1000.5");
        let settings = EngineSettings {
            currency_scale: 2,
            ..EngineSettings::default()
        };
        assert!(validate_config(&config, &[], &settings).is_ok());
    }

    #[test]
    fn test_validate_config_reports_config_before_slab_errors() {
        let config = create_config("1000.5");
        let slabs = vec![
            ScholarshipSlab::new("A", dec("10"), ""),
            ScholarshipSlab::new("A", dec("10"), ""),
        ];
        assert!(matches!(
            validate_config(&config, &slabs, &EngineSettings::default()),
            Err(EngineError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_validate_config_ceiling() {
        let config = create_config("1000");
        let settings = EngineSettings {
            max_installments: 5,
            ..EngineSettings::default()
        };
        assert!(validate_config(&config, &[], &settings).is_err());
    }
}
