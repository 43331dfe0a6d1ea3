//! One-shot payment calculation.
//!
//! This module computes the single upfront payment option: the base fee less
//! the configured one-shot discount, plus GST when enabled, due on the cohort
//! start date.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, FeeConfig, ONE_SHOT_SCHEDULE, OneShotPayment};

use super::CurrencyMath;

/// The one-shot payment and the audit step recording it.
#[derive(Debug, Clone)]
pub struct OneShotResult {
    /// The computed payment.
    pub payment: OneShotPayment,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the one-shot payment for a fee configuration.
///
/// # Errors
///
/// `ConfigError` when the discount percentage lies outside `[0, 100]`.
///
/// # Examples
///
/// ```
/// use fee_schedule_engine::calculation::{CurrencyMath, calculate_one_shot};
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
/// let result = calculate_one_shot(&config, &CurrencyMath::default()).unwrap();
/// assert_eq!(result.payment.amount_payable, Decimal::from(270_000));
/// ```
pub fn calculate_one_shot(config: &FeeConfig, math: &CurrencyMath) -> EngineResult<OneShotResult> {
    let discount_percent = config.one_shot_discount_percent();
    if discount_percent < Decimal::ZERO || discount_percent > Decimal::ONE_HUNDRED {
        return Err(EngineError::config(
            "one_shot_discount_percent",
            format!("must be between 0 and 100, got {}", discount_percent),
        ));
    }

    let base_fee = config.base_fee();
    let discount = math.percentage_of(base_fee, discount_percent)?;
    let payable = base_fee - discount;
    let gst_amount = math.percentage_of(payable, config.effective_gst_percent())?;
    let amount_payable = payable.checked_add(gst_amount).ok_or_else(|| {
        EngineError::calculation(format!("{} plus GST {} overflows", payable, gst_amount))
    })?;

    let payment = OneShotPayment {
        due_date: config.cohort_start_date(),
        base_fee,
        discount_percent,
        scholarship_amount: discount,
        gst_amount,
        amount_payable,
    };

    let reasoning = if config.is_gst_included() {
        format!(
            "{} less {}% one-shot discount ({}) = {}, plus {}% GST ({}) = {}",
            base_fee,
            discount_percent.normalize(),
            discount,
            payable,
            config.gst_percent().normalize(),
            gst_amount,
            amount_payable
        )
    } else {
        format!(
            "{} less {}% one-shot discount ({}) = {}",
            base_fee,
            discount_percent.normalize(),
            discount,
            amount_payable
        )
    };

    let audit_step = AuditStep {
        step_number: 0,
        rule_id: "one_shot_discount".to_string(),
        rule_name: "One-Shot Discount".to_string(),
        schedule: Some(ONE_SHOT_SCHEDULE.to_string()),
        input: serde_json::json!({
            "base_fee": base_fee.to_string(),
            "discount_percent": discount_percent.normalize().to_string(),
            "gst_included": config.is_gst_included(),
        }),
        output: serde_json::json!({
            "discount": discount.to_string(),
            "gst_amount": gst_amount.to_string(),
            "amount_payable": amount_payable.to_string(),
            "due_date": payment.due_date.to_string(),
        }),
        reasoning,
    };

    Ok(OneShotResult {
        payment,
        audit_step,
    })
}
