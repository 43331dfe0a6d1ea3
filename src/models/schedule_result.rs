//! Schedule result models for the fee schedule engine.
//!
//! This module contains the [`FeeSchedules`] type and its associated
//! structures: per-slab schedules, the one-shot payment, upfront fees,
//! validator findings and the audit trace.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{FeeConfig, Installment};

/// Name used for the one-shot option wherever a schedule name is expected.
pub const ONE_SHOT_SCHEDULE: &str = "one-shot";

/// Aggregated totals of a schedule.
///
/// # Example
///
/// ```
/// use fee_schedule_engine::models::ScheduleTotals;
/// use rust_decimal::Decimal;
///
/// let totals = ScheduleTotals::from_installments(Decimal::from(1000), &[]).unwrap();
/// assert_eq!(totals.base_fee, Decimal::from(1000));
/// assert_eq!(totals.amount_payable, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTotals {
    /// The base fee the schedule was derived from.
    pub base_fee: Decimal,
    /// Total waived by the scholarship.
    pub scholarship_waived: Decimal,
    /// Total payable before GST.
    pub net_payable: Decimal,
    /// Total GST.
    pub gst_amount: Decimal,
    /// Total payable including GST.
    pub amount_payable: Decimal,
}

impl ScheduleTotals {
    /// Sums the installment columns.
    ///
    /// Returns `None` when any column sum leaves the `Decimal` range.
    pub fn from_installments(base_fee: Decimal, installments: &[Installment]) -> Option<Self> {
        let mut totals = Self {
            base_fee,
            scholarship_waived: Decimal::ZERO,
            net_payable: Decimal::ZERO,
            gst_amount: Decimal::ZERO,
            amount_payable: Decimal::ZERO,
        };
        for line in installments {
            let net = line.base_fee_share.checked_sub(line.scholarship_amount)?;
            totals.scholarship_waived = totals.scholarship_waived.checked_add(line.scholarship_amount)?;
            totals.net_payable = totals.net_payable.checked_add(net)?;
            totals.gst_amount = totals.gst_amount.checked_add(line.gst_amount)?;
            totals.amount_payable = totals.amount_payable.checked_add(line.amount_payable)?;
        }
        Some(totals)
    }
}

/// The installment schedule for one scholarship slab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Name of the slab this schedule belongs to.
    pub slab_name: String,
    /// Qualifying criterion label copied from the slab.
    pub clearance: String,
    /// Waiver percentage of the slab.
    pub scholarship_percentage: Decimal,
    /// Ordered payment lines, semester by semester.
    pub installments: Vec<Installment>,
    /// Column totals over `installments`.
    pub totals: ScheduleTotals,
}

impl Schedule {
    /// Returns the installments of one semester (1-based).
    pub fn semester(&self, semester_index: u32) -> impl Iterator<Item = &Installment> {
        self.installments
            .iter()
            .filter(move |line| line.semester_index == semester_index)
    }

    /// Total waived in one semester.
    pub fn semester_waiver(&self, semester_index: u32) -> Decimal {
        self.semester(semester_index)
            .map(|line| line.scholarship_amount)
            .sum()
    }

    /// Total payable (including GST) in one semester.
    pub fn semester_payable(&self, semester_index: u32) -> Decimal {
        self.semester(semester_index)
            .map(|line| line.amount_payable)
            .sum()
    }
}

/// The single upfront payment alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneShotPayment {
    /// Due date (the cohort start date).
    pub due_date: NaiveDate,
    /// Undiscounted base fee.
    pub base_fee: Decimal,
    /// Discount percentage applied.
    pub discount_percent: Decimal,
    /// Amount waived by the one-shot discount.
    pub scholarship_amount: Decimal,
    /// GST on the discounted fee.
    pub gst_amount: Decimal,
    /// Amount payable including GST.
    pub amount_payable: Decimal,
}

impl OneShotPayment {
    /// Amount payable before GST.
    pub fn net_payable(&self) -> Decimal {
        self.base_fee - self.scholarship_amount
    }
}

/// Fees settled outside the installment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpfrontFees {
    /// Application fee.
    pub application_fee: Decimal,
    /// Admission ("token") fee.
    pub admission_fee: Decimal,
    /// Date by which the admission fee is expected (the cohort start date).
    pub due_date: NaiveDate,
}

/// A single step in the audit trace recording how a figure was derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Schedule this step applies to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The ordered audit trace of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
}

impl AuditTrace {
    /// Number to give the next step.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Appends a step, renumbering it to follow the existing ones.
    pub fn push(&mut self, mut step: AuditStep) {
        step.step_number = self.next_step_number();
        self.steps.push(step);
    }
}

/// Everything produced for one fee configuration.
///
/// The configuration and currency scale travel with the result so the
/// validator can re-derive every expected figure from the result alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedules {
    /// The configuration the schedules were built from.
    pub config: FeeConfig,
    /// Decimal places of the smallest currency unit used for rounding.
    pub currency_scale: u32,
    /// Application and admission fees.
    pub upfront: UpfrontFees,
    /// One schedule per scholarship slab, in input order.
    pub per_slab: Vec<Schedule>,
    /// The one-shot payment option.
    pub one_shot: OneShotPayment,
    /// How every figure was derived.
    pub audit_trace: AuditTrace,
}

impl FeeSchedules {
    /// Looks up a slab's schedule by name.
    pub fn schedule(&self, slab_name: &str) -> Option<&Schedule> {
        self.per_slab.iter().find(|s| s.slab_name == slab_name)
    }
}

/// Category of a validator finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InconsistencyCode {
    /// Net payable plus waiver does not reconstruct the base fee.
    BaseFeeMismatch,
    /// The waiver total differs from the slab percentage of the base fee.
    WaiverMismatch,
    /// The GST total differs from the GST percentage of the net total.
    GstMismatch,
    /// A line's payable amount differs from share minus waiver plus GST.
    LineMismatch,
    /// The stored totals differ from the re-summed lines.
    TotalsMismatch,
    /// An amount is negative.
    NegativeAmount,
    /// Due dates are not strictly increasing.
    DueDateOrder,
    /// A semester holds the wrong number of installments.
    InstallmentCount,
    /// The one-shot payment does not re-derive from the configuration.
    OneShotMismatch,
    /// Re-summing the amounts leaves the representable range.
    Overflow,
}

/// A non-fatal finding from the schedule validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInconsistency {
    /// Slab name, or `"one-shot"`.
    pub schedule: String,
    /// Category of the finding.
    pub code: InconsistencyCode,
    /// Signed difference, actual minus expected (zero for ordering findings).
    pub discrepancy: Decimal,
    /// Human-readable description.
    pub message: String,
}

/// Built schedules together with the validator's findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedSchedules {
    /// The computed schedules.
    pub schedules: FeeSchedules,
    /// Findings; empty when every invariant holds.
    pub inconsistencies: Vec<ScheduleInconsistency>,
}

impl ValidatedSchedules {
    /// Returns true when the validator found nothing.
    pub fn is_consistent(&self) -> bool {
        self.inconsistencies.is_empty()
    }
}
