//! Installment model.
//!
//! An [`Installment`] is one scheduled payment line. The base template built
//! from a fee configuration holds installments with no waiver and no GST;
//! the scholarship allocator fills those columns in per slab.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One scheduled payment line.
///
/// # Example
///
/// ```
/// use fee_schedule_engine::models::Installment;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let line = Installment {
///     semester_index: 1,
///     installment_index: 1,
///     due_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
///     base_fee_share: Decimal::from(33_334),
///     scholarship_amount: Decimal::from(3_334),
///     gst_amount: Decimal::from(5_400),
///     amount_payable: Decimal::from(35_400),
/// };
/// assert_eq!(line.net_payable(), Decimal::from(30_000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    /// Semester number, 1-based.
    pub semester_index: u32,
    /// Installment number within the semester, 1-based.
    pub installment_index: u32,
    /// Date the installment falls due.
    pub due_date: NaiveDate,
    /// Undiscounted share of the base fee.
    pub base_fee_share: Decimal,
    /// Portion of the share waived by the scholarship.
    pub scholarship_amount: Decimal,
    /// GST levied on the net amount.
    pub gst_amount: Decimal,
    /// Amount the student pays: share minus waiver plus GST.
    pub amount_payable: Decimal,
}

impl Installment {
    /// Creates a template line carrying only its base fee share.
    pub fn template(
        semester_index: u32,
        installment_index: u32,
        due_date: NaiveDate,
        base_fee_share: Decimal,
    ) -> Self {
        Self {
            semester_index,
            installment_index,
            due_date,
            base_fee_share,
            scholarship_amount: Decimal::ZERO,
            gst_amount: Decimal::ZERO,
            amount_payable: base_fee_share,
        }
    }

    /// Amount payable before GST.
    pub fn net_payable(&self) -> Decimal {
        self.base_fee_share - self.scholarship_amount
    }
}
