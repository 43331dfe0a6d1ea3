//! Exact currency arithmetic.
//!
//! Every split and percentage in the engine goes through [`CurrencyMath`],
//! which works on integer minor units so that split amounts always add back
//! up to the amount they came from. Remainders are handed out one minor unit
//! at a time, lowest index first.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::MAX_CURRENCY_SCALE;
use crate::error::{EngineError, EngineResult};

/// Exact-rounding arithmetic at a fixed currency scale.
///
/// # Examples
///
/// ```
/// use fee_schedule_engine::calculation::CurrencyMath;
/// use rust_decimal::Decimal;
///
/// let paise = CurrencyMath::new(2);
/// let parts = paise.split_evenly(Decimal::from(1000), 3).unwrap();
/// assert_eq!(parts[0].to_string(), "333.34");
/// assert_eq!(parts.iter().sum::<Decimal>(), Decimal::from(1000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CurrencyMath {
    scale: u32,
}

impl CurrencyMath {
    /// Creates helpers for the given number of decimal places.
    ///
    /// Scales above [`MAX_CURRENCY_SCALE`] are clamped to it.
    pub fn new(scale: u32) -> Self {
        Self {
            scale: scale.min(MAX_CURRENCY_SCALE),
        }
    }

    /// Decimal places of the smallest currency unit.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// The smallest currency unit, e.g. `0.01` at scale 2.
    pub fn unit(&self) -> Decimal {
        Decimal::new(1, self.scale)
    }

    /// Rounds half-up to the smallest currency unit.
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.scale, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Returns true when `amount` needs no rounding at this scale.
    pub fn is_representable(&self, amount: Decimal) -> bool {
        amount.round_dp_with_strategy(self.scale, RoundingStrategy::ToZero) == amount
    }

    /// Returns `pct` percent of `amount`, rounded half-up to the smallest unit.
    ///
    /// # Examples
    ///
    /// ```
    /// use fee_schedule_engine::calculation::CurrencyMath;
    /// use rust_decimal::Decimal;
    ///
    /// let rupees = CurrencyMath::new(0);
    /// assert_eq!(rupees.percentage_of(Decimal::from(15), Decimal::from(10)).unwrap(), Decimal::from(2));
    /// assert_eq!(rupees.percentage_of(Decimal::from(14), Decimal::from(10)).unwrap(), Decimal::from(1));
    /// ```
    pub fn percentage_of(&self, amount: Decimal, pct: Decimal) -> EngineResult<Decimal> {
        let product = amount.checked_mul(pct).ok_or_else(|| {
            EngineError::calculation(format!("{} x {}% overflows", amount, pct))
        })?;
        Ok(self.round(product / Decimal::ONE_HUNDRED))
    }

    /// Splits `total` into `parts` amounts that differ by at most one unit.
    ///
    /// Every part gets the floor share; the leftover units go to the first
    /// parts, one each.
    ///
    /// # Errors
    ///
    /// `CalculationError` when `parts` is zero, `total` is negative, or
    /// `total` has more decimal places than the currency scale.
    pub fn split_evenly(&self, total: Decimal, parts: u32) -> EngineResult<Vec<Decimal>> {
        if parts == 0 {
            return Err(EngineError::calculation("cannot split into zero parts"));
        }
        let units = self.to_units(total)?;

        let count = i128::from(parts);
        let floor = units / count;
        let remainder = units % count;

        (0..count)
            .map(|i| self.from_units(floor + i128::from(i < remainder)))
            .collect()
    }

    /// Splits `total` in proportion to `weights`.
    ///
    /// Each element gets `floor(total * weight / sum(weights))`; the leftover
    /// units go one each to the lowest-indexed elements with non-zero weight.
    /// No element ever receives more than its exact proportional share
    /// rounded up, so with `total <= sum(weights)` every element stays within
    /// its own weight.
    ///
    /// # Errors
    ///
    /// `CalculationError` when `total` or any weight is negative or not
    /// representable, when the weights sum to zero while `total` does not,
    /// or when the intermediate product overflows.
    pub fn split_pro_rata(&self, total: Decimal, weights: &[Decimal]) -> EngineResult<Vec<Decimal>> {
        let total_units = self.to_units(total)?;
        let weight_units = weights
            .iter()
            .map(|w| self.to_units(*w))
            .collect::<EngineResult<Vec<i128>>>()?;
        let weight_sum: i128 = weight_units.iter().sum();

        if weight_sum == 0 {
            if total_units == 0 {
                return Ok(vec![Decimal::ZERO; weights.len()]);
            }
            return Err(EngineError::calculation(format!(
                "cannot distribute {} across zero weight",
                total
            )));
        }

        let mut shares = weight_units
            .iter()
            .map(|w| {
                total_units
                    .checked_mul(*w)
                    .map(|product| product / weight_sum)
                    .ok_or_else(|| {
                        EngineError::calculation(format!("distributing {} overflows", total))
                    })
            })
            .collect::<EngineResult<Vec<i128>>>()?;

        let mut remainder = total_units - shares.iter().sum::<i128>();
        while remainder > 0 {
            for (share, weight) in shares.iter_mut().zip(&weight_units) {
                if remainder == 0 {
                    break;
                }
                if *weight > 0 {
                    *share += 1;
                    remainder -= 1;
                }
            }
        }

        shares.into_iter().map(|u| self.from_units(u)).collect()
    }

    fn to_units(&self, amount: Decimal) -> EngineResult<i128> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(EngineError::calculation(format!(
                "amount {} is negative",
                amount
            )));
        }
        if !self.is_representable(amount) {
            return Err(EngineError::calculation(format!(
                "amount {} has more than {} decimal places",
                amount, self.scale
            )));
        }
        let factor = Decimal::from(10_i64.pow(self.scale));
        amount
            .checked_mul(factor)
            .and_then(|units| units.to_i128())
            .ok_or_else(|| EngineError::calculation(format!("amount {} is out of range", amount)))
    }

    fn from_units(&self, units: i128) -> EngineResult<Decimal> {
        Decimal::try_from_i128_with_scale(units, self.scale)
            .map_err(|e| EngineError::calculation(e.to_string()))
    }
}

/// Splits `total` whole currency units evenly into `parts`.
///
/// # Examples
///
/// ```
/// use fee_schedule_engine::calculation::split_evenly;
/// use rust_decimal::Decimal;
///
/// let parts = split_evenly(Decimal::from(1000), 3).unwrap();
/// assert_eq!(parts, vec![Decimal::from(334), Decimal::from(333), Decimal::from(333)]);
/// ```
pub fn split_evenly(total: Decimal, parts: u32) -> EngineResult<Vec<Decimal>> {
    CurrencyMath::default().split_evenly(total, parts)
}

/// Returns `pct` percent of `amount`, rounded half-up to whole currency units.
pub fn percentage_of(amount: Decimal, pct: Decimal) -> EngineResult<Decimal> {
    CurrencyMath::default().percentage_of(amount, pct)
}
