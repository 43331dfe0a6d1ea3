//! Calculation logic for the fee schedule engine.
//!
//! This module contains the exact currency arithmetic, the base installment
//! template builder, the per-slab scholarship allocator, the one-shot payment
//! calculator and the configuration/schedule validators.

mod currency;
mod one_shot;
mod schedule_builder;
mod scholarship_allocator;
mod validator;

pub use currency::{CurrencyMath, percentage_of, split_evenly};
pub use one_shot::{OneShotResult, calculate_one_shot};
pub use schedule_builder::{BaseTemplate, build_base_template, due_month_offsets};
pub use scholarship_allocator::{SlabAllocation, allocate_scholarship, validate_slabs};
pub use validator::{validate_config, validate_schedules};
