//! Core data models for the fee schedule engine.
//!
//! This module contains all the domain models used throughout the engine.

mod fee_config;
mod installment;
mod schedule_result;
mod scholarship;

pub use fee_config::{FeeConfig, FeeConfigInput};
pub use installment::Installment;
pub use schedule_result::{
    AuditStep, AuditTrace, FeeSchedules, InconsistencyCode, ONE_SHOT_SCHEDULE, OneShotPayment,
    Schedule, ScheduleInconsistency, ScheduleTotals, UpfrontFees, ValidatedSchedules,
};
pub use scholarship::ScholarshipSlab;
