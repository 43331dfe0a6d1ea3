//! Fee Structure & Scholarship Installment Engine
//!
//! This crate turns a cohort's fee configuration and scholarship slabs into
//! complete, internally consistent payment schedules: one installment
//! schedule per slab plus a one-shot upfront option. All amounts are exact;
//! split and waived figures always add back up to the fee they came from.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;

pub use engine::{FeeEngine, ScheduleRequest, build_schedules, validate};
