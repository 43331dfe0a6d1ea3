//! The fee schedule engine entry points.
//!
//! [`FeeEngine`] ties the calculation steps together: validate the input,
//! build the base template, fan it out per scholarship slab, compute the
//! one-shot option, and hand the result back with its audit trace.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calculation::{
    CurrencyMath, allocate_scholarship, build_base_template, calculate_one_shot, validate_config,
    validate_schedules,
};
use crate::config::{ConfigLoader, EngineSettings};
use crate::error::EngineResult;
use crate::models::{
    AuditTrace, FeeConfig, FeeSchedules, ScheduleInconsistency, ScholarshipSlab, UpfrontFees,
    ValidatedSchedules,
};

/// One independent schedule request, as used by [`FeeEngine::preview_many`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// The cohort fee configuration.
    pub config: FeeConfig,
    /// The scholarship slabs to build schedules for.
    #[serde(default)]
    pub slabs: Vec<ScholarshipSlab>,
}

/// Builds and validates fee schedules under a fixed set of settings.
///
/// The engine holds no mutable state; one instance can serve any number of
/// threads.
///
/// # Example
///
/// ```
/// use fee_schedule_engine::FeeEngine;
/// use fee_schedule_engine::models::{FeeConfig, FeeConfigInput, ScholarshipSlab};
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
/// let slabs = vec![ScholarshipSlab::new("Merit", Decimal::from(10), "")];
///
/// let result = FeeEngine::default().build_and_validate(&config, &slabs).unwrap();
/// assert!(result.is_consistent());
/// assert_eq!(result.schedules.per_slab[0].totals.amount_payable, Decimal::from(270_000));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeEngine {
    settings: EngineSettings,
}

impl FeeEngine {
    /// Creates an engine after checking the settings.
    pub fn new(settings: EngineSettings) -> EngineResult<Self> {
        settings.validate("engine settings")?;
        Ok(Self { settings })
    }

    /// Creates an engine from already-loaded settings.
    pub fn from_loader(loader: ConfigLoader) -> Self {
        Self {
            settings: loader.into_settings(),
        }
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Currency helpers at the configured scale.
    pub fn currency(&self) -> CurrencyMath {
        CurrencyMath::new(self.settings.currency_scale)
    }

    /// Checks a configuration and slab list without building anything.
    pub fn validate_input(
        &self,
        config: &FeeConfig,
        slabs: &[ScholarshipSlab],
    ) -> EngineResult<()> {
        validate_config(config, slabs, &self.settings)
    }

    /// Builds one schedule per slab plus the one-shot payment.
    ///
    /// # Errors
    ///
    /// `ConfigError` or `SlabError` for input that fails validation. These
    /// are raised before any schedule is built.
    pub fn build_schedules(
        &self,
        config: &FeeConfig,
        slabs: &[ScholarshipSlab],
    ) -> EngineResult<FeeSchedules> {
        if let Err(err) = self.validate_input(config, slabs) {
            warn!(error = %err, "Rejected fee configuration");
            return Err(err);
        }

        let math = self.currency();
        let mut audit_trace = AuditTrace::default();

        let template = build_base_template(config, &self.settings, &math)?;
        debug!(
            installments = template.installments.len(),
            semesters = template.semester_shares.len(),
            "Built base installment template"
        );
        audit_trace.push(template.audit_step);

        let mut per_slab = Vec::with_capacity(slabs.len());
        for slab in slabs {
            let allocation = allocate_scholarship(&template.installments, config, slab, &math)?;
            debug!(
                slab = %slab.name,
                waived = %allocation.schedule.totals.scholarship_waived,
                payable = %allocation.schedule.totals.amount_payable,
                "Allocated scholarship slab"
            );
            for step in allocation.audit_steps {
                audit_trace.push(step);
            }
            per_slab.push(allocation.schedule);
        }

        let one_shot = calculate_one_shot(config, &math)?;
        debug!(payable = %one_shot.payment.amount_payable, "Calculated one-shot payment");
        audit_trace.push(one_shot.audit_step);

        info!(
            base_fee = %config.base_fee(),
            slabs = per_slab.len(),
            installments = template.installments.len(),
            "Fee schedules built"
        );

        Ok(FeeSchedules {
            config: config.clone(),
            currency_scale: math.scale(),
            upfront: UpfrontFees {
                application_fee: config.application_fee(),
                admission_fee: config.admission_fee(),
                due_date: config.cohort_start_date(),
            },
            per_slab,
            one_shot: one_shot.payment,
            audit_trace,
        })
    }

    /// Re-checks a built result; see [`validate_schedules`].
    pub fn validate(&self, schedules: &FeeSchedules) -> Vec<ScheduleInconsistency> {
        validate_schedules(schedules)
    }

    /// Builds schedules and validates them in one call.
    ///
    /// Validator findings do not fail the call; they are returned alongside
    /// the schedules for the caller to act on.
    pub fn build_and_validate(
        &self,
        config: &FeeConfig,
        slabs: &[ScholarshipSlab],
    ) -> EngineResult<ValidatedSchedules> {
        let schedules = self.build_schedules(config, slabs)?;
        let inconsistencies = self.validate(&schedules);
        if !inconsistencies.is_empty() {
            warn!(
                count = inconsistencies.len(),
                "Fee schedules built with inconsistencies"
            );
        }
        Ok(ValidatedSchedules {
            schedules,
            inconsistencies,
        })
    }

    /// Builds many independent requests in parallel.
    ///
    /// Results come back in request order; a failing request does not affect
    /// the others.
    pub fn preview_many(&self, requests: &[ScheduleRequest]) -> Vec<EngineResult<FeeSchedules>> {
        requests
            .par_iter()
            .map(|request| self.build_schedules(&request.config, &request.slabs))
            .collect()
    }
}

/// Builds schedules with default engine settings.
pub fn build_schedules(
    config: &FeeConfig,
    slabs: &[ScholarshipSlab],
) -> EngineResult<FeeSchedules> {
    FeeEngine::default().build_schedules(config, slabs)
}

/// Validates a built result; an empty list means every invariant holds.
pub fn validate(schedules: &FeeSchedules) -> Vec<ScheduleInconsistency> {
    validate_schedules(schedules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cadence;
    use crate::error::EngineError;
    use crate::models::FeeConfigInput;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_config(base_fee: &str, gst: bool) -> FeeConfig {
        FeeConfig::new(FeeConfigInput {
            application_fee: dec("500"),
            admission_fee: dec("50000"),
            base_fee: dec(base_fee),
            is_gst_included: gst,
            gst_percent: dec("18"),
            number_of_semesters: 3,
            installments_per_semester: 3,
            one_shot_discount_percent: dec("10"),
            cohort_start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        })
        .unwrap()
    }

    fn create_slabs() -> Vec<ScholarshipSlab> {
        vec![
            ScholarshipSlab::new("Excellence", dec("30"), "Top band"),
            ScholarshipSlab::new("Merit", dec("10"), "Middle band"),
        ]
    }

    #[test]
    fn test_build_produces_schedule_per_slab_in_order() {
        let schedules = FeeEngine::default()
            .build_schedules(&create_config("300000", false), &create_slabs())
            .unwrap();

        let names: Vec<&str> = schedules
            .per_slab
            .iter()
            .map(|s| s.slab_name.as_str())
            .collect();
        assert_eq!(names, vec!["Excellence", "Merit"]);
        assert_eq!(
            schedules.schedule("Merit").unwrap().totals.amount_payable,
            dec("270000")
        );
        assert_eq!(schedules.one_shot.amount_payable, dec("270000"));
        assert_eq!(schedules.upfront.admission_fee, dec("50000"));
    }

    #[test]
    fn test_no_slabs_still_builds_one_shot() {
        let schedules = build_schedules(&create_config("300000", false), &[]).unwrap();
        assert!(schedules.per_slab.is_empty());
        assert_eq!(schedules.one_shot.amount_payable, dec("270000"));
    }

    #[test]
    fn test_audit_trace_order() {
        let schedules = build_schedules(&create_config("300000", true), &create_slabs()).unwrap();

        let rules: Vec<&str> = schedules
            .audit_trace
            .steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        assert_eq!(
            rules,
            vec![
                "base_fee_split",
                "scholarship_waiver",
                "gst_levy",
                "scholarship_waiver",
                "gst_levy",
                "one_shot_discount"
            ]
        );
        let numbers: Vec<u32> = schedules
            .audit_trace
            .steps
            .iter()
            .map(|s| s.step_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_duplicate_slab_rejected_before_build() {
        let slabs = vec![
            ScholarshipSlab::new("Excellence", dec("30"), ""),
            ScholarshipSlab::new("Excellence", dec("20"), ""),
        ];
        let result = build_schedules(&create_config("300000", false), &slabs);
        assert!(matches!(result, Err(EngineError::SlabError { .. })));
    }

    #[test]
    fn test_build_and_validate_consistent() {
        let result = FeeEngine::default()
            .build_and_validate(&create_config("250001", true), &create_slabs())
            .unwrap();
        assert!(result.is_consistent());
    }

    #[test]
    fn test_paise_scale_engine() {
        let engine = FeeEngine::new(EngineSettings {
            currency_scale: 2,
            ..EngineSettings::default()
        })
        .unwrap();
        let schedules = engine
            .build_schedules(&create_config("100000.01", true), &create_slabs())
            .unwrap();

        assert_eq!(schedules.currency_scale, 2);
        let merit = schedules.schedule("Merit").unwrap();
        assert_eq!(merit.totals.scholarship_waived, dec("10000.00"));
        assert!(validate(&schedules).is_empty());
    }

    #[test]
    fn test_custom_cadence_applied() {
        let engine = FeeEngine::new(EngineSettings {
            cadence: Cadence::SemesterAligned {
                months_per_semester: 6,
            },
            ..EngineSettings::default()
        })
        .unwrap();
        let schedules = engine
            .build_schedules(&create_config("300000", false), &create_slabs())
            .unwrap();

        let dates: Vec<NaiveDate> = schedules.per_slab[0]
            .installments
            .iter()
            .map(|i| i.due_date)
            .collect();
        assert_eq!(dates[3], NaiveDate::from_ymd_opt(2026, 7, 5).unwrap());
        assert_eq!(dates[6], NaiveDate::from_ymd_opt(2027, 1, 5).unwrap());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let result = FeeEngine::new(EngineSettings {
            max_installments: 0,
            ..EngineSettings::default()
        });
        assert!(matches!(
            result,
            Err(EngineError::SettingsParseError { .. })
        ));
    }

    #[test]
    fn test_preview_many_preserves_order_and_isolates_failures() {
        let requests = vec![
            ScheduleRequest {
                config: create_config("300000", false),
                slabs: create_slabs(),
            },
            ScheduleRequest {
                config: create_config("300000", false),
                slabs: vec![ScholarshipSlab::new("Broken", dec("150"), "")],
            },
            ScheduleRequest {
                config: create_config("120000", true),
                slabs: vec![],
            },
        ];

        let results = FeeEngine::default().preview_many(&requests);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(EngineError::SlabError { .. })));
        assert_eq!(
            results[2].as_ref().unwrap().config.base_fee(),
            dec("120000")
        );
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FeeEngine>();
        assert_send_sync::<FeeSchedules>();
    }
}
