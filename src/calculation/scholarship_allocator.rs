//! Scholarship waiver allocation.
//!
//! This module applies a scholarship slab to the base installment template.
//! The slab's waiver is spread across installments in proportion to each
//! installment's base fee share, so every installment shrinks by roughly the
//! slab percentage. GST, when enabled, is computed once on the net total and
//! spread the same way.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, FeeConfig, Installment, ONE_SHOT_SCHEDULE, Schedule, ScheduleTotals,
    ScholarshipSlab,
};

use super::CurrencyMath;

/// The schedule for one slab and the audit steps recording its derivation.
#[derive(Debug, Clone)]
pub struct SlabAllocation {
    /// The complete schedule for the slab.
    pub schedule: Schedule,
    /// Waiver and GST steps, in that order.
    pub audit_steps: Vec<AuditStep>,
}

/// Checks a slab list before any schedule is built.
///
/// # Errors
///
/// `SlabError` for an empty name, the reserved name `"one-shot"`, a
/// percentage outside `[0, 100]`, or a name used by an earlier slab. Names are
/// compared after trimming whitespace.
///
/// # Examples
///
/// ```
/// use fee_schedule_engine::calculation::validate_slabs;
/// use fee_schedule_engine::models::ScholarshipSlab;
/// use rust_decimal::Decimal;
///
/// let slabs = vec![
///     ScholarshipSlab::new("Excellence", Decimal::from(20), "A"),
///     ScholarshipSlab::new("Excellence", Decimal::from(10), "B"),
/// ];
/// assert!(validate_slabs(&slabs).is_err());
/// ```
pub fn validate_slabs(slabs: &[ScholarshipSlab]) -> EngineResult<()> {
    let mut seen = HashSet::with_capacity(slabs.len());
    for slab in slabs {
        let name = slab.name.trim();
        if name.is_empty() {
            return Err(EngineError::slab(&slab.name, "name must not be empty"));
        }
        if name == ONE_SHOT_SCHEDULE {
            return Err(EngineError::slab(
                &slab.name,
                "name is reserved for the one-shot payment",
            ));
        }
        check_percentage(slab)?;
        if !seen.insert(name) {
            return Err(EngineError::slab(&slab.name, "duplicate slab name"));
        }
    }
    Ok(())
}

fn check_percentage(slab: &ScholarshipSlab) -> EngineResult<()> {
    if slab.percentage < Decimal::ZERO || slab.percentage > Decimal::ONE_HUNDRED {
        return Err(EngineError::slab(
            &slab.name,
            format!("percentage must be between 0 and 100, got {}", slab.percentage),
        ));
    }
    Ok(())
}

/// Applies one scholarship slab to the base template.
///
/// # Arguments
///
/// * `template` - The base installments (no waiver, no GST)
/// * `config` - The fee configuration the template was built from
/// * `slab` - The slab to apply
/// * `math` - Currency helpers at the configured scale
///
/// # Errors
///
/// `SlabError` when the percentage is outside `[0, 100]` or an installment
/// would end up with a negative payable amount.
pub fn allocate_scholarship(
    template: &[Installment],
    config: &FeeConfig,
    slab: &ScholarshipSlab,
    math: &CurrencyMath,
) -> EngineResult<SlabAllocation> {
    check_percentage(slab)?;

    let base_fee = config.base_fee();
    let shares: Vec<Decimal> = template.iter().map(|line| line.base_fee_share).collect();

    let scholarship_total = math.percentage_of(base_fee, slab.percentage)?;
    let waivers = math.split_pro_rata(scholarship_total, &shares)?;

    let nets: Vec<Decimal> = shares
        .iter()
        .zip(&waivers)
        .map(|(share, waiver)| share - waiver)
        .collect();
    if let Some((position, net)) = nets
        .iter()
        .enumerate()
        .find(|(_, net)| **net < Decimal::ZERO)
    {
        return Err(EngineError::slab(
            &slab.name,
            format!(
                "installment {} would have a negative payable amount {}",
                position + 1,
                net
            ),
        ));
    }

    let net_total: Decimal = nets.iter().sum();
    let gst_percent = config.effective_gst_percent();
    let gst_total = math.percentage_of(net_total, gst_percent)?;
    let gst_parts = math.split_pro_rata(gst_total, &nets)?;

    let installments = template
        .iter()
        .zip(nets.iter().zip(waivers.iter().zip(&gst_parts)))
        .map(|(line, (net, (waiver, gst)))| {
            let amount_payable = net.checked_add(*gst).ok_or_else(|| {
                EngineError::calculation(format!("{} plus GST {} overflows", net, gst))
            })?;
            Ok(Installment {
                scholarship_amount: *waiver,
                gst_amount: *gst,
                amount_payable,
                ..line.clone()
            })
        })
        .collect::<EngineResult<Vec<Installment>>>()?;

    let totals = ScheduleTotals::from_installments(base_fee, &installments)
        .ok_or_else(|| EngineError::calculation("schedule totals overflow"))?;

    let waiver_step = AuditStep {
        step_number: 0,
        rule_id: "scholarship_waiver".to_string(),
        rule_name: "Scholarship Waiver".to_string(),
        schedule: Some(slab.name.clone()),
        input: serde_json::json!({
            "base_fee": base_fee.to_string(),
            "percentage": slab.percentage.normalize().to_string(),
            "clearance": slab.clearance,
        }),
        output: serde_json::json!({
            "scholarship_total": scholarship_total.to_string(),
            "net_payable": net_total.to_string(),
        }),
        reasoning: format!(
            "{}% of {} = {} waived, spread across {} installments in proportion to their base share",
            slab.percentage.normalize(),
            base_fee,
            scholarship_total,
            installments.len()
        ),
    };

    let gst_step = if config.is_gst_included() {
        AuditStep {
            step_number: 0,
            rule_id: "gst_levy".to_string(),
            rule_name: "GST Levy".to_string(),
            schedule: Some(slab.name.clone()),
            input: serde_json::json!({
                "net_payable": net_total.to_string(),
                "gst_percent": gst_percent.normalize().to_string(),
            }),
            output: serde_json::json!({
                "gst_amount": gst_total.to_string(),
                "gst_applied": true,
            }),
            reasoning: format!(
                "{}% GST on {} = {}",
                gst_percent.normalize(),
                net_total,
                gst_total
            ),
        }
    } else {
        AuditStep {
            step_number: 0,
            rule_id: "gst_levy".to_string(),
            rule_name: "GST Levy".to_string(),
            schedule: Some(slab.name.clone()),
            input: serde_json::json!({
                "net_payable": net_total.to_string(),
            }),
            output: serde_json::json!({
                "gst_amount": "0",
                "gst_applied": false,
            }),
            reasoning: "No GST applied - GST is not included for this cohort".to_string(),
        }
    };

    Ok(SlabAllocation {
        schedule: Schedule {
            slab_name: slab.name.clone(),
            clearance: slab.clearance.clone(),
            scholarship_percentage: slab.percentage,
            installments,
            totals,
        },
        audit_steps: vec![waiver_step, gst_step],
    })
}
