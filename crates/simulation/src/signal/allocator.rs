//! Proportional green-time allocation for a two-phase junction.
//!
//! Steps, in order:
//! 1. Demand ratio `r = ns / (ns + ew)`, or 0.5 when both demands are zero,
//!    blended toward 0.5 by `1 - responsiveness`.
//! 2. Proportional split of the green budget (`cycle_length - fixed_overhead`).
//! 3. Clamp both phases to `[min_green, max_green]`.
//! 4. Hand any residual to a phase with headroom, unclamped phase first.
//! 5. Cap the change against the prior plan at `max_delta_per_tick`.
//! 6. Whatever neither phase can absorb becomes `deviation_secs`.

use crate::config::SignalParams;
use crate::error::PipelineError;

use super::delay::delay_reduction_pct;
use super::plan::SignalPlan;

/// Compute the next signal plan for the given phase demands.
///
/// `prior` is the plan from the previous tick, if any. It only affects the
/// rate limit; the proportional target is always computed from scratch.
pub fn allocate(
    ns_demand: f32,
    ew_demand: f32,
    prior: Option<&SignalPlan>,
    params: &SignalParams,
) -> Result<SignalPlan, PipelineError> {
    if params.min_green > params.max_green {
        return Err(PipelineError::InvalidConfig(format!(
            "min_green ({}) exceeds max_green ({})",
            params.min_green, params.max_green
        )));
    }
    if params.cycle_length <= params.fixed_overhead {
        return Err(PipelineError::InvalidConfig(format!(
            "cycle_length ({}) must exceed fixed_overhead ({})",
            params.cycle_length, params.fixed_overhead
        )));
    }
    if !valid_demand(ns_demand) || !valid_demand(ew_demand) {
        return Err(PipelineError::InvalidDemand {
            ns_demand,
            ew_demand,
        });
    }

    let budget = i64::from(params.green_budget());
    let bounds = (i64::from(params.min_green), i64::from(params.max_green));

    let ratio = demand_ratio(ns_demand, ew_demand);
    let responsiveness = params.responsiveness.clamp(0.0, 1.0);
    let blended = responsiveness * ratio + (1.0 - responsiveness) * 0.5;

    let target_ns = (budget as f32 * blended).round() as i64;
    let (mut ns, mut ew) = fit_to_bounds(target_ns, budget - target_ns, budget, bounds);

    let mut rate_limited = false;
    if let Some(prior) = prior {
        let delta = i64::from(params.max_delta_per_tick);
        let prior_ns = i64::from(prior.ns_green);
        let limited = ns.clamp(prior_ns - delta, prior_ns + delta);
        if limited != ns {
            rate_limited = true;
            (ns, ew) = fit_to_bounds(limited, budget - limited, budget, bounds);
        }
    }

    let deviation = budget - ns - ew;
    // Both phases are within [min_green, max_green], so they fit u32.
    let ns_green = ns as u32;
    let ew_green = ew as u32;
    // Only bounds near u32::MAX leave a deviation outside i32.
    let deviation_secs =
        i32::try_from(deviation).unwrap_or(if deviation < 0 { i32::MIN } else { i32::MAX });

    let estimated_delay_reduction_pct = delay_reduction_pct(
        ns_demand,
        ew_demand,
        ns_green,
        ew_green,
        params.green_budget(),
    );

    let reason = describe(
        ns_demand,
        ew_demand,
        ns_green,
        ew_green,
        rate_limited,
        deviation_secs,
    );

    Ok(SignalPlan {
        cycle_length: params.cycle_length,
        fixed_overhead: params.fixed_overhead,
        ns_green,
        ew_green,
        min_green: params.min_green,
        max_green: params.max_green,
        deviation_secs,
        demand_ratio: ratio,
        estimated_delay_reduction_pct,
        rate_limited,
        reason,
    })
}

fn valid_demand(demand: f32) -> bool {
    demand.is_finite() && demand >= 0.0
}

/// North-South share of total demand; 0.5 when there is none.
pub fn demand_ratio(ns_demand: f32, ew_demand: f32) -> f32 {
    let total = ns_demand + ew_demand;
    if total <= 0.0 {
        0.5
    } else {
        ns_demand / total
    }
}

/// Clamp a raw split into bounds and push the residual into whichever phase
/// still has room. Returns the split; any remaining residual is the deviation.
fn fit_to_bounds(raw_ns: i64, raw_ew: i64, budget: i64, (min, max): (i64, i64)) -> (i64, i64) {
    let mut ns = raw_ns.clamp(min, max);
    let mut ew = raw_ew.clamp(min, max);
    let mut residual = budget - ns - ew;
    if residual == 0 {
        return (ns, ew);
    }

    let ns_clamped = ns != raw_ns;
    let ew_clamped = ew != raw_ew;
    let phases: [&mut i64; 2] = if ns_clamped && !ew_clamped {
        [&mut ew, &mut ns]
    } else {
        [&mut ns, &mut ew]
    };
    for phase in phases {
        let adjusted = (*phase + residual).clamp(min, max);
        residual -= adjusted - *phase;
        *phase = adjusted;
        if residual == 0 {
            break;
        }
    }
    (ns, ew)
}

fn describe(
    ns_demand: f32,
    ew_demand: f32,
    ns_green: u32,
    ew_green: u32,
    rate_limited: bool,
    deviation_secs: i32,
) -> String {
    let mut reason = if ns_demand <= 0.0 && ew_demand <= 0.0 {
        format!("no demand, even split {ns_green}s/{ew_green}s")
    } else if ns_demand > ew_demand {
        format!(
            "NS demand {ns_demand:.1} exceeds EW {ew_demand:.1}, NS green {ns_green}s, EW green {ew_green}s"
        )
    } else if ew_demand > ns_demand {
        format!(
            "EW demand {ew_demand:.1} exceeds NS {ns_demand:.1}, NS green {ns_green}s, EW green {ew_green}s"
        )
    } else {
        format!("balanced demand {ns_demand:.1}, NS green {ns_green}s, EW green {ew_green}s")
    };
    if rate_limited {
        reason.push_str(", change rate-limited");
    }
    if deviation_secs != 0 {
        reason.push_str(&format!(", cycle deviation {deviation_secs:+}s"));
    }
    reason
}
