use crate::{problem::package::Package, solver::dispatch_params::DispatchParams};

/// Urgency of a package in minutes: time from the reference start to the
/// deadline, minus the priority weight per priority point. Lower is more
/// urgent.
pub fn priority_score(package: &Package, params: &DispatchParams) -> f64 {
    let deadline = package.deadline().resolve(params.end_of_day);
    let until_deadline = params.reference_start.duration_until(deadline);
    let bonus = params.priority_weight() * package.priority().weight() as i32;

    (until_deadline - bonus).as_secs_f64() / 60.0
}
