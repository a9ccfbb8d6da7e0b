//! Solution checks.

use thiserror::Error;

use crate::domain::{Domain, Parameters};

use super::plan::{CausalLink, Plan};

/// First property a candidate plan fails, checked in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{0} open precondition(s) remain")]
    OpenPreconditions(usize),

    #[error("ordering constraints contain a cycle")]
    Cycle,

    #[error("causal link no longer holds: {0}")]
    StaleLink(CausalLink),
}

/// Check completeness, then acyclicity, then causal soundness.
pub fn validate(domain: &Domain, params: &Parameters, plan: &Plan) -> Result<(), Violation> {
    if plan.open_count() > 0 {
        return Err(Violation::OpenPreconditions(plan.open_count()));
    }
    if plan.ordering().has_cycle() {
        return Err(Violation::Cycle);
    }
    if let Some(link) = stale_link(domain, params, plan) {
        return Err(Violation::StaleLink(link.clone()));
    }
    Ok(())
}

pub fn is_solution(domain: &Domain, params: &Parameters, plan: &Plan) -> bool {
    validate(domain, params, plan).is_ok()
}

/// The first causal link whose provider no longer establishes its fact.
pub fn stale_link<'p>(domain: &Domain, params: &Parameters, plan: &'p Plan) -> Option<&'p CausalLink> {
    plan.causal_links()
        .iter()
        .find(|link| !domain.action(link.provider).establishes(&link.fact, params))
}
