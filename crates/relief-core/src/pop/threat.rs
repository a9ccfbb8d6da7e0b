//! Threat detection and resolution.
//!
//! An action threatens a causal link `P --f--> C` when it is neither `P` nor
//! `C`, one of its effects makes `f` false under the current parameters, and
//! it is not already ordered before `P` or after `C`. Resolution tries two
//! fixed edges: threat before provider, then consumer before threat. A
//! threat neither edge can absorb without a cycle dooms the plan.

use std::fmt;

use crate::domain::{ActionId, Domain, Parameters};

use super::plan::{CausalLink, Plan};

/// An action endangering a causal link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Threat {
    pub action: ActionId,
    pub link: CausalLink,
}

impl fmt::Display for Threat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} threatens {}", self.action, self.link)
    }
}

/// How a threat was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Threat ordered before the provider.
    Demoted,
    /// Threat ordered after the consumer.
    Promoted,
}

/// Whether `action` threatens `link` in `plan`.
pub fn threatens(
    domain: &Domain,
    params: &Parameters,
    plan: &Plan,
    action: ActionId,
    link: &CausalLink,
) -> bool {
    action != link.provider
        && action != link.consumer
        && domain.action(action).contradicts(&link.fact, params)
        && !plan.ordering.precedes(action, link.provider)
        && !plan.ordering.precedes(link.consumer, action)
}

/// Every current threat in `plan`, link order then action order.
pub fn find_threats(domain: &Domain, params: &Parameters, plan: &Plan) -> Vec<Threat> {
    let mut threats = Vec::new();
    for link in &plan.causal_links {
        for &action in &plan.actions {
            if threatens(domain, params, plan, action, link) {
                threats.push(Threat {
                    action,
                    link: link.clone(),
                });
            }
        }
    }
    threats
}

/// Resolve every threat in `plan` by adding ordering edges, scanning all
/// causal links in order.
///
/// Returns the resolved threats, or the first threat that could not be
/// resolved. On error the plan is left partially modified and must be
/// discarded.
pub fn resolve_threats(
    domain: &Domain,
    params: &Parameters,
    plan: &mut Plan,
) -> Result<Vec<(Threat, Resolution)>, Threat> {
    let mut resolved = Vec::new();

    for link in &plan.causal_links {
        for &action in &plan.actions {
            if action == link.provider
                || action == link.consumer
                || !domain.action(action).contradicts(&link.fact, params)
            {
                continue;
            }
            let ordering = &mut plan.ordering;
            if ordering.precedes(action, link.provider) || ordering.precedes(link.consumer, action) {
                continue;
            }

            let threat = Threat {
                action,
                link: link.clone(),
            };

            ordering.insert(action, link.provider);
            if !ordering.has_cycle() {
                resolved.push((threat, Resolution::Demoted));
                continue;
            }
            ordering.remove(action, link.provider);

            ordering.insert(link.consumer, action);
            if !ordering.has_cycle() {
                resolved.push((threat, Resolution::Promoted));
                continue;
            }
            ordering.remove(link.consumer, action);

            return Err(threat);
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, Fact};

    /// `drain` uses up the water `bathe` needs; `pump` needs the water too
    /// and produces pressure that `bathe` also needs.
    fn bath_domain() -> Domain {
        Domain::builder("bath")
            .init(Action::init("start").sets("water", true))
            .operator(Action::operator("drain").sets("water", false).sets("space", true))
            .operator(Action::operator("bathe").requires("water", true).sets("clean", true))
            .operator(Action::operator("pump").sets("pressure", true).sets("water", false))
            .goal(Action::goal("g").desire("clean", true))
            .build()
            .unwrap()
    }

    fn ids(domain: &Domain) -> (ActionId, ActionId, ActionId, ActionId) {
        (
            domain.lookup("drain").unwrap(),
            domain.lookup("bathe").unwrap(),
            domain.lookup("pump").unwrap(),
            domain.lookup("g").unwrap(),
        )
    }

    #[test]
    fn promotes_threat_after_consumer_when_demotion_cycles() {
        let domain = bath_domain();
        let params = Parameters::default();
        let (drain, bathe, _, goal) = ids(&domain);

        let mut plan = Plan::minimal(&domain, &[goal]);
        plan.introduce(&domain, bathe);
        plan.introduce(&domain, drain);
        plan.link(ActionId::INIT, Fact::new("water", true), bathe);

        assert_eq!(find_threats(&domain, &params, &plan).len(), 1);

        // drain before start would cycle, so drain goes after bathe.
        let resolved = resolve_threats(&domain, &params, &mut plan).expect("resolvable");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].0.action, drain);
        assert_eq!(resolved[0].1, Resolution::Promoted);
        assert!(plan.ordering().contains(bathe, drain));
        assert!(!plan.ordering().has_cycle());
        assert!(find_threats(&domain, &params, &plan).is_empty());
    }

    #[test]
    fn demotes_threat_before_provider_first() {
        let domain = Domain::builder("refill")
            .init(Action::init("start"))
            .operator(Action::operator("fill").sets("water", true))
            .operator(Action::operator("drain").sets("water", false))
            .operator(Action::operator("bathe").requires("water", true).sets("clean", true))
            .goal(Action::goal("g").desire("clean", true))
            .build()
            .unwrap();
        let params = Parameters::default();
        let fill = domain.lookup("fill").unwrap();
        let drain = domain.lookup("drain").unwrap();
        let bathe = domain.lookup("bathe").unwrap();
        let goal = domain.lookup("g").unwrap();

        let mut plan = Plan::minimal(&domain, &[goal]);
        plan.introduce(&domain, bathe);
        plan.introduce(&domain, fill);
        plan.introduce(&domain, drain);
        plan.link(fill, Fact::new("water", true), bathe);

        let resolved = resolve_threats(&domain, &params, &mut plan).unwrap();
        assert_eq!(resolved[0].1, Resolution::Demoted);
        assert!(plan.ordering().contains(drain, fill));
    }

    #[test]
    fn already_ordered_outside_is_not_a_threat() {
        let domain = bath_domain();
        let params = Parameters::default();
        let (drain, bathe, _, goal) = ids(&domain);

        let mut plan = Plan::minimal(&domain, &[goal]);
        plan.introduce(&domain, bathe);
        plan.introduce(&domain, drain);
        plan.link(ActionId::INIT, Fact::new("water", true), bathe);
        plan.ordering.insert(bathe, drain);

        assert!(find_threats(&domain, &params, &plan).is_empty());
        let edges = plan.ordering().len();
        assert!(resolve_threats(&domain, &params, &mut plan).unwrap().is_empty());
        assert_eq!(plan.ordering().len(), edges);
    }

    #[test]
    fn unresolvable_when_threat_sits_between_provider_and_consumer() {
        let domain = bath_domain();
        let params = Parameters::default();
        let (_, bathe, pump, goal) = ids(&domain);

        let mut plan = Plan::minimal(&domain, &[goal]);
        plan.introduce(&domain, bathe);
        plan.introduce(&domain, pump);
        plan.link(ActionId::INIT, Fact::new("water", true), bathe);
        // pump must run before bathe, but start precedes everything.
        plan.link(pump, Fact::new("pressure", true), bathe);

        let threat = resolve_threats(&domain, &params, &mut plan).unwrap_err();
        assert_eq!(threat.action, pump);
        assert_eq!(threat.link.provider, ActionId::INIT);
    }

    #[test]
    fn unbound_threshold_never_threatens() {
        use crate::domain::{Comparator, Effect, Parameter, Threshold};

        let domain = Domain::builder("storm")
            .init(Action::init("start").sets("roads_open", true))
            .operator(Action::operator("travel").requires("roads_open", true).sets("arrived", true))
            .operator(Action::operator("storm").effect(Effect::threshold(
                "roads_open",
                Threshold {
                    parameter: Parameter::FloodProbability,
                    comparator: Comparator::Below,
                    cutoff: 0.5,
                },
            )))
            .goal(Action::goal("g").desire("arrived", true))
            .build()
            .unwrap();
        let travel = domain.lookup("travel").unwrap();
        let storm = domain.lookup("storm").unwrap();
        let goal = domain.lookup("g").unwrap();

        let mut plan = Plan::minimal(&domain, &[goal]);
        plan.introduce(&domain, travel);
        plan.introduce(&domain, storm);
        plan.link(ActionId::INIT, Fact::new("roads_open", true), travel);

        assert!(find_threats(&domain, &Parameters::default(), &plan).is_empty());
        // Bound and high: storm closes the roads (value resolves to false).
        assert_eq!(find_threats(&domain, &Parameters::new(0.9, 0.0), &plan).len(), 1);
    }
}
