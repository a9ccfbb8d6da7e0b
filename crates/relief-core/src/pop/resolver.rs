//! Provider resolution: who can establish an open precondition, and the
//! child plans that result from committing to each candidate.

use crate::domain::{ActionId, ActionKind, Domain, Fact, Parameters};

use super::plan::{OpenPrecondition, Plan};

/// Where a provider candidate comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderSource {
    /// The starting world.
    Init,
    /// An action already in the plan.
    Reused,
    /// A catalog action added by this branch.
    Introduced,
}

/// A candidate provider for an open precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    pub action: ActionId,
    pub source: ProviderSource,
}

/// A child plan produced by committing to one provider.
#[derive(Debug, Clone)]
pub struct Branch {
    pub provider: Provider,
    pub plan: Plan,
}

/// Enumerate providers for `fact` needed by `consumer`, in fixed precedence:
/// init first, then actions already in the plan, then catalog actions not
/// yet in the plan. Each group follows declaration order.
///
/// Goal pseudo-actions never provide, and `consumer` never provides its own
/// precondition.
pub fn find_providers(
    domain: &Domain,
    params: &Parameters,
    plan: &Plan,
    consumer: ActionId,
    fact: &Fact,
) -> Vec<Provider> {
    let mut providers = Vec::new();

    if domain.init().establishes(fact, params) {
        providers.push(Provider {
            action: ActionId::INIT,
            source: ProviderSource::Init,
        });
    }

    let can_provide = |id: ActionId| {
        id != consumer
            && domain.action(id).kind == ActionKind::Operator
            && domain.action(id).establishes(fact, params)
    };

    providers.extend(
        plan.actions()
            .iter()
            .copied()
            .filter(|&id| can_provide(id))
            .map(|action| Provider {
                action,
                source: ProviderSource::Reused,
            }),
    );

    providers.extend(
        domain
            .operators()
            .map(|(id, _)| id)
            .filter(|&id| !plan.contains(id) && can_provide(id))
            .map(|action| Provider {
                action,
                source: ProviderSource::Introduced,
            }),
    );

    providers
}

/// Branch `plan` once per provider of `open`.
///
/// Each child gets the causal link and the provider-before-consumer edge;
/// introduced providers are also ordered after init and their preconditions
/// queued. No providers means no children: the branch is a dead end.
pub fn choose_operator(
    domain: &Domain,
    params: &Parameters,
    plan: &Plan,
    open: &OpenPrecondition,
) -> Vec<Branch> {
    find_providers(domain, params, plan, open.consumer, &open.fact)
        .into_iter()
        .map(|provider| {
            let mut child = plan.clone();
            if provider.source == ProviderSource::Introduced {
                child.introduce(domain, provider.action);
            }
            child.link(provider.action, open.fact.clone(), open.consumer);
            Branch {
                provider,
                plan: child,
            }
        })
        .collect()
}
