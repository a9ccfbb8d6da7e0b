//! Partial-order plan state.
//!
//! A [`Plan`] is a plain value: branching clones it, so sibling branches
//! never share ordering, causal-link or queue state.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{ActionId, Domain, Fact};

use super::ordering::OrderingConstraints;

/// Record that `provider`'s effect is relied on to satisfy `consumer`'s
/// precondition `fact`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CausalLink {
    pub provider: ActionId,
    pub fact: Fact,
    pub consumer: ActionId,
}

impl fmt::Display for CausalLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --[{}]--> {}", self.provider, self.fact, self.consumer)
    }
}

/// A precondition of `consumer` not yet linked to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpenPrecondition {
    pub consumer: ActionId,
    pub fact: Fact,
}

/// One node of the plan-space search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub(crate) goals: Vec<ActionId>,
    pub(crate) actions: BTreeSet<ActionId>,
    pub(crate) ordering: OrderingConstraints,
    pub(crate) causal_links: Vec<CausalLink>,
    pub(crate) open: VecDeque<OpenPrecondition>,
}

impl Plan {
    /// The minimal plan for `goals`: init plus the goals, each goal ordered
    /// after init, and every desired fact queued as an open precondition in
    /// goal order then fact order.
    pub fn minimal(domain: &Domain, goals: &[ActionId]) -> Self {
        let mut actions = BTreeSet::new();
        actions.insert(ActionId::INIT);
        let mut ordering = OrderingConstraints::default();
        let mut open = VecDeque::new();

        for &goal in goals {
            actions.insert(goal);
            ordering.insert(ActionId::INIT, goal);
            for fact in domain.action(goal).desired_facts() {
                open.push_back(OpenPrecondition {
                    consumer: goal,
                    fact,
                });
            }
        }

        Self {
            goals: goals.to_vec(),
            actions,
            ordering,
            causal_links: Vec::new(),
            open,
        }
    }

    /// Pop the oldest open precondition (FIFO).
    pub fn select_subgoal(&mut self) -> Option<OpenPrecondition> {
        self.open.pop_front()
    }

    /// Add a catalog action: order it after init and queue its preconditions.
    pub(crate) fn introduce(&mut self, domain: &Domain, action: ActionId) {
        if !self.actions.insert(action) {
            return;
        }
        self.ordering.insert(ActionId::INIT, action);
        for fact in &domain.action(action).preconditions {
            self.open.push_back(OpenPrecondition {
                consumer: action,
                fact: fact.clone(),
            });
        }
    }

    /// Record `provider --fact--> consumer` and order provider first.
    pub(crate) fn link(&mut self, provider: ActionId, fact: Fact, consumer: ActionId) {
        self.ordering.insert(provider, consumer);
        self.causal_links.push(CausalLink {
            provider,
            fact,
            consumer,
        });
    }

    /// Goals this plan was built for, in request order.
    pub fn goals(&self) -> &[ActionId] {
        &self.goals
    }

    pub fn actions(&self) -> &BTreeSet<ActionId> {
        &self.actions
    }

    pub fn contains(&self, action: ActionId) -> bool {
        self.actions.contains(&action)
    }

    pub fn ordering(&self) -> &OrderingConstraints {
        &self.ordering
    }

    pub fn causal_links(&self) -> &[CausalLink] {
        &self.causal_links
    }

    pub fn open_preconditions(&self) -> impl ExactSizeIterator<Item = &OpenPrecondition> {
        self.open.iter()
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Action;

    fn two_goal_domain() -> Domain {
        Domain::builder("two-goal")
            .init(Action::init("start").sets("fuel", true))
            .operator(
                Action::operator("cook")
                    .requires("fuel", true)
                    .requires("pan", true)
                    .sets("meal", true),
            )
            .goal(Action::goal("dinner").desire("meal", true))
            .goal(Action::goal("tidy").desire("dishes_clean", true).desire("floor_clean", true))
            .build()
            .unwrap()
    }

    #[test]
    fn minimal_plan_orders_goals_after_init() {
        let domain = two_goal_domain();
        let goals = domain.all_goals();
        let plan = Plan::minimal(&domain, &goals);

        assert_eq!(plan.actions().len(), 3);
        assert!(plan.contains(ActionId::INIT));
        for &g in &goals {
            assert!(plan.ordering().contains(ActionId::INIT, g));
        }
        assert!(plan.causal_links().is_empty());
    }

    #[test]
    fn minimal_plan_queues_facts_in_goal_then_fact_order() {
        let domain = two_goal_domain();
        let tidy = domain.lookup("tidy").unwrap();
        let dinner = domain.lookup("dinner").unwrap();
        // Request order, not declaration order, decides the queue.
        let plan = Plan::minimal(&domain, &[tidy, dinner]);

        let queued: Vec<(ActionId, &str)> = plan
            .open_preconditions()
            .map(|o| (o.consumer, o.fact.name.as_str()))
            .collect();
        assert_eq!(
            queued,
            vec![(tidy, "dishes_clean"), (tidy, "floor_clean"), (dinner, "meal")]
        );
    }

    #[test]
    fn select_subgoal_is_fifo() {
        let domain = two_goal_domain();
        let mut plan = Plan::minimal(&domain, &domain.all_goals());
        assert_eq!(plan.select_subgoal().unwrap().fact.name, "meal");
        assert_eq!(plan.select_subgoal().unwrap().fact.name, "dishes_clean");
        assert_eq!(plan.select_subgoal().unwrap().fact.name, "floor_clean");
        assert!(plan.select_subgoal().is_none());
    }

    #[test]
    fn introduce_queues_preconditions_once() {
        let domain = two_goal_domain();
        let cook = domain.lookup("cook").unwrap();
        let mut plan = Plan::minimal(&domain, &domain.all_goals());
        let before = plan.open_count();

        plan.introduce(&domain, cook);
        plan.introduce(&domain, cook);

        assert_eq!(plan.open_count(), before + 2);
        assert!(plan.ordering().contains(ActionId::INIT, cook));
    }

    #[test]
    fn clones_do_not_alias() {
        let domain = two_goal_domain();
        let cook = domain.lookup("cook").unwrap();
        let dinner = domain.lookup("dinner").unwrap();
        let parent = Plan::minimal(&domain, &domain.all_goals());

        let mut child = parent.clone();
        child.introduce(&domain, cook);
        child.link(cook, Fact::new("meal", true), dinner);

        assert!(!parent.contains(cook));
        assert!(parent.causal_links().is_empty());
        assert!(!parent.ordering().contains(cook, dinner));
        assert_ne!(parent.open_count(), child.open_count());
    }
}
