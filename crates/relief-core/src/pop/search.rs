//! Depth-first plan-space search.
//!
//! The driver keeps a LIFO stack of partial plans. Each popped plan costs one
//! node from the [`NodeBudget`]; it is either a solution, a dead end, or the
//! parent of one child per provider of its oldest open precondition. Children
//! whose threats cannot be ordered away are dropped before being pushed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{ActionId, Domain, DomainError, Fact, Parameters};

use super::plan::Plan;
use super::resolver::{ProviderSource, choose_operator};
use super::threat::resolve_threats;
use super::validate::{is_solution, stale_link};

/// Node budget used when nothing else is configured.
pub const DEFAULT_MAX_NODES: usize = 20_000;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Search configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of plans popped from the stack. Must be positive.
    pub max_nodes: usize,
    /// Record a [`TraceEvent`] list in the report.
    pub debug_trace: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            debug_trace: false,
        }
    }
}

impl SearchConfig {
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_debug_trace(mut self, debug_trace: bool) -> Self {
        self.debug_trace = debug_trace;
        self
    }
}

/// Node counter shared by one or more searches.
///
/// Passing the same budget to several [`Planner::solve_with_budget`] calls
/// caps their combined work; a caller can also stop a search early by
/// handing it an already spent budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeBudget {
    max: usize,
    used: usize,
}

impl NodeBudget {
    pub fn new(max: usize) -> Self {
        Self { max, used: 0 }
    }

    pub fn is_spent(&self) -> bool {
        self.used >= self.max
    }

    pub fn charge(&mut self) {
        self.used += 1;
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn remaining(&self) -> usize {
        self.max.saturating_sub(self.used)
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Terminal state of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Solved,
    Exhausted,
    BudgetExceeded,
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Solved => "solved",
            Self::Exhausted => "exhausted",
            Self::BudgetExceeded => "budget_exceeded",
        };
        f.write_str(s)
    }
}

impl FromStr for SearchStatus {
    type Err = SearchStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solved" => Ok(Self::Solved),
            "exhausted" => Ok(Self::Exhausted),
            "budget_exceeded" => Ok(Self::BudgetExceeded),
            other => Err(SearchStatusParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`SearchStatus`] string.
#[derive(Debug, Clone)]
pub struct SearchStatusParseError(pub String);

impl fmt::Display for SearchStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid search status: {:?}", self.0)
    }
}

impl std::error::Error for SearchStatusParseError {}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Counters collected during a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Plans popped from the stack.
    pub nodes: usize,
    /// Children pushed after threat resolution.
    pub branches: usize,
    /// Plans whose open precondition had no provider.
    pub dead_ends: usize,
    /// Children dropped by an unresolvable threat.
    pub threat_rejections: usize,
    /// Children dropped because a new causal-link edge closed a cycle.
    pub cycle_drops: usize,
    /// Non-solutions with nothing left to resolve.
    pub stale_drops: usize,
    pub max_stack_depth: usize,
}

/// One step of the explored-node sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    Visit {
        node: usize,
        actions: usize,
        links: usize,
        open: usize,
    },
    Subgoal {
        consumer: String,
        fact: Fact,
    },
    NoProvider {
        consumer: String,
        fact: Fact,
    },
    Rejected {
        provider: String,
        threat: String,
        link: String,
    },
    Pushed {
        provider: String,
        introduced: bool,
    },
    Cycle {
        provider: String,
        consumer: String,
    },
    Stale {
        link: String,
    },
    Solved {
        node: usize,
    },
}

/// A solved plan and one linearization of it.
#[derive(Debug, Clone)]
pub struct Solution {
    pub plan: Plan,
    pub linearization: Vec<ActionId>,
}

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Solved(Solution),
    Exhausted,
    BudgetExceeded,
}

/// Result of one search: outcome, counters and (optionally) the trace.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
    pub trace: Vec<TraceEvent>,
}

impl SearchReport {
    pub fn status(&self) -> SearchStatus {
        match self.outcome {
            SearchOutcome::Solved(_) => SearchStatus::Solved,
            SearchOutcome::Exhausted => SearchStatus::Exhausted,
            SearchOutcome::BudgetExceeded => SearchStatus::BudgetExceeded,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Solved(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match &self.outcome {
            SearchOutcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

/// Errors raised before a search starts.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("max_nodes must be greater than zero")]
    ZeroNodeBudget,
}

/// Partial-order planner over one domain and one parameter bundle.
#[derive(Debug, Clone)]
pub struct Planner<'d> {
    domain: &'d Domain,
    params: Parameters,
    config: SearchConfig,
}

impl<'d> Planner<'d> {
    /// Create a planner. Parameters are used as given; merge domain defaults
    /// with [`Parameters::or`] beforehand if wanted.
    pub fn new(domain: &'d Domain, params: Parameters, config: SearchConfig) -> Result<Self, PlanError> {
        if let Some((parameter, value)) = params.out_of_range() {
            return Err(DomainError::ParameterOutOfRange { parameter, value }.into());
        }
        if config.max_nodes == 0 {
            return Err(PlanError::ZeroNodeBudget);
        }
        Ok(Self {
            domain,
            params,
            config,
        })
    }

    pub fn domain(&self) -> &'d Domain {
        self.domain
    }

    pub fn parameters(&self) -> Parameters {
        self.params
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    /// Plan for the named goals with a fresh budget of `max_nodes`.
    pub fn solve<S: AsRef<str>>(&self, goals: &[S]) -> Result<SearchReport, PlanError> {
        let mut budget = NodeBudget::new(self.config.max_nodes);
        self.solve_with_budget(goals, &mut budget)
    }

    /// Plan for the named goals, charging nodes to `budget`.
    pub fn solve_with_budget<S: AsRef<str>>(
        &self,
        goals: &[S],
        budget: &mut NodeBudget,
    ) -> Result<SearchReport, PlanError> {
        let goals = self.domain.resolve_goals(goals)?;
        Ok(self.solve_ids(&goals, budget))
    }

    /// Run the search for already resolved goal ids.
    pub fn solve_ids(&self, goals: &[ActionId], budget: &mut NodeBudget) -> SearchReport {
        let domain = self.domain;
        let params = &self.params;
        let mut stats = SearchStats::default();
        let mut trace = Vec::new();
        let mut record = |event: TraceEvent| {
            if self.config.debug_trace {
                trace.push(event);
            }
        };

        let mut stack = vec![Plan::minimal(domain, goals)];
        stats.max_stack_depth = 1;

        let outcome = loop {
            if stack.is_empty() {
                break SearchOutcome::Exhausted;
            }
            if budget.is_spent() {
                break SearchOutcome::BudgetExceeded;
            }
            let Some(mut plan) = stack.pop() else {
                break SearchOutcome::Exhausted;
            };
            budget.charge();
            stats.nodes += 1;
            let node = stats.nodes;

            debug!(
                node,
                actions = plan.actions().len(),
                links = plan.causal_links().len(),
                open = plan.open_count(),
                stack = stack.len(),
                "expanding plan"
            );
            record(TraceEvent::Visit {
                node,
                actions: plan.actions().len(),
                links: plan.causal_links().len(),
                open: plan.open_count(),
            });

            if is_solution(domain, params, &plan) {
                record(TraceEvent::Solved { node });
                let linearization = plan.ordering().linearize(plan.actions());
                break SearchOutcome::Solved(Solution {
                    plan,
                    linearization,
                });
            }

            let Some(open) = plan.select_subgoal() else {
                // Nothing left to resolve, yet not a solution. Pushed plans
                // are acyclic, so a causal link went stale.
                match stale_link(domain, params, &plan) {
                    Some(link) => {
                        stats.stale_drops += 1;
                        let link = link_label(domain, link);
                        debug!(node, link = %link, "dropping plan with stale causal link");
                        record(TraceEvent::Stale { link });
                    }
                    None => {
                        stats.cycle_drops += 1;
                        warn!(node, "dropping cyclic plan that reached the stack");
                    }
                }
                continue;
            };

            let consumer = domain.name_of(open.consumer);
            debug!(node, consumer, fact = %open.fact, "selected subgoal");
            record(TraceEvent::Subgoal {
                consumer: consumer.to_owned(),
                fact: open.fact.clone(),
            });

            let branches = choose_operator(domain, params, &plan, &open);
            if branches.is_empty() {
                stats.dead_ends += 1;
                debug!(node, consumer, fact = %open.fact, "no provider");
                record(TraceEvent::NoProvider {
                    consumer: consumer.to_owned(),
                    fact: open.fact.clone(),
                });
                continue;
            }

            for branch in branches {
                let provider = domain.name_of(branch.provider.action);
                let mut child = branch.plan;
                match resolve_threats(domain, params, &mut child) {
                    // Linking a reused provider can close a cycle that no
                    // threat check looks at.
                    Ok(_) if child.ordering().has_cycle() => {
                        stats.cycle_drops += 1;
                        debug!(node, provider, consumer, "provider ordering closes a cycle");
                        record(TraceEvent::Cycle {
                            provider: provider.to_owned(),
                            consumer: consumer.to_owned(),
                        });
                    }
                    Ok(_) => {
                        stats.branches += 1;
                        record(TraceEvent::Pushed {
                            provider: provider.to_owned(),
                            introduced: branch.provider.source == ProviderSource::Introduced,
                        });
                        stack.push(child);
                    }
                    Err(threat) => {
                        stats.threat_rejections += 1;
                        let threat_name = domain.name_of(threat.action);
                        let link = link_label(domain, &threat.link);
                        debug!(node, provider, threat = threat_name, link = %link, "unresolvable threat");
                        record(TraceEvent::Rejected {
                            provider: provider.to_owned(),
                            threat: threat_name.to_owned(),
                            link,
                        });
                    }
                }
            }
            stats.max_stack_depth = stats.max_stack_depth.max(stack.len());
        };

        let status = match &outcome {
            SearchOutcome::Solved(_) => SearchStatus::Solved,
            SearchOutcome::Exhausted => SearchStatus::Exhausted,
            SearchOutcome::BudgetExceeded => SearchStatus::BudgetExceeded,
        };
        info!(
            domain = domain.name(),
            status = %status,
            nodes = stats.nodes,
            budget_used = budget.used(),
            budget_max = budget.max(),
            "search finished"
        );

        SearchReport {
            outcome,
            stats,
            trace,
        }
    }
}

/// `provider --[fact]--> consumer` with action names.
pub(crate) fn link_label(domain: &Domain, link: &super::plan::CausalLink) -> String {
    format!(
        "{} --[{}]--> {}",
        domain.name_of(link.provider),
        link.fact,
        domain.name_of(link.consumer)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Action;

    fn chain_domain() -> Domain {
        Domain::builder("chain")
            .init(Action::init("start").sets("raw", true))
            .operator(Action::operator("prepare").requires("raw", true).sets("ready", true))
            .operator(Action::operator("deliver").requires("ready", true).sets("delivered", true))
            .goal(Action::goal("done").desire("delivered", true))
            .build()
            .unwrap()
    }

    #[test]
    fn solves_a_two_step_chain() {
        let domain = chain_domain();
        let planner = Planner::new(&domain, Parameters::default(), SearchConfig::default()).unwrap();
        let report = planner.solve(&["done"]).unwrap();

        assert_eq!(report.status(), SearchStatus::Solved);
        let solution = report.solution().unwrap();
        let names: Vec<&str> = solution.linearization.iter().map(|&id| domain.name_of(id)).collect();
        assert_eq!(names, vec!["start", "prepare", "deliver", "done"]);
        assert_eq!(solution.plan.causal_links().len(), 3);
    }

    #[test]
    fn budget_of_one_stops_before_second_expansion() {
        let domain = chain_domain();
        let config = SearchConfig::default().with_max_nodes(1);
        let planner = Planner::new(&domain, Parameters::default(), config).unwrap();
        let report = planner.solve(&["done"]).unwrap();

        assert_eq!(report.status(), SearchStatus::BudgetExceeded);
        assert_eq!(report.stats.nodes, 1);
        assert!(report.solution().is_none());
    }

    #[test]
    fn missing_provider_exhausts() {
        let domain = Domain::builder("levee")
            .init(Action::init("start").sets("sandbags", true))
            .goal(Action::goal("levee_work_done").desire("levee_reinforced", true))
            .build()
            .unwrap();
        let planner = Planner::new(&domain, Parameters::default(), SearchConfig::default()).unwrap();
        let report = planner.solve(&["levee_work_done"]).unwrap();

        assert_eq!(report.status(), SearchStatus::Exhausted);
        assert_eq!(report.stats.nodes, 1);
        assert_eq!(report.stats.dead_ends, 1);
    }

    /// `x` needs `b` and gives `c`; `y` needs `c` and gives `b`. Reusing `x`
    /// for `y`'s `c` orders `x` both before and after `y`.
    fn loop_domain() -> Domain {
        let mut y = Action::operator("y").requires("c", true);
        let mut init = Action::init("start");
        for i in 0..5 {
            y = y.requires(format!("f{i}"), true);
            init = init.sets(format!("f{i}"), true);
        }
        Domain::builder("loop")
            .init(init)
            .operator(Action::operator("x").requires("b", true).sets("c", true))
            .operator(y.sets("b", true))
            .goal(Action::goal("g").desire("c", true))
            .build()
            .unwrap()
    }

    #[test]
    fn cyclic_child_is_dropped_as_dead_end() {
        let domain = loop_domain();
        let config = SearchConfig::default().with_debug_trace(true);
        let planner = Planner::new(&domain, Parameters::default(), config).unwrap();
        let report = planner.solve(&["g"]).unwrap();

        assert_eq!(report.status(), SearchStatus::Exhausted);
        assert_eq!(report.stats.nodes, 3);
        assert_eq!(report.stats.cycle_drops, 1);
        assert_eq!(report.stats.stale_drops, 0);
        assert!(report.trace.contains(&TraceEvent::Cycle {
            provider: "x".to_owned(),
            consumer: "y".to_owned(),
        }));
        assert!(!report.trace.iter().any(|e| matches!(e, TraceEvent::Stale { .. })));
    }

    #[test]
    fn cyclic_child_does_not_spend_the_budget() {
        let domain = loop_domain();
        let config = SearchConfig::default().with_max_nodes(5);
        let planner = Planner::new(&domain, Parameters::default(), config).unwrap();
        let report = planner.solve(&["g"]).unwrap();

        assert_eq!(report.status(), SearchStatus::Exhausted);
        assert_eq!(report.stats.nodes, 3);
    }

    #[test]
    fn trace_is_recorded_only_when_asked() {
        let domain = chain_domain();
        let quiet = Planner::new(&domain, Parameters::default(), SearchConfig::default()).unwrap();
        assert!(quiet.solve(&["done"]).unwrap().trace.is_empty());

        let config = SearchConfig::default().with_debug_trace(true);
        let loud = Planner::new(&domain, Parameters::default(), config).unwrap();
        let report = loud.solve(&["done"]).unwrap();
        let visits = report
            .trace
            .iter()
            .filter(|e| matches!(e, TraceEvent::Visit { .. }))
            .count();
        assert_eq!(visits, report.stats.nodes);
        assert!(matches!(report.trace.last(), Some(TraceEvent::Solved { .. })));
    }

    #[test]
    fn rejects_zero_budget_and_out_of_range_parameters() {
        let domain = chain_domain();
        let err = Planner::new(&domain, Parameters::default(), SearchConfig::default().with_max_nodes(0))
            .unwrap_err();
        assert!(matches!(err, PlanError::ZeroNodeBudget), "expected ZeroNodeBudget, got: {err}");

        let err = Planner::new(&domain, Parameters::new(1.5, 0.2), SearchConfig::default()).unwrap_err();
        assert!(
            matches!(err, PlanError::Domain(DomainError::ParameterOutOfRange { .. })),
            "expected ParameterOutOfRange, got: {err}"
        );
    }

    #[test]
    fn unknown_goal_is_an_error() {
        let domain = chain_domain();
        let planner = Planner::new(&domain, Parameters::default(), SearchConfig::default()).unwrap();
        let err = planner.solve(&["nope"]).unwrap_err();
        assert!(
            matches!(err, PlanError::Domain(DomainError::NotAGoal(_) | DomainError::UnknownAction(_))),
            "expected goal lookup failure, got: {err}"
        );
    }

    #[test]
    fn spent_budget_stops_immediately() {
        let domain = chain_domain();
        let planner = Planner::new(&domain, Parameters::default(), SearchConfig::default()).unwrap();
        let mut budget = NodeBudget::new(3);
        let first = planner.solve_with_budget(&["done"], &mut budget).unwrap();
        assert_eq!(first.status(), SearchStatus::BudgetExceeded);
        assert!(budget.is_spent());
        assert_eq!(budget.remaining(), 0);

        let second = planner.solve_with_budget(&["done"], &mut budget).unwrap();
        assert_eq!(second.status(), SearchStatus::BudgetExceeded);
        assert_eq!(second.stats.nodes, 0);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [SearchStatus::Solved, SearchStatus::Exhausted, SearchStatus::BudgetExceeded] {
            assert_eq!(status.to_string().parse::<SearchStatus>().unwrap(), status);
        }
        assert!("finished".parse::<SearchStatus>().is_err());
    }
}
