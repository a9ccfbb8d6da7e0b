//! Partial-order planning engine.
//!
//! [`Planner`] drives a depth-first search over partial plans. Each step
//! picks the oldest open precondition, branches once per provider, orders
//! away threats to existing causal links and pushes the survivors. The first
//! complete, acyclic, causally sound plan wins and is linearized.

pub mod ordering;
pub mod plan;
pub mod record;
pub mod resolver;
pub mod search;
pub mod threat;
pub mod validate;

pub use ordering::OrderingConstraints;
pub use plan::{CausalLink, OpenPrecondition, Plan};
pub use record::{PlanRecord, render_dot};
pub use resolver::{Branch, Provider, ProviderSource, choose_operator, find_providers};
pub use search::{
    DEFAULT_MAX_NODES, NodeBudget, PlanError, Planner, SearchConfig, SearchOutcome, SearchReport,
    SearchStats, SearchStatus, Solution, TraceEvent,
};
pub use threat::{Resolution, Threat, find_threats, resolve_threats};
pub use validate::{Violation, is_solution, validate};
