//! Collaborator seams around the planner.
//!
//! The planner itself only needs two scalar parameters and emits a plan.
//! Everything else in a disaster advisory comes from components this crate
//! does not implement: a probabilistic model estimating the parameters, a
//! router suggesting a safe path, a policy recommending one action, and a
//! narrator turning the assembled facts into prose.
//!
//! ```text
//! ParameterSource --estimate()--> Parameters --> Planner --> Solution
//!                                                               |
//! RouteAdvice, PolicyAdvice ------------------------------> Briefing
//!                                                               |
//!                                          Narrator::narrate(&Briefing)
//! ```

pub mod briefing;
pub mod traits;

pub use briefing::{Briefing, PolicyAdvice, RouteAdvice, TeamAssignment};
pub use traits::{AdvisoryError, Narrator, ParameterSource, PlainNarrator};
