//! Partial-order planning for disaster-response action plans.
//!
//! - [`domain`]: the immutable action catalog and its TOML format.
//! - [`pop`]: the planner itself.
//! - [`advisory`]: seams for the probability, routing, policy and narrative
//!   collaborators that sit around the planner.

pub mod advisory;
pub mod domain;
pub mod pop;
