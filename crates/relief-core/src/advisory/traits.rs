//! Interfaces for the advisory collaborators.

use thiserror::Error;

use crate::domain::Parameters;

use super::briefing::Briefing;

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("parameter source {source_name} failed: {message}")]
    Estimate { source_name: String, message: String },

    #[error("narrator {narrator} failed: {message}")]
    Narration { narrator: String, message: String },
}

/// Supplies point estimates for the planner's two scalar parameters.
///
/// A probabilistic model sits behind this in a full deployment; a fixed
/// [`Parameters`] value is itself a source.
pub trait ParameterSource {
    /// Human-readable name, used in diagnostics.
    fn name(&self) -> &str;

    fn estimate(&self) -> Result<Parameters, AdvisoryError>;
}

impl ParameterSource for Parameters {
    fn name(&self) -> &str {
        "fixed"
    }

    fn estimate(&self) -> Result<Parameters, AdvisoryError> {
        Ok(*self)
    }
}

/// Turns a [`Briefing`] into advisory text. Strictly downstream of the
/// planner: nothing a narrator returns feeds back into planning.
pub trait Narrator {
    fn name(&self) -> &str;

    fn narrate(&self, briefing: &Briefing) -> Result<String, AdvisoryError>;
}

/// Narrator that returns the briefing text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainNarrator;

impl Narrator for PlainNarrator {
    fn name(&self) -> &str {
        "plain"
    }

    fn narrate(&self, briefing: &Briefing) -> Result<String, AdvisoryError> {
        Ok(briefing.to_string())
    }
}

// Both seams must stay usable as trait objects.
const _: () = {
    fn _assert_object_safe(_: &dyn ParameterSource, _: &dyn Narrator) {}
};
