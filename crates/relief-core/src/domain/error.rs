use thiserror::Error;

use super::fact::Parameter;

/// Errors raised while building or loading a domain, or while resolving a
/// goal request against it. All of them are fatal and surface before any
/// search starts.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("domain has no init action")]
    MissingInit,

    #[error("domain must declare at least one goal")]
    NoGoals,

    #[error("action name must not be empty")]
    EmptyName,

    #[error("duplicate action name: {0:?}")]
    DuplicateAction(String),

    #[error("unknown action {0:?}")]
    UnknownAction(String),

    #[error("{0:?} is not a goal")]
    NotAGoal(String),

    #[error("no goals requested")]
    NoGoalsRequested,

    #[error("goal {0:?} requested more than once")]
    DuplicateGoalRequest(String),

    #[error("init action {0:?} must not have preconditions")]
    InitPreconditions(String),

    #[error("goal {0:?} must not have preconditions")]
    GoalPreconditions(String),

    #[error("goal {0:?} declares no desired facts")]
    EmptyGoal(String),

    #[error("goal {goal:?}: desired fact {fact:?} must be a literal boolean")]
    ThresholdInGoal { goal: String, fact: String },

    #[error("action {action:?}: precondition {fact:?} must be a literal boolean")]
    ThresholdInPrecondition { action: String, fact: String },

    #[error("action {action:?}: fact {fact:?} sets both `value` and `when`")]
    AmbiguousValue { action: String, fact: String },

    #[error("action {action:?}: fact {fact:?} sets neither `value` nor `when`")]
    MissingValue { action: String, fact: String },

    #[error("action {action:?}: fact name must not be empty")]
    EmptyFactName { action: String },

    #[error("action {action:?}: threshold cutoff {cutoff} on {fact:?} is outside [0, 1]")]
    InvalidCutoff {
        action: String,
        fact: String,
        cutoff: f64,
    },

    #[error("parameter {parameter} = {value} is outside [0, 1]")]
    ParameterOutOfRange { parameter: Parameter, value: f64 },
}
