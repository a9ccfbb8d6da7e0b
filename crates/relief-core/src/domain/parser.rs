//! Domain TOML parser with validation.
//!
//! Parses a domain file into a [`Domain`] and validates:
//! - Every fact entry sets exactly one of `value` or `when`.
//! - Preconditions and goal facts are literal booleans.
//! - Action names are unique across init, operators and goals.
//! - Threshold cutoffs and default parameters lie in `[0, 1]`.

use super::error::DomainError;
use super::fact::{Effect, Fact, FactValue};
use super::toml_format::{DomainToml, FactToml};
use super::{Action, Domain};

/// Parse and validate a domain TOML string.
pub fn parse_domain_toml(content: &str) -> Result<Domain, DomainError> {
    let raw: DomainToml = toml::from_str(content)?;
    domain_from_toml(raw)
}

/// Convert an already-deserialized [`DomainToml`] into a validated domain.
pub fn domain_from_toml(raw: DomainToml) -> Result<Domain, DomainError> {
    let mut init = Action::init(&raw.init.name);
    for entry in &raw.init.effects {
        init = init.effect(effect_from(&raw.init.name, entry)?);
    }

    let mut builder = Domain::builder(raw.domain.name).init(init);

    for entry in &raw.actions {
        let mut action = Action::operator(&entry.name);
        if let Some(team) = &entry.team {
            action = action.team(team);
        }
        for pre in &entry.preconditions {
            action.preconditions.push(precondition_from(&entry.name, pre)?);
        }
        for eff in &entry.effects {
            action = action.effect(effect_from(&entry.name, eff)?);
        }
        builder = builder.operator(action);
    }

    for entry in &raw.goals {
        let mut goal = Action::goal(&entry.name);
        if let Some(team) = &entry.team {
            goal = goal.team(team);
        }
        for eff in &entry.effects {
            let fact = literal_fact(&entry.name, eff).map_err(|err| match err {
                DomainError::ThresholdInPrecondition { action, fact } => {
                    DomainError::ThresholdInGoal { goal: action, fact }
                }
                other => other,
            })?;
            goal = goal.desire(fact.name, fact.value);
        }
        builder = builder.goal(goal);
    }

    builder.parameters(raw.parameters).build()
}

/// Convert an effect entry; exactly one of `value` / `when` must be set.
fn effect_from(action: &str, entry: &FactToml) -> Result<Effect, DomainError> {
    let value = match (entry.value, entry.when) {
        (Some(b), None) => FactValue::Literal(b),
        (None, Some(threshold)) => FactValue::Threshold(threshold),
        (Some(_), Some(_)) => {
            return Err(DomainError::AmbiguousValue {
                action: action.to_owned(),
                fact: entry.fact.clone(),
            });
        }
        (None, None) => {
            return Err(DomainError::MissingValue {
                action: action.to_owned(),
                fact: entry.fact.clone(),
            });
        }
    };
    Ok(Effect {
        name: entry.fact.clone(),
        value,
    })
}

/// Convert a precondition entry; thresholds are not allowed.
fn precondition_from(action: &str, entry: &FactToml) -> Result<Fact, DomainError> {
    literal_fact(action, entry)
}

fn literal_fact(action: &str, entry: &FactToml) -> Result<Fact, DomainError> {
    match effect_from(action, entry)?.value {
        FactValue::Literal(value) => Ok(Fact::new(entry.fact.clone(), value)),
        FactValue::Threshold(_) => Err(DomainError::ThresholdInPrecondition {
            action: action.to_owned(),
            fact: entry.fact.clone(),
        }),
    }
}
