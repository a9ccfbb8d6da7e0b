//! Facts, effect values, and the scalar parameter bundle they resolve against.
//!
//! Desired facts (preconditions and goal facts) always carry a literal boolean.
//! Effects may instead carry a [`Threshold`] over one of the two environment
//! parameters, which is resolved lazily against a [`Parameters`] bundle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// One of the two global scalar parameters an effect may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    /// Point estimate that a flood occurs.
    FloodProbability,
    /// Point estimate that infrastructure (bridges, grid) fails.
    InfrastructureRisk,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FloodProbability => "flood_probability",
            Self::InfrastructureRisk => "infrastructure_risk",
        };
        f.write_str(s)
    }
}

impl FromStr for Parameter {
    type Err = ParameterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flood_probability" => Ok(Self::FloodProbability),
            "infrastructure_risk" => Ok(Self::InfrastructureRisk),
            other => Err(ParameterParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Parameter`] string.
#[derive(Debug, Clone)]
pub struct ParameterParseError(pub String);

impl fmt::Display for ParameterParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid parameter: {:?}", self.0)
    }
}

impl std::error::Error for ParameterParseError {}

/// The parameter bundle threshold effects are evaluated against.
///
/// A parameter left unbound makes every threshold over it resolve to
/// "unknown", which never establishes nor threatens a fact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flood_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_risk: Option<f64>,
}

impl Parameters {
    /// Bind both parameters.
    pub fn new(flood_probability: f64, infrastructure_risk: f64) -> Self {
        Self {
            flood_probability: Some(flood_probability),
            infrastructure_risk: Some(infrastructure_risk),
        }
    }

    /// Current value of `param`, if bound to a real number.
    pub fn get(&self, param: Parameter) -> Option<f64> {
        let value = match param {
            Parameter::FloodProbability => self.flood_probability,
            Parameter::InfrastructureRisk => self.infrastructure_risk,
        };
        value.filter(|v| !v.is_nan())
    }

    /// Fill any unbound parameter from `fallback`.
    pub fn or(self, fallback: Parameters) -> Self {
        Self {
            flood_probability: self.flood_probability.or(fallback.flood_probability),
            infrastructure_risk: self.infrastructure_risk.or(fallback.infrastructure_risk),
        }
    }

    /// Returns the first bound parameter that lies outside `[0, 1]`. NaN
    /// counts as unbound, not out of range.
    pub fn out_of_range(&self) -> Option<(Parameter, f64)> {
        [Parameter::FloodProbability, Parameter::InfrastructureRisk]
            .into_iter()
            .find_map(|param| match self.get(param) {
                Some(v) if !(0.0..=1.0).contains(&v) => Some((param, v)),
                _ => None,
            })
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Comparison applied between a parameter and a threshold cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = ">")]
    Above,
    #[serde(rename = "<=")]
    AtMost,
    #[serde(rename = "<")]
    Below,
}

impl Comparator {
    fn apply(self, value: f64, cutoff: f64) -> bool {
        match self {
            Self::AtLeast => value >= cutoff,
            Self::Above => value > cutoff,
            Self::AtMost => value <= cutoff,
            Self::Below => value < cutoff,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AtLeast => ">=",
            Self::Above => ">",
            Self::AtMost => "<=",
            Self::Below => "<",
        };
        f.write_str(s)
    }
}

/// A predicate over one scalar parameter, e.g. `flood_probability >= 0.5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub parameter: Parameter,
    #[serde(rename = "op")]
    pub comparator: Comparator,
    pub cutoff: f64,
}

impl Threshold {
    /// Evaluate against `params`; `None` when the parameter is unbound.
    pub fn evaluate(&self, params: &Parameters) -> Option<bool> {
        params
            .get(self.parameter)
            .map(|value| self.comparator.apply(value, self.cutoff))
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.parameter, self.comparator, self.cutoff)
    }
}

// ---------------------------------------------------------------------------
// Facts and effects
// ---------------------------------------------------------------------------

/// A named boolean condition: a precondition, a goal fact, or the fact a
/// causal link protects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fact {
    pub name: String,
    pub value: bool,
}

impl Fact {
    pub fn new(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// The value an effect assigns to its fact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactValue {
    Literal(bool),
    Threshold(Threshold),
}

impl FactValue {
    /// Resolve to a boolean under `params`. Unbound thresholds yield `None`.
    pub fn resolve(&self, params: &Parameters) -> Option<bool> {
        match self {
            Self::Literal(b) => Some(*b),
            Self::Threshold(t) => t.evaluate(params),
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(b) => write!(f, "{b}"),
            Self::Threshold(t) => write!(f, "({t})"),
        }
    }
}

/// An effect of an action: sets `name` to `value` once the action runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub name: String,
    pub value: FactValue,
}

impl Effect {
    pub fn literal(name: impl Into<String>, value: bool) -> Self {
        Self {
            name: name.into(),
            value: FactValue::Literal(value),
        }
    }

    pub fn threshold(name: impl Into<String>, threshold: Threshold) -> Self {
        Self {
            name: name.into(),
            value: FactValue::Threshold(threshold),
        }
    }

    /// Whether this effect makes `desired` true under `params`.
    ///
    /// A threshold over an unbound parameter never establishes anything.
    pub fn establishes(&self, desired: &Fact, params: &Parameters) -> bool {
        self.name == desired.name && self.value.resolve(params) == Some(desired.value)
    }

    /// Whether this effect makes `protected` false under `params`.
    pub fn contradicts(&self, protected: &Fact, params: &Parameters) -> bool {
        self.name == protected.name && self.value.resolve(params) == Some(!protected.value)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}
