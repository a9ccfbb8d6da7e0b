//! TOML format types for domain definition files.
//!
//! These types map directly to the on-disk domain format and are
//! deserialized via `serde` + the `toml` crate. Conversion into a validated
//! [`Domain`](super::Domain) lives in [`parser`](super::parser).

use serde::{Deserialize, Serialize};

use super::fact::{Parameters, Threshold};

/// Top-level structure of a domain file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainToml {
    /// Domain metadata.
    pub domain: DomainMeta,
    /// Default parameter values; CLI flags and config override them.
    #[serde(default)]
    pub parameters: Parameters,
    /// The starting world.
    pub init: InitToml,
    /// Catalog operators, in declaration order.
    #[serde(default)]
    pub actions: Vec<ActionToml>,
    /// Goal pseudo-actions a caller may request.
    #[serde(default)]
    pub goals: Vec<GoalToml>,
}

/// Domain-level metadata in `[domain]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainMeta {
    /// Human-readable domain name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The `[init]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InitToml {
    #[serde(default = "default_init_name")]
    pub name: String,
    #[serde(default)]
    pub effects: Vec<FactToml>,
}

/// A single `[[actions]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionToml {
    /// Unique action name within the domain.
    pub name: String,
    /// Responsible response team (e.g. `rescue`, `communication`, `medical`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default)]
    pub preconditions: Vec<FactToml>,
    #[serde(default)]
    pub effects: Vec<FactToml>,
}

/// A single `[[goals]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalToml {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    /// Desired facts; literal booleans only.
    #[serde(default)]
    pub effects: Vec<FactToml>,
}

/// One fact entry: either `{ fact, value }` or `{ fact, when = {...} }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactToml {
    pub fact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Threshold>,
}

fn default_init_name() -> String {
    "start".to_string()
}
