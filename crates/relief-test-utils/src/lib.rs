//! Shared fixture domains for relief integration tests.
//!
//! Every fixture is authored as domain TOML so the tests exercise the same
//! parsing path as domain files on disk.

use relief_core::domain::{Domain, Parameters, builtin, parse_domain_toml};

/// Parse fixture TOML, panicking with the parser's message on failure.
pub fn domain_from_toml(source: &str) -> Domain {
    parse_domain_toml(source).unwrap_or_else(|e| panic!("fixture domain is invalid: {e}"))
}

/// The built-in flood-preparedness domain.
pub fn flood_domain() -> Domain {
    builtin::flood_preparedness()
}

/// Parameters the flood scenario is usually planned under.
pub fn flood_parameters() -> Parameters {
    Parameters::new(0.55, 0.8)
}

/// Goal names of the flood domain, in declaration order.
pub const FLOOD_GOALS: &[&str] = &[
    "rescue_team_work_done",
    "communication_team_work_done",
    "medical_and_supplies_work_done",
];

/// The flood domain plus a goal nothing can establish.
pub fn flood_with_levee_goal() -> Domain {
    let source = format!(
        "{}\n{}",
        builtin::flood_preparedness_source(),
        r#"
[[goals]]
name = "levee_work_done"
effects = [{ fact = "levee_reinforced", value = true }]
"#
    );
    domain_from_toml(&source)
}

/// `burn` makes heat but uses up the fuel `cook` also needs. Every ordering
/// of the threat is cyclic, so the search runs dry.
pub const KITCHEN_TOML: &str = r#"
[domain]
name = "kitchen"

[init]
name = "start"
effects = [{ fact = "fuel", value = true }]

[[actions]]
name = "burn"
effects = [
  { fact = "heat", value = true },
  { fact = "fuel", value = false },
]

[[actions]]
name = "cook"
preconditions = [
  { fact = "fuel", value = true },
  { fact = "heat", value = true },
]
effects = [{ fact = "meal", value = true }]

[[goals]]
name = "dinner"
effects = [{ fact = "meal", value = true }]
"#;

pub fn kitchen_domain() -> Domain {
    domain_from_toml(KITCHEN_TOML)
}

/// A goal two operators deep: needs more than one expansion.
pub const RELAY_TOML: &str = r#"
[domain]
name = "relay"

[init]
effects = [{ fact = "supplies_at_depot", value = true }]

[[actions]]
name = "load_truck"
team = "medical"
preconditions = [{ fact = "supplies_at_depot", value = true }]
effects = [{ fact = "truck_loaded", value = true }]

[[actions]]
name = "drive_to_shelter"
team = "rescue"
preconditions = [{ fact = "truck_loaded", value = true }]
effects = [{ fact = "shelter_supplied", value = true }]

[[goals]]
name = "shelter_ready"
effects = [{ fact = "shelter_supplied", value = true }]
"#;

pub fn relay_domain() -> Domain {
    domain_from_toml(RELAY_TOML)
}
