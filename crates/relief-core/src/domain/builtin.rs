//! Built-in domains embedded in the binary at compile time.

use super::{Domain, parse_domain_toml};

/// The embedded flood-preparedness domain TOML.
static FLOOD_PREPAREDNESS_TOML: &str = include_str!("../../domains/flood-preparedness.toml");

/// Names accepted by [`by_name`].
pub const BUILTIN_NAMES: &[&str] = &["flood-preparedness"];

/// Raw TOML source of the flood-preparedness domain.
pub fn flood_preparedness_source() -> &'static str {
    FLOOD_PREPAREDNESS_TOML
}

/// Load the flood-preparedness domain.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed. This is a compile-time invariant
/// -- if the binary was built and its tests pass, the TOML is valid.
pub fn flood_preparedness() -> Domain {
    parse_domain_toml(FLOOD_PREPAREDNESS_TOML).expect("embedded flood-preparedness.toml is invalid")
}

/// Look up a built-in domain by name.
pub fn by_name(name: &str) -> Option<Domain> {
    match name {
        "flood-preparedness" => Some(flood_preparedness()),
        _ => None,
    }
}
