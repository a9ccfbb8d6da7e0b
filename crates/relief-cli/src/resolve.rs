//! Domain resolution for `--domain` and positional domain arguments.
//!
//! [`resolve_domain`] accepts either a path to a domain TOML file or the
//! name of a built-in domain. With no argument the built-in
//! flood-preparedness domain is used.

use std::path::Path;

use anyhow::{Context, Result, bail};

use relief_core::domain::{Domain, builtin, parse_domain_toml};

/// Load the domain named by `input`.
///
/// A string naming an existing file, ending in `.toml`, or containing a
/// path separator is read from disk. Anything else must be a built-in
/// domain name.
pub fn resolve_domain(input: Option<&str>) -> Result<Domain> {
    let Some(input) = input else {
        return Ok(builtin::flood_preparedness());
    };

    if looks_like_file_path(input) {
        return read_domain_file(input);
    }
    match builtin::by_name(input) {
        Some(domain) => Ok(domain),
        None => bail!(
            "unknown domain {input:?}: not a file and not a built-in (built-ins: {})",
            builtin::BUILTIN_NAMES.join(", ")
        ),
    }
}

fn looks_like_file_path(input: &str) -> bool {
    input.ends_with(".toml")
        || input.contains('/')
        || input.contains(std::path::MAIN_SEPARATOR)
        || Path::new(input).is_file()
}

/// Read and parse a domain TOML file.
pub fn read_domain_file(path: &str) -> Result<Domain> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read domain file: {path}"))?;
    parse_domain_toml(&content).with_context(|| format!("invalid domain file: {path}"))
}
