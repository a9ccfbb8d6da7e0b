//! CLI handlers for `relief domain` subcommands.
//!
//! Implements:
//! - `relief domain check <file>` -- parse and validate, print a summary
//! - `relief domain show [file]`  -- list actions with resolved effects

use std::collections::BTreeSet;

use anyhow::Result;

use relief_core::domain::{Action, ActionKind, Domain, FactValue, Parameters};

use crate::DomainCommands;
use crate::config::{Overrides, ReliefConfig};
use crate::resolve::{read_domain_file, resolve_domain};

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

pub fn run_domain_command(command: DomainCommands) -> Result<()> {
    match command {
        DomainCommands::Check { file } => cmd_check(&file),
        DomainCommands::Show {
            domain,
            flood_probability,
            infrastructure_risk,
        } => {
            let domain = resolve_domain(domain.as_deref())?;
            let overrides = Overrides {
                flood_probability,
                infrastructure_risk,
                ..Overrides::default()
            };
            let config = ReliefConfig::resolve(&overrides, &domain)?;
            cmd_show(&domain, &config.parameters);
            Ok(())
        }
    }
}

// -----------------------------------------------------------------------
// relief domain check <file>
// -----------------------------------------------------------------------

fn cmd_check(file: &str) -> Result<()> {
    let domain = read_domain_file(file)?;

    let thresholds = domain
        .iter()
        .flat_map(|(_, a)| a.effects.iter())
        .filter(|e| matches!(e.value, FactValue::Threshold(_)))
        .count();
    let teams: BTreeSet<&str> = domain.iter().filter_map(|(_, a)| a.team.as_deref()).collect();

    println!("Domain is valid.");
    println!();
    println!("  Name:        {}", domain.name());
    println!("  Init facts:  {}", domain.init().effects.len());
    println!("  Actions:     {}", domain.operators().count());
    println!("  Goals:       {}", domain.goals().count());
    println!("  Thresholds:  {thresholds}");
    if !teams.is_empty() {
        println!("  Teams:       {}", teams.into_iter().collect::<Vec<_>>().join(", "));
    }

    Ok(())
}

// -----------------------------------------------------------------------
// relief domain show [file]
// -----------------------------------------------------------------------

fn cmd_show(domain: &Domain, params: &Parameters) {
    println!("Domain: {}", domain.name());
    println!(
        "Parameters: flood_probability={} infrastructure_risk={}",
        fmt_param(params.flood_probability),
        fmt_param(params.infrastructure_risk)
    );

    for (_, action) in domain.iter() {
        println!();
        print_action(action, params);
    }
}

fn print_action(action: &Action, params: &Parameters) {
    let kind = match action.kind {
        ActionKind::Init => "init",
        ActionKind::Operator => "action",
        ActionKind::Goal => "goal",
    };
    match &action.team {
        Some(team) => println!("{kind} {} [{team}]", action.name),
        None => println!("{kind} {}", action.name),
    }

    if !action.preconditions.is_empty() {
        println!("  requires:");
        for fact in &action.preconditions {
            println!("    {fact}");
        }
    }

    let label = if action.kind == ActionKind::Goal {
        "desires"
    } else {
        "effects"
    };
    println!("  {label}:");
    for effect in &action.effects {
        match (&effect.value, effect.value.resolve(params)) {
            (FactValue::Literal(_), _) => println!("    {effect}"),
            (FactValue::Threshold(t), Some(v)) => println!("    {}={v}  (when {t})", effect.name),
            (FactValue::Threshold(t), None) => println!("    {}=unknown  (when {t})", effect.name),
        }
    }
}

fn fmt_param(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{v:.2}"),
        _ => "unbound".to_owned(),
    }
}
