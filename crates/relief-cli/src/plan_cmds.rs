//! CLI handlers for the commands that run the planner.
//!
//! Implements:
//! - `relief plan`  -- print the plan (or its JSON record)
//! - `relief brief` -- print the briefing a narrator would consume
//! - `relief dot`   -- print the solved plan as Graphviz DOT
//!
//! Each handler returns `Ok(true)` when a plan was found and `Ok(false)`
//! when the search ended exhausted or over budget.

use anyhow::{Context, Result};

use relief_core::advisory::{
    Briefing, Narrator, ParameterSource, PlainNarrator, PolicyAdvice, RouteAdvice,
};
use relief_core::domain::{ActionId, Domain, Parameters};
use relief_core::pop::{NodeBudget, PlanRecord, Planner, SearchReport, render_dot};

use crate::PlanArgs;
use crate::config::ReliefConfig;
use crate::resolve::resolve_domain;

// -----------------------------------------------------------------------
// Shared search setup
// -----------------------------------------------------------------------

/// Everything one planner run produced.
struct Run {
    domain: Domain,
    parameters: Parameters,
    goals: Vec<ActionId>,
    report: SearchReport,
}

impl Run {
    fn record(&self) -> PlanRecord {
        PlanRecord::new(&self.domain, self.parameters, &self.goals, &self.report)
    }

    fn report_failure(&self) {
        eprintln!(
            "No plan found: search {} after {} nodes.",
            self.report.status(),
            self.report.stats.nodes
        );
    }
}

/// Resolve domain, configuration and goals, then run one search.
fn run_search(args: &PlanArgs) -> Result<Run> {
    let domain = resolve_domain(args.domain.as_deref())?;
    let config = ReliefConfig::resolve(&args.overrides(), &domain)?;

    let parameters = config
        .parameters
        .estimate()
        .with_context(|| format!("parameter source {} failed", config.parameters.name()))?;

    let goals = if args.goals.is_empty() {
        domain.all_goals()
    } else {
        domain.resolve_goals(&args.goals)?
    };

    tracing::debug!(
        domain = domain.name(),
        goals = goals.len(),
        max_nodes = config.search.max_nodes,
        "starting search"
    );
    let planner = Planner::new(&domain, parameters, config.search)?;
    let mut budget = NodeBudget::new(config.search.max_nodes);
    let report = planner.solve_ids(&goals, &mut budget);

    Ok(Run {
        domain,
        parameters,
        goals,
        report,
    })
}

// -----------------------------------------------------------------------
// relief plan
// -----------------------------------------------------------------------

pub fn run_plan(args: &PlanArgs, json: bool) -> Result<bool> {
    let run = run_search(args)?;
    let record = run.record();

    if json {
        let out = serde_json::to_string_pretty(&record).context("failed to serialize plan record")?;
        println!("{out}");
    } else {
        print_record(&record);
    }

    let solved = run.report.is_solved();
    if !solved {
        run.report_failure();
    }
    Ok(solved)
}

fn print_record(record: &PlanRecord) {
    println!("Domain: {}", record.domain);
    println!("Goals:  {}", record.goals.join(", "));
    println!(
        "Status: {} ({} nodes, {} branches, {} threat rejections)",
        record.status,
        record.stats.nodes,
        record.stats.branches,
        record.stats.threat_rejections
    );

    if !record.actions.is_empty() {
        println!();
        println!("Actions:");
        for action in &record.actions {
            match &action.team {
                Some(team) => println!("  {} [{team}]", action.name),
                None => println!("  {}", action.name),
            }
        }

        println!();
        println!("Causal links:");
        for link in &record.causal_links {
            println!("  {} --{}--> {}", link.provider, link.fact, link.consumer);
        }

        println!();
        println!("Ordering constraints:");
        for edge in &record.ordering {
            println!("  {} < {}", edge.before, edge.after);
        }

        println!();
        println!("Linearization:");
        for (i, name) in record.linearization.iter().enumerate() {
            println!("  {:>2}. {name}", i + 1);
        }
    }

    if !record.trace.is_empty() {
        println!();
        println!("Search trace:");
        for event in &record.trace {
            match serde_json::to_string(event) {
                Ok(line) => println!("  {line}"),
                Err(e) => println!("  <unprintable event: {e}>"),
            }
        }
    }
}

// -----------------------------------------------------------------------
// relief brief
// -----------------------------------------------------------------------

/// Collaborator outputs merged into the briefing.
#[derive(Debug, Default)]
pub struct BriefExtras {
    pub route: Option<(String, f64)>,
    pub policy: Option<String>,
}

pub fn run_brief(args: &PlanArgs, extras: BriefExtras) -> Result<bool> {
    let run = run_search(args)?;
    let Some(solution) = run.report.solution() else {
        run.report_failure();
        return Ok(false);
    };

    let mut briefing = Briefing::from_solution(&run.domain, run.parameters, solution);
    if let Some((route, cost)) = extras.route {
        briefing = briefing.with_route(RouteAdvice { route, cost });
    }
    if let Some(action) = extras.policy {
        briefing = briefing.with_policy(PolicyAdvice { action });
    }

    let narrator = PlainNarrator;
    let text = narrator
        .narrate(&briefing)
        .with_context(|| format!("narrator {} failed", narrator.name()))?;
    print!("{text}");

    Ok(true)
}

// -----------------------------------------------------------------------
// relief dot
// -----------------------------------------------------------------------

pub fn run_dot(args: &PlanArgs) -> Result<bool> {
    let run = run_search(args)?;
    match run.report.solution() {
        Some(solution) => {
            print!("{}", render_dot(&run.domain, solution));
            Ok(true)
        }
        None => {
            run.report_failure();
            Ok(false)
        }
    }
}
