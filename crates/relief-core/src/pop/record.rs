//! Name-based, serializable views of a search result.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ActionId, Domain, Fact, Parameters};

use super::search::{SearchReport, SearchStats, SearchStatus, Solution, TraceEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderingRecord {
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub provider: String,
    pub fact: Fact,
    pub consumer: String,
}

/// The plan record handed to callers and written as `--json` output.
///
/// Plan fields are empty unless `status` is `solved`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub domain: String,
    pub status: SearchStatus,
    pub goals: Vec<String>,
    pub parameters: Parameters,
    pub stats: SearchStats,
    pub actions: Vec<ActionRecord>,
    pub ordering: Vec<OrderingRecord>,
    pub causal_links: Vec<LinkRecord>,
    pub linearization: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceEvent>,
    pub generated_at: DateTime<Utc>,
}

impl PlanRecord {
    pub fn new(domain: &Domain, params: Parameters, goals: &[ActionId], report: &SearchReport) -> Self {
        let name = |id: ActionId| domain.name_of(id).to_owned();

        let mut record = Self {
            domain: domain.name().to_owned(),
            status: report.status(),
            goals: goals.iter().map(|&g| name(g)).collect(),
            parameters: params,
            stats: report.stats,
            actions: Vec::new(),
            ordering: Vec::new(),
            causal_links: Vec::new(),
            linearization: Vec::new(),
            trace: report.trace.clone(),
            generated_at: Utc::now(),
        };

        if let Some(solution) = report.solution() {
            let plan = &solution.plan;
            record.actions = plan
                .actions()
                .iter()
                .map(|&id| ActionRecord {
                    name: name(id),
                    team: domain.action(id).team.clone(),
                })
                .collect();
            record.ordering = plan
                .ordering()
                .iter()
                .map(|(before, after)| OrderingRecord {
                    before: name(before),
                    after: name(after),
                })
                .collect();
            record.causal_links = plan
                .causal_links()
                .iter()
                .map(|link| LinkRecord {
                    provider: name(link.provider),
                    fact: link.fact.clone(),
                    consumer: name(link.consumer),
                })
                .collect();
            record.linearization = solution.linearization.iter().map(|&id| name(id)).collect();
        }

        record
    }
}

/// Graphviz DOT text for a solved plan: causal links solid and labelled,
/// ordering-only edges dashed. Goal pseudo-actions are drawn as double
/// octagons, init as a house.
pub fn render_dot(domain: &Domain, solution: &Solution) -> String {
    let plan = &solution.plan;
    let mut out = String::new();
    let _ = writeln!(out, "digraph \"{}\" {{", escape(domain.name()));
    let _ = writeln!(out, "  rankdir=LR;");
    let _ = writeln!(out, "  node [shape=box];");

    for &id in plan.actions() {
        let action = domain.action(id);
        let shape = if id == ActionId::INIT {
            " shape=house"
        } else if domain.is_goal(id) {
            " shape=doubleoctagon"
        } else {
            ""
        };
        let label = match &action.team {
            Some(team) => format!("{}\\n({})", escape(&action.name), escape(team)),
            None => escape(&action.name),
        };
        let _ = writeln!(out, "  n{} [label=\"{label}\"{shape}];", id.index());
    }

    let mut linked = BTreeSet::new();
    for link in plan.causal_links() {
        linked.insert((link.provider, link.consumer));
        let _ = writeln!(
            out,
            "  n{} -> n{} [label=\"{}\"];",
            link.provider.index(),
            link.consumer.index(),
            escape(&link.fact.to_string())
        );
    }
    for (before, after) in plan.ordering().iter() {
        if !linked.contains(&(before, after)) {
            let _ = writeln!(out, "  n{} -> n{} [style=dashed];", before.index(), after.index());
        }
    }

    out.push_str("}\n");
    out
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
