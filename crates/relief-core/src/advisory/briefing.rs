//! The fact sheet a narrator consumes.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ActionId, Domain, Parameter, Parameters};
use crate::pop::Solution;

/// A risk-aware route suggestion, merged into the briefing as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAdvice {
    pub route: String,
    pub cost: f64,
}

/// One recommended action label from a policy component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyAdvice {
    pub action: String,
}

/// Actions one team carries out, in plan order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAssignment {
    pub team: String,
    pub actions: Vec<String>,
}

/// Everything a downstream narrator is told about a solved plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Briefing {
    pub domain: String,
    pub generated_at: DateTime<Utc>,
    pub parameters: Parameters,
    /// Goals with their team, if any.
    pub goals: Vec<(String, Option<String>)>,
    pub teams: Vec<TeamAssignment>,
    /// Operators without a team, in plan order.
    pub unassigned: Vec<String>,
    /// Operators only, in plan order.
    pub linear_plan: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteAdvice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyAdvice>,
}

impl Briefing {
    /// Build a briefing from a solution. Init and goal pseudo-actions are
    /// left out of the plan and team lists.
    pub fn from_solution(domain: &Domain, params: Parameters, solution: &Solution) -> Self {
        let operators: Vec<ActionId> = solution
            .linearization
            .iter()
            .copied()
            .filter(|&id| id != ActionId::INIT && !domain.is_goal(id))
            .collect();

        let mut teams: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        let mut unassigned = Vec::new();
        for &id in &operators {
            let action = domain.action(id);
            match &action.team {
                Some(team) => teams.entry(team.as_str()).or_default().push(action.name.clone()),
                None => unassigned.push(action.name.clone()),
            }
        }

        Self {
            domain: domain.name().to_owned(),
            generated_at: Utc::now(),
            parameters: params,
            goals: solution
                .plan
                .goals()
                .iter()
                .map(|&g| {
                    let goal = domain.action(g);
                    (goal.name.clone(), goal.team.clone())
                })
                .collect(),
            teams: teams
                .into_iter()
                .map(|(team, actions)| TeamAssignment {
                    team: team.to_owned(),
                    actions,
                })
                .collect(),
            unassigned,
            linear_plan: operators.iter().map(|&id| domain.name_of(id).to_owned()).collect(),
            route: None,
            policy: None,
        }
    }

    pub fn with_route(mut self, route: RouteAdvice) -> Self {
        self.route = Some(route);
        self
    }

    pub fn with_policy(mut self, policy: PolicyAdvice) -> Self {
        self.policy = Some(policy);
        self
    }
}

fn percent(params: &Parameters, param: Parameter) -> String {
    match params.get(param) {
        Some(v) => format!("{:.0}%", v * 100.0),
        None => "unknown".to_owned(),
    }
}

impl fmt::Display for Briefing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Disaster-response briefing: {}", self.domain)?;
        writeln!(f, "Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f)?;

        writeln!(f, "Conditions:")?;
        writeln!(
            f,
            "- Flood probability: {}",
            percent(&self.parameters, Parameter::FloodProbability)
        )?;
        writeln!(
            f,
            "- Infrastructure risk: {}",
            percent(&self.parameters, Parameter::InfrastructureRisk)
        )?;
        writeln!(f)?;

        writeln!(f, "Goals:")?;
        for (i, (goal, team)) in self.goals.iter().enumerate() {
            match team {
                Some(team) => writeln!(f, "{}. {goal} ({team})", i + 1)?,
                None => writeln!(f, "{}. {goal}", i + 1)?,
            }
        }
        writeln!(f)?;

        writeln!(f, "Team assignments:")?;
        for assignment in &self.teams {
            writeln!(f, "- {}: {}", assignment.team, assignment.actions.join(", "))?;
        }
        if !self.unassigned.is_empty() {
            writeln!(f, "- unassigned: {}", self.unassigned.join(", "))?;
        }
        writeln!(f)?;

        writeln!(f, "Action sequence:")?;
        for (i, action) in self.linear_plan.iter().enumerate() {
            writeln!(f, "{}. {action}", i + 1)?;
        }

        if self.route.is_some() || self.policy.is_some() {
            writeln!(f)?;
        }
        if let Some(route) = &self.route {
            writeln!(f, "Safe route: {} (cost {:.2})", route.route, route.cost)?;
        }
        if let Some(policy) = &self.policy {
            writeln!(f, "Recommended policy action: {}", policy.action)?;
        }
        Ok(())
    }
}
