//! Domain model: the immutable catalog of actions a planner searches over.
//!
//! A [`Domain`] holds one init pseudo-action (the starting world), the
//! catalog of operators, and the goal pseudo-actions a caller may request.
//! Every action gets an [`ActionId`] in declaration order (init first, then
//! operators, then goals); all deterministic tie-breaking in the planner
//! follows that order.

pub mod builtin;
mod error;
pub mod fact;
pub mod parser;
pub mod toml_format;

use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use error::DomainError;
pub use fact::{Comparator, Effect, Fact, FactValue, Parameter, Parameters, Threshold};
pub use parser::parse_domain_toml;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Position of an action in its domain's declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(usize);

impl ActionId {
    /// The init pseudo-action is always declared first.
    pub const INIT: ActionId = ActionId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Role an action plays in a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// The starting world: no preconditions, effects are the initial facts.
    Init,
    /// A catalog operator the planner may introduce.
    Operator,
    /// A goal pseudo-action: no preconditions, effects are desired facts.
    Goal,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::Operator => "operator",
            Self::Goal => "goal",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// A named unit of work with ordered preconditions and effects.
///
/// Build with [`Action::operator`], [`Action::init`] or [`Action::goal`],
/// then chain the builder-style setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub kind: ActionKind,
    /// Response team responsible for the action, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    pub preconditions: Vec<Fact>,
    pub effects: Vec<Effect>,
}

impl Action {
    fn new(name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            team: None,
            preconditions: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// A catalog operator.
    pub fn operator(name: impl Into<String>) -> Self {
        Self::new(name, ActionKind::Operator)
    }

    /// The init pseudo-action describing the starting world.
    pub fn init(name: impl Into<String>) -> Self {
        Self::new(name, ActionKind::Init)
    }

    /// A goal pseudo-action; add its desired facts with [`Action::desire`].
    pub fn goal(name: impl Into<String>) -> Self {
        Self::new(name, ActionKind::Goal)
    }

    /// Set the responsible team.
    pub fn team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Append a precondition.
    pub fn requires(mut self, name: impl Into<String>, value: bool) -> Self {
        self.preconditions.push(Fact::new(name, value));
        self
    }

    /// Append an effect.
    pub fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Append a literal effect.
    pub fn sets(self, name: impl Into<String>, value: bool) -> Self {
        self.effect(Effect::literal(name, value))
    }

    /// Append a desired fact to a goal (a literal effect).
    pub fn desire(self, name: impl Into<String>, value: bool) -> Self {
        self.sets(name, value)
    }

    /// Whether any effect establishes `fact` under `params`.
    pub fn establishes(&self, fact: &Fact, params: &Parameters) -> bool {
        self.effects.iter().any(|e| e.establishes(fact, params))
    }

    /// Whether any effect contradicts `fact` under `params`.
    pub fn contradicts(&self, fact: &Fact, params: &Parameters) -> bool {
        self.effects.iter().any(|e| e.contradicts(fact, params))
    }

    /// Desired facts of a goal pseudo-action, in declaration order.
    ///
    /// Threshold effects are skipped; the domain builder rejects them on
    /// goals, so for a built domain this yields every effect.
    pub fn desired_facts(&self) -> impl Iterator<Item = Fact> + '_ {
        self.effects.iter().filter_map(|e| match e.value {
            FactValue::Literal(value) => Some(Fact::new(e.name.clone(), value)),
            FactValue::Threshold(_) => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// Immutable action catalog. Shared by reference across searches.
#[derive(Debug, Clone)]
pub struct Domain {
    name: String,
    actions: Vec<Action>,
    index: HashMap<String, ActionId>,
    default_parameters: Parameters,
}

impl Domain {
    /// Start building a domain.
    pub fn builder(name: impl Into<String>) -> DomainBuilder {
        DomainBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter values declared by the domain file, if any.
    pub fn default_parameters(&self) -> Parameters {
        self.default_parameters
    }

    /// Number of actions, including init and goals.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn init(&self) -> &Action {
        &self.actions[ActionId::INIT.0]
    }

    /// The action with id `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this domain.
    pub fn action(&self, id: ActionId) -> &Action {
        &self.actions[id.0]
    }

    /// Name of the action with id `id`.
    pub fn name_of(&self, id: ActionId) -> &str {
        &self.action(id).name
    }

    /// Id of the action called `name`, if declared.
    pub fn get(&self, name: &str) -> Option<ActionId> {
        self.index.get(name).copied()
    }

    /// Id of the action called `name`.
    pub fn lookup(&self, name: &str) -> Result<ActionId, DomainError> {
        self.get(name)
            .ok_or_else(|| DomainError::UnknownAction(name.to_owned()))
    }

    /// All actions with their ids, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (ActionId, &Action)> {
        self.actions
            .iter()
            .enumerate()
            .map(|(i, action)| (ActionId(i), action))
    }

    /// Catalog operators in declaration order.
    pub fn operators(&self) -> impl Iterator<Item = (ActionId, &Action)> {
        self.iter().filter(|(_, a)| a.kind == ActionKind::Operator)
    }

    /// Goal pseudo-actions in declaration order.
    pub fn goals(&self) -> impl Iterator<Item = (ActionId, &Action)> {
        self.iter().filter(|(_, a)| a.kind == ActionKind::Goal)
    }

    pub fn is_goal(&self, id: ActionId) -> bool {
        self.action(id).kind == ActionKind::Goal
    }

    /// Resolve requested goal names to ids, preserving request order.
    pub fn resolve_goals<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<ActionId>, DomainError> {
        if names.is_empty() {
            return Err(DomainError::NoGoalsRequested);
        }
        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let id = self.lookup(name)?;
            if !self.is_goal(id) {
                return Err(DomainError::NotAGoal(name.to_owned()));
            }
            if !seen.insert(id) {
                return Err(DomainError::DuplicateGoalRequest(name.to_owned()));
            }
            ids.push(id);
        }
        Ok(ids)
    }

    /// Every goal the domain declares, in declaration order.
    pub fn all_goals(&self) -> Vec<ActionId> {
        self.goals().map(|(id, _)| id).collect()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects actions and validates them into a [`Domain`].
#[derive(Debug, Clone)]
pub struct DomainBuilder {
    name: String,
    init: Option<Action>,
    operators: Vec<Action>,
    goals: Vec<Action>,
    parameters: Parameters,
}

impl DomainBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            init: None,
            operators: Vec::new(),
            goals: Vec::new(),
            parameters: Parameters::default(),
        }
    }

    /// Set the init pseudo-action. A later call replaces an earlier one.
    pub fn init(mut self, init: Action) -> Self {
        self.init = Some(Action {
            kind: ActionKind::Init,
            ..init
        });
        self
    }

    /// Append a catalog operator.
    pub fn operator(mut self, action: Action) -> Self {
        self.operators.push(Action {
            kind: ActionKind::Operator,
            ..action
        });
        self
    }

    /// Append a goal pseudo-action.
    pub fn goal(mut self, goal: Action) -> Self {
        self.goals.push(Action {
            kind: ActionKind::Goal,
            ..goal
        });
        self
    }

    /// Declare default parameter values.
    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Validate and freeze the domain.
    pub fn build(self) -> Result<Domain, DomainError> {
        let init = self.init.ok_or(DomainError::MissingInit)?;
        if self.goals.is_empty() {
            return Err(DomainError::NoGoals);
        }
        if let Some((parameter, value)) = self.parameters.out_of_range() {
            return Err(DomainError::ParameterOutOfRange { parameter, value });
        }

        let mut actions = Vec::with_capacity(1 + self.operators.len() + self.goals.len());
        actions.push(init);
        actions.extend(self.operators);
        actions.extend(self.goals);

        let mut index = HashMap::with_capacity(actions.len());
        for (i, action) in actions.iter().enumerate() {
            validate_action(action)?;
            if index.insert(action.name.clone(), ActionId(i)).is_some() {
                return Err(DomainError::DuplicateAction(action.name.clone()));
            }
        }

        Ok(Domain {
            name: self.name,
            actions,
            index,
            default_parameters: self.parameters,
        })
    }
}

/// Structural checks for a single action.
fn validate_action(action: &Action) -> Result<(), DomainError> {
    if action.name.trim().is_empty() {
        return Err(DomainError::EmptyName);
    }

    match action.kind {
        ActionKind::Init if !action.preconditions.is_empty() => {
            return Err(DomainError::InitPreconditions(action.name.clone()));
        }
        ActionKind::Goal if !action.preconditions.is_empty() => {
            return Err(DomainError::GoalPreconditions(action.name.clone()));
        }
        ActionKind::Goal if action.effects.is_empty() => {
            return Err(DomainError::EmptyGoal(action.name.clone()));
        }
        _ => {}
    }

    let mut fact_names = action
        .preconditions
        .iter()
        .map(|f| &f.name)
        .chain(action.effects.iter().map(|e| &e.name));
    if fact_names.any(|n| n.trim().is_empty()) {
        return Err(DomainError::EmptyFactName {
            action: action.name.clone(),
        });
    }

    for effect in &action.effects {
        let FactValue::Threshold(threshold) = effect.value else {
            continue;
        };
        if action.kind == ActionKind::Goal {
            return Err(DomainError::ThresholdInGoal {
                goal: action.name.clone(),
                fact: effect.name.clone(),
            });
        }
        if !(0.0..=1.0).contains(&threshold.cutoff) {
            return Err(DomainError::InvalidCutoff {
                action: action.name.clone(),
                fact: effect.name.clone(),
                cutoff: threshold.cutoff,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> DomainBuilder {
        Domain::builder("tiny")
            .init(Action::init("start").sets("fuel", true))
            .operator(
                Action::operator("cook")
                    .team("kitchen")
                    .requires("fuel", true)
                    .sets("meal", true),
            )
            .goal(Action::goal("dinner").desire("meal", true))
    }

    #[test]
    fn ids_follow_declaration_order() {
        let domain = tiny().build().expect("valid domain");
        assert_eq!(domain.lookup("start").unwrap(), ActionId::INIT);
        assert_eq!(domain.lookup("cook").unwrap().index(), 1);
        assert_eq!(domain.lookup("dinner").unwrap().index(), 2);
        assert_eq!(domain.len(), 3);
        assert_eq!(domain.operators().count(), 1);
        assert_eq!(domain.all_goals(), vec![domain.lookup("dinner").unwrap()]);
    }

    #[test]
    fn lookup_unknown_is_an_error() {
        let domain = tiny().build().unwrap();
        let err = domain.lookup("bake").unwrap_err();
        assert!(
            matches!(err, DomainError::UnknownAction(ref n) if n == "bake"),
            "expected UnknownAction, got: {err}"
        );
    }

    #[test]
    fn rejects_missing_init() {
        let err = Domain::builder("no-init")
            .goal(Action::goal("g").desire("x", true))
            .build()
            .unwrap_err();
        assert!(matches!(err, DomainError::MissingInit), "got: {err}");
    }

    #[test]
    fn rejects_duplicate_names_across_kinds() {
        let err = tiny()
            .goal(Action::goal("cook").desire("meal", true))
            .build()
            .unwrap_err();
        assert!(
            matches!(err, DomainError::DuplicateAction(ref n) if n == "cook"),
            "got: {err}"
        );
    }

    #[test]
    fn rejects_threshold_in_goal() {
        let threshold = Threshold {
            parameter: Parameter::FloodProbability,
            comparator: Comparator::AtLeast,
            cutoff: 0.5,
        };
        let err = tiny()
            .goal(Action::goal("risky").effect(Effect::threshold("alarm", threshold)))
            .build()
            .unwrap_err();
        assert!(
            matches!(err, DomainError::ThresholdInGoal { .. }),
            "got: {err}"
        );
    }

    #[test]
    fn rejects_cutoff_outside_unit_interval() {
        let threshold = Threshold {
            parameter: Parameter::InfrastructureRisk,
            comparator: Comparator::Below,
            cutoff: 1.5,
        };
        let err = tiny()
            .operator(Action::operator("inspect").effect(Effect::threshold("ok", threshold)))
            .build()
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidCutoff { .. }), "got: {err}");
    }

    #[test]
    fn rejects_goal_preconditions_and_empty_goals() {
        let err = tiny()
            .goal(Action::goal("g").requires("x", true).desire("y", true))
            .build()
            .unwrap_err();
        assert!(matches!(err, DomainError::GoalPreconditions(_)), "got: {err}");

        let err = tiny().goal(Action::goal("empty")).build().unwrap_err();
        assert!(matches!(err, DomainError::EmptyGoal(_)), "got: {err}");
    }

    #[test]
    fn rejects_out_of_range_default_parameters() {
        let err = tiny()
            .parameters(Parameters::new(-0.1, 0.5))
            .build()
            .unwrap_err();
        assert!(
            matches!(err, DomainError::ParameterOutOfRange { .. }),
            "got: {err}"
        );
    }

    #[test]
    fn resolve_goals_checks_kind_and_duplicates() {
        let domain = tiny().build().unwrap();
        assert!(matches!(
            domain.resolve_goals::<&str>(&[]).unwrap_err(),
            DomainError::NoGoalsRequested
        ));
        assert!(matches!(
            domain.resolve_goals(&["cook"]).unwrap_err(),
            DomainError::NotAGoal(_)
        ));
        assert!(matches!(
            domain.resolve_goals(&["dinner", "dinner"]).unwrap_err(),
            DomainError::DuplicateGoalRequest(_)
        ));
        assert_eq!(domain.resolve_goals(&["dinner"]).unwrap().len(), 1);
    }

    #[test]
    fn builder_forces_kinds() {
        let domain = Domain::builder("kinds")
            .init(Action::operator("start").sets("a", true))
            .goal(Action::operator("g").desire("a", true))
            .build()
            .unwrap();
        assert_eq!(domain.init().kind, ActionKind::Init);
        assert!(domain.is_goal(domain.lookup("g").unwrap()));
    }
}
