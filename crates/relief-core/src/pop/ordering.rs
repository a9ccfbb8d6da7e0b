//! Ordering constraints between plan actions: cycle detection, reachability
//! and linearization.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::ActionId;

/// Set of `(before, after)` edges. Iteration is sorted, which keeps every
/// traversal deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderingConstraints {
    edges: BTreeSet<(ActionId, ActionId)>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

impl OrderingConstraints {
    /// Add `before < after`. Returns `false` if the edge was already present.
    pub fn insert(&mut self, before: ActionId, after: ActionId) -> bool {
        self.edges.insert((before, after))
    }

    /// Remove `before < after`. Returns `false` if the edge was absent.
    pub fn remove(&mut self, before: ActionId, after: ActionId) -> bool {
        self.edges.remove(&(before, after))
    }

    pub fn contains(&self, before: ActionId, after: ActionId) -> bool {
        self.edges.contains(&(before, after))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActionId, ActionId)> + '_ {
        self.edges.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn successors(&self) -> BTreeMap<ActionId, Vec<ActionId>> {
        let mut adj: BTreeMap<ActionId, Vec<ActionId>> = BTreeMap::new();
        for (before, after) in self.iter() {
            adj.entry(before).or_default().push(after);
            adj.entry(after).or_default();
        }
        adj
    }

    /// Detect a cycle with DFS three-coloring: reaching a gray node from a
    /// gray node means the current path loops. Self-edges count as cycles.
    pub fn has_cycle(&self) -> bool {
        let adj = self.successors();
        let mut color: HashMap<ActionId, Color> =
            adj.keys().map(|&node| (node, Color::White)).collect();

        for &root in adj.keys() {
            if color[&root] != Color::White {
                continue;
            }
            // Explicit stack of (node, next successor index).
            let mut stack = vec![(root, 0usize)];
            color.insert(root, Color::Gray);

            while let Some((node, next)) = stack.pop() {
                let succ = &adj[&node];
                if next < succ.len() {
                    stack.push((node, next + 1));
                    let child = succ[next];
                    match color[&child] {
                        Color::Gray => return true,
                        Color::White => {
                            color.insert(child, Color::Gray);
                            stack.push((child, 0));
                        }
                        Color::Black => {}
                    }
                } else {
                    color.insert(node, Color::Black);
                }
            }
        }
        false
    }

    /// Whether `from` is ordered strictly before `to` (transitively).
    pub fn precedes(&self, from: ActionId, to: ActionId) -> bool {
        let adj = self.successors();
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            let Some(succ) = adj.get(&node) else {
                continue;
            };
            for &next in succ {
                if next == to {
                    return true;
                }
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        false
    }

    /// Topological order of `actions` with Kahn's algorithm.
    ///
    /// Among actions with no remaining predecessors the lowest id (earliest
    /// declared) goes first. Edges touching actions outside `actions` are
    /// ignored. Anything left unplaced (only possible with a cycle) is
    /// appended in declaration order.
    pub fn linearize(&self, actions: &BTreeSet<ActionId>) -> Vec<ActionId> {
        let mut in_degree: BTreeMap<ActionId, usize> = actions.iter().map(|&a| (a, 0)).collect();
        let mut adj: BTreeMap<ActionId, Vec<ActionId>> = BTreeMap::new();

        for (before, after) in self.iter() {
            if !actions.contains(&before) || !actions.contains(&after) {
                continue;
            }
            adj.entry(before).or_default().push(after);
            *in_degree.entry(after).or_default() += 1;
        }

        let mut ready: BTreeSet<ActionId> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(&a, _)| a)
            .collect();

        let mut sorted = Vec::with_capacity(actions.len());
        while let Some(node) = ready.pop_first() {
            sorted.push(node);
            for &next in adj.get(&node).into_iter().flatten() {
                if let Some(deg) = in_degree.get_mut(&next) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.insert(next);
                    }
                }
            }
        }

        if sorted.len() != actions.len() {
            let placed: BTreeSet<ActionId> = sorted.iter().copied().collect();
            sorted.extend(actions.difference(&placed).copied());
        }
        sorted
    }
}
