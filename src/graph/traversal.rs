use std::collections::VecDeque;

use indexmap::IndexSet;
use tracing::warn;

use super::snapshot::Snapshot;

/// A connected component of the link graph, in visit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Family {
    members: IndexSet<String>,
    truncated: bool,
}

impl Family {
    /// The family of an identifier absent from the record index.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    /// Returns `true` if traversal stopped at the visited-node bound before
    /// the component was exhausted.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Members sorted lexicographically, for stable display.
    pub fn sorted(&self) -> Vec<String> {
        let mut members: Vec<String> = self.members.iter().cloned().collect();
        members.sort();
        members
    }
}

/// Discovers families (connected components) in a published snapshot.
pub struct ComponentResolver<'a> {
    snapshot: &'a Snapshot,
    max_visited: usize,
}

impl<'a> ComponentResolver<'a> {
    /// Creates an unbounded resolver over `snapshot`.
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            max_visited: usize::MAX,
        }
    }

    /// Creates a resolver that stops after visiting `max_visited` identifiers.
    /// The seed is always visited, so a bound of zero behaves like one.
    pub fn with_limit(snapshot: &'a Snapshot, max_visited: usize) -> Self {
        Self {
            snapshot,
            max_visited: max_visited.max(1),
        }
    }

    /// Breadth-first search from `seed`.
    ///
    /// Returns the component containing `seed`, or `{seed}` alone when the
    /// seed is indexed but has no edges. A seed missing from the record index
    /// yields an empty family.
    pub fn resolve(&self, seed: &str) -> Family {
        if !self.snapshot.contains_identifier(seed) {
            return Family::empty();
        }

        let graph = self.snapshot.graph();
        let mut visited: IndexSet<String> = IndexSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut truncated = false;
        queue.push_back(seed.to_string());

        while let Some(current) = queue.pop_front() {
            if visited.contains(&current) {
                continue;
            }
            if visited.len() >= self.max_visited {
                truncated = true;
                break;
            }
            for neighbor in graph.neighbors(&current) {
                if !visited.contains(neighbor) {
                    queue.push_back(neighbor.to_string());
                }
            }
            visited.insert(current);
        }

        if truncated {
            warn!(
                seed,
                limit = self.max_visited,
                "family traversal stopped at visited-node bound"
            );
        }

        Family {
            members: visited,
            truncated,
        }
    }

    /// Depth-first counterpart of [`resolve`](Self::resolve). Produces the
    /// same member set in a different visit order.
    pub fn resolve_dfs(&self, seed: &str) -> Family {
        if !self.snapshot.contains_identifier(seed) {
            return Family::empty();
        }

        let graph = self.snapshot.graph();
        let mut visited: IndexSet<String> = IndexSet::new();
        let mut stack: Vec<String> = vec![seed.to_string()];
        let mut truncated = false;

        while let Some(current) = stack.pop() {
            if visited.contains(&current) {
                continue;
            }
            if visited.len() >= self.max_visited {
                truncated = true;
                break;
            }
            stack.extend(
                graph
                    .neighbors(&current)
                    .filter(|n| !visited.contains(*n))
                    .map(str::to_string),
            );
            visited.insert(current);
        }

        Family {
            members: visited,
            truncated,
        }
    }
}
