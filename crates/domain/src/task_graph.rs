//! Dependency graph over a quest's tasks.
//!
//! Nodes are task positions; an edge `task -> dependency` means the task waits on the
//! dependency. Definitions are only accepted when every edge points at another task in
//! the same quest and the graph is acyclic.

use crate::entities::NewTask;

/// A `depends_on` entry that does not point at another task of the quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDependency {
    pub task: usize,
    pub dependency: usize,
}

impl InvalidDependency {
    /// Self-references are in bounds; they only break acyclicity.
    pub fn is_out_of_bounds(&self, task_count: usize) -> bool {
        self.dependency >= task_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Adjacency list of task dependencies, indexed by task position.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: Vec<Vec<usize>>,
}

impl DependencyGraph {
    pub fn new(edges: Vec<Vec<usize>>) -> Self {
        Self { edges }
    }

    pub fn from_tasks(tasks: &[NewTask]) -> Self {
        Self::new(tasks.iter().map(|t| t.depends_on.clone()).collect())
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Every dependency entry that is out of bounds or self-referential, in task order.
    pub fn invalid_dependencies(&self) -> Vec<InvalidDependency> {
        let count = self.len();
        self.edges
            .iter()
            .enumerate()
            .flat_map(|(task, deps)| {
                deps.iter()
                    .filter(move |dep| **dep >= count || **dep == task)
                    .map(move |dep| InvalidDependency {
                        task,
                        dependency: *dep,
                    })
            })
            .collect()
    }

    /// True when every dependency index points inside the task list.
    pub fn indices_in_bounds(&self) -> bool {
        let count = self.len();
        self.edges.iter().flatten().all(|dep| *dep < count)
    }

    /// Depth-first search that reports whether any node is reachable from itself.
    ///
    /// A node reached while it is still on the traversal stack closes a cycle, which
    /// covers self-loops as well as direct and indirect cycles. Out-of-bounds edges are
    /// skipped; callers check `indices_in_bounds` first.
    pub fn has_cycle(&self) -> bool {
        let count = self.len();
        let mut marks = vec![Mark::Unvisited; count];

        for root in 0..count {
            if marks[root] != Mark::Unvisited {
                continue;
            }

            // (node, index of the next edge to follow)
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            marks[root] = Mark::OnStack;

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                match self.edges[node].get(frame.1).copied() {
                    Some(dep) => {
                        frame.1 += 1;
                        if dep >= count {
                            continue;
                        }
                        match marks[dep] {
                            Mark::OnStack => return true,
                            Mark::Unvisited => {
                                marks[dep] = Mark::OnStack;
                                stack.push((dep, 0));
                            }
                            Mark::Done => {}
                        }
                    }
                    None => {
                        marks[node] = Mark::Done;
                        stack.pop();
                    }
                }
            }
        }

        false
    }
}
