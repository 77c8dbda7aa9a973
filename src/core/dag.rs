//! Task dependency graph.
//!
//! Builds a petgraph `DiGraph` over a snapshot of tasks, borrowing them from
//! the caller. Edges point from a dependency to the task that needs it, so
//! "incoming" neighbours are prerequisites and "outgoing" neighbours are
//! dependents. Construction rejects cycles, which makes every other query
//! safe to run without loop guards.

use crate::core::task::{Task, TaskId};
use crate::error::{Error, Result};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// A dependency reference that points outside the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingDependency {
    /// The task carrying the reference.
    pub task: TaskId,
    /// The id it depends on, which is not in the snapshot.
    pub missing: TaskId,
}

/// Acyclic dependency graph over a borrowed task snapshot.
pub struct DependencyGraph<'a> {
    graph: DiGraph<&'a Task, ()>,
    task_index: HashMap<TaskId, NodeIndex>,
    order: Vec<NodeIndex>,
    /// Index of each node within `order`.
    position: HashMap<NodeIndex, usize>,
    dangling: Vec<DanglingDependency>,
}

impl<'a> DependencyGraph<'a> {
    /// Build the graph for a snapshot.
    ///
    /// References to ids outside the snapshot are recorded as dangling rather
    /// than rejected, since the caller may pass a partial view of a project.
    ///
    /// # Errors
    /// Returns `InvalidInput` if two tasks share an id or the dependencies
    /// form a cycle (self-dependencies included).
    pub fn build(tasks: &'a [Task]) -> Result<Self> {
        let mut graph = DiGraph::with_capacity(tasks.len(), tasks.len());
        let mut task_index = HashMap::with_capacity(tasks.len());

        for task in tasks {
            let index = graph.add_node(task);
            if task_index.insert(task.id, index).is_some() {
                return Err(Error::invalid(format!(
                    "duplicate task id {} in snapshot",
                    task.id
                )));
            }
        }

        let mut dangling = Vec::new();
        for task in tasks {
            let to = task_index[&task.id];
            for dep in &task.depends_on {
                match task_index.get(dep) {
                    Some(&from) => {
                        graph.add_edge(from, to, ());
                    }
                    None => dangling.push(DanglingDependency {
                        task: task.id,
                        missing: *dep,
                    }),
                }
            }
        }

        // toposort walks iteratively and reports the first node it finds on a
        // cycle, so a cyclic snapshot fails here instead of looping later.
        let order = toposort(&graph, None).map_err(|cycle| {
            let title = graph
                .node_weight(cycle.node_id())
                .map(|t| t.title.as_str())
                .unwrap_or("unknown");
            Error::invalid(format!("dependency cycle detected at task '{}'", title))
        })?;
        let position = order.iter().enumerate().map(|(i, &n)| (n, i)).collect();

        Ok(Self {
            graph,
            task_index,
            order,
            position,
            dangling,
        })
    }

    /// Get a task by its ID.
    pub fn get_task(&self, id: &TaskId) -> Option<&'a Task> {
        self.task_index
            .get(id)
            .and_then(|&index| self.graph.node_weight(index).copied())
    }

    /// Get the number of tasks in the graph.
    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of resolved dependency edges.
    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Edge count relative to the maximum an acyclic graph of this size can hold.
    ///
    /// Returns 0.0 for graphs with fewer than two tasks.
    pub fn density(&self) -> f64 {
        let n = self.task_count();
        if n < 2 {
            return 0.0;
        }
        let max_edges = (n * (n - 1) / 2) as f64;
        (self.dependency_count() as f64 / max_edges).min(1.0)
    }

    /// Tasks the given task depends on (predecessors).
    pub fn dependencies(&self, id: &TaskId) -> Vec<&'a Task> {
        self.neighbours(id, Direction::Incoming)
    }

    /// Tasks that depend on the given task (successors).
    pub fn dependents(&self, id: &TaskId) -> Vec<&'a Task> {
        self.neighbours(id, Direction::Outgoing)
    }

    fn neighbours(&self, id: &TaskId, direction: Direction) -> Vec<&'a Task> {
        match self.task_index.get(id) {
            Some(&index) => {
                let mut nodes: Vec<NodeIndex> =
                    self.graph.neighbors_directed(index, direction).collect();
                // petgraph yields neighbours in reverse insertion order
                nodes.sort_by_key(|n| self.position.get(n).copied().unwrap_or(usize::MAX));
                nodes
                    .into_iter()
                    .filter_map(|n| self.graph.node_weight(n).copied())
                    .collect()
            }
            None => Vec::new(),
        }
    }

    /// Whether a task is not done and waits on at least one undone dependency.
    ///
    /// Dangling references do not block: the snapshot cannot say anything
    /// about tasks it does not contain.
    pub fn is_blocked(&self, id: &TaskId) -> bool {
        match self.get_task(id) {
            Some(task) if !task.is_done() => self.dependencies(id).iter().any(|d| !d.is_done()),
            _ => false,
        }
    }

    /// Dependents of a task that are not yet done.
    pub fn undone_dependents(&self, id: &TaskId) -> Vec<&'a Task> {
        self.dependents(id)
            .into_iter()
            .filter(|t| !t.is_done())
            .collect()
    }

    /// Tasks that are not done and have every dependency satisfied.
    pub fn ready_tasks(&self) -> Vec<&'a Task> {
        self.topological_order()
            .into_iter()
            .filter(|t| !t.is_done() && !self.is_blocked(&t.id))
            .collect()
    }

    /// Tasks ordered so every task comes after its dependencies.
    pub fn topological_order(&self) -> Vec<&'a Task> {
        self.order
            .iter()
            .filter_map(|&index| self.graph.node_weight(index).copied())
            .collect()
    }

    /// References to tasks outside the snapshot.
    pub fn dangling(&self) -> &[DanglingDependency] {
        &self.dangling
    }
}

impl std::fmt::Debug for DependencyGraph<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("tasks", &self.task_count())
            .field("dependencies", &self.dependency_count())
            .field("dangling", &self.dangling.len())
            .finish()
    }
}

/// Check that every dependency in `batch` resolves to a task in the batch or
/// to one of the `known` ids.
///
/// # Errors
/// Returns `InvalidInput` naming the first unresolved reference.
pub fn check_references(batch: &[Task], known: &HashSet<TaskId>) -> Result<()> {
    let batch_ids: HashSet<TaskId> = batch.iter().map(|t| t.id).collect();
    for task in batch {
        if let Some(missing) = task
            .depends_on
            .iter()
            .find(|dep| !batch_ids.contains(dep) && !known.contains(dep))
        {
            return Err(Error::invalid(format!(
                "task '{}' depends on unknown task {}",
                task.title, missing
            )));
        }
    }
    Ok(())
}
