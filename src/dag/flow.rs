//! FlowGraph - DAG structure built from task dependencies
//!
//! - Arc<str> for zero-cost cloning of task IDs
//! - FxHashMap for faster hashing
//! - SmallVec for stack-allocated small dependency lists (0-4 items)
//!
//! Construction rejects empty pipelines, malformed or duplicate ids and
//! unknown dependencies. Cycles are found with a three-color DFS; the
//! execution order is Kahn's algorithm with declaration order as tie-break.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::binding::validate_task_id;
use crate::error::{PlotlineError, Result};
use crate::task::TaskSpec;

/// Stack-allocated deps: most tasks have 0-4 dependencies
pub type DepVec = SmallVec<[Arc<str>; 4]>;

/// Graph of task dependencies
///
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct FlowGraph {
    /// task_id -> successor task_ids
    adjacency: FxHashMap<Arc<str>, DepVec>,
    /// task_id -> predecessor task_ids, in declared order
    predecessors: FxHashMap<Arc<str>, DepVec>,
    /// All task IDs in declaration order
    task_ids: Vec<Arc<str>>,
    /// task_id -> declaration index
    positions: FxHashMap<Arc<str>, usize>,
}

impl FlowGraph {
    /// Build the graph, checking ids and dependency targets
    pub fn from_tasks(tasks: &[TaskSpec]) -> Result<Self> {
        if tasks.is_empty() {
            return Err(PlotlineError::EmptyPipeline);
        }

        let capacity = tasks.len();
        let mut adjacency: FxHashMap<Arc<str>, DepVec> =
            FxHashMap::with_capacity_and_hasher(capacity, Default::default());
        let mut predecessors: FxHashMap<Arc<str>, DepVec> =
            FxHashMap::with_capacity_and_hasher(capacity, Default::default());
        let mut task_ids: Vec<Arc<str>> = Vec::with_capacity(capacity);
        let mut positions: FxHashMap<Arc<str>, usize> =
            FxHashMap::with_capacity_and_hasher(capacity, Default::default());

        // One Arc per task, reused for every edge
        for (idx, task) in tasks.iter().enumerate() {
            validate_task_id(task.id())?;
            let id: Arc<str> = Arc::from(task.id());
            if positions.contains_key(&id) {
                return Err(PlotlineError::DuplicateTask {
                    task_id: task.id().to_string(),
                });
            }
            task_ids.push(Arc::clone(&id));
            positions.insert(Arc::clone(&id), idx);
            adjacency.insert(Arc::clone(&id), DepVec::new());
            predecessors.insert(id, DepVec::new());
        }

        for (task, id) in tasks.iter().zip(&task_ids) {
            for dep in task.dependencies() {
                let Some(idx) = positions.get(dep.as_str()) else {
                    return Err(PlotlineError::MissingDependency {
                        task_id: task.id().to_string(),
                        dep_id: dep.clone(),
                    });
                };
                let dep_arc = Arc::clone(&task_ids[*idx]);

                let preds = predecessors.entry(Arc::clone(id)).or_default();
                if preds.contains(&dep_arc) {
                    continue;
                }
                preds.push(Arc::clone(&dep_arc));
                adjacency.entry(dep_arc).or_default().push(Arc::clone(id));
            }
        }

        Ok(Self {
            adjacency,
            predecessors,
            task_ids,
            positions,
        })
    }

    /// Structural checks plus cycle detection
    pub fn validate(tasks: &[TaskSpec]) -> Result<Self> {
        let graph = Self::from_tasks(tasks)?;
        graph.detect_cycles()?;
        Ok(graph)
    }

    /// Get dependencies of a task, in declared order
    #[inline]
    pub fn get_dependencies(&self, task_id: &str) -> &[Arc<str>] {
        static EMPTY: &[Arc<str>] = &[];
        self.predecessors
            .get(task_id)
            .map_or(EMPTY, SmallVec::as_slice)
    }

    /// Get successors of a task
    #[inline]
    pub fn get_successors(&self, task_id: &str) -> &[Arc<str>] {
        static EMPTY: &[Arc<str>] = &[];
        self.adjacency
            .get(task_id)
            .map_or(EMPTY, SmallVec::as_slice)
    }

    /// Find tasks with no successors (final tasks), in declaration order
    pub fn get_final_tasks(&self) -> Vec<Arc<str>> {
        self.task_ids
            .iter()
            .filter(|id| {
                self.adjacency
                    .get(id.as_ref())
                    .is_none_or(SmallVec::is_empty)
            })
            .cloned()
            .collect()
    }

    #[inline]
    pub fn contains(&self, task_id: &str) -> bool {
        self.positions.contains_key(task_id)
    }

    pub fn task_ids(&self) -> &[Arc<str>] {
        &self.task_ids
    }

    /// Check if there's a path from `from` to `to` (BFS)
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }

        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut queue: VecDeque<&str> = VecDeque::new();

        queue.push_back(from);
        visited.insert(from);

        while let Some(current) = queue.pop_front() {
            for neighbor in self.get_successors(current) {
                if neighbor.as_ref() == to {
                    return true;
                }
                if visited.insert(neighbor.as_ref()) {
                    queue.push_back(neighbor.as_ref());
                }
            }
        }

        false
    }

    /// Detect cycles using DFS with three-color marking.
    ///
    /// - White: unvisited
    /// - Gray: on the current DFS path
    /// - Black: fully processed
    ///
    /// Reaching a Gray node closes a cycle, reported as `a → b → a`.
    pub fn detect_cycles(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        fn dfs<'g>(
            node: &'g Arc<str>,
            adjacency: &'g FxHashMap<Arc<str>, DepVec>,
            colors: &mut FxHashMap<&'g str, Color>,
            stack: &mut Vec<&'g str>,
        ) -> std::result::Result<(), String> {
            colors.insert(node.as_ref(), Color::Gray);
            stack.push(node.as_ref());

            if let Some(neighbors) = adjacency.get(node) {
                for neighbor in neighbors {
                    match colors.get(neighbor.as_ref()) {
                        Some(Color::Gray) => {
                            let start = stack
                                .iter()
                                .position(|id| *id == neighbor.as_ref())
                                .unwrap_or(0);
                            return Err(format!("{} → {}", stack[start..].join(" → "), neighbor));
                        }
                        Some(Color::White) | None => dfs(neighbor, adjacency, colors, stack)?,
                        Some(Color::Black) => {}
                    }
                }
            }

            stack.pop();
            colors.insert(node.as_ref(), Color::Black);
            Ok(())
        }

        let mut colors: FxHashMap<&str, Color> = self
            .task_ids
            .iter()
            .map(|id| (id.as_ref(), Color::White))
            .collect();
        let mut stack: Vec<&str> = Vec::new();

        for task_id in &self.task_ids {
            if colors.get(task_id.as_ref()) == Some(&Color::White) {
                dfs(task_id, &self.adjacency, &mut colors, &mut stack)
                    .map_err(|cycle| PlotlineError::GraphCycle { cycle })?;
            }
        }

        Ok(())
    }

    /// Topological order (Kahn); among ready tasks the earliest declared runs first
    pub fn execution_order(&self) -> Result<Vec<Arc<str>>> {
        let mut in_degree: Vec<usize> = self
            .task_ids
            .iter()
            .map(|id| self.get_dependencies(id).len())
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, deg)| **deg == 0)
            .map(|(idx, _)| Reverse(idx))
            .collect();

        let mut order = Vec::with_capacity(self.task_ids.len());
        while let Some(Reverse(idx)) = ready.pop() {
            let id = &self.task_ids[idx];
            order.push(Arc::clone(id));

            for succ in self.get_successors(id) {
                let succ_idx = self.positions[succ];
                in_degree[succ_idx] -= 1;
                if in_degree[succ_idx] == 0 {
                    ready.push(Reverse(succ_idx));
                }
            }
        }

        if order.len() < self.task_ids.len() {
            // Leftover tasks sit on a cycle; name it
            self.detect_cycles()?;
            return Err(PlotlineError::GraphCycle {
                cycle: "unresolved dependencies".to_string(),
            });
        }

        Ok(order)
    }
}
