//! Project health analysis.
//!
//! The score is a clamped linear combination of structural fractions of the
//! snapshot. `w_done >= w_active` keeps the score from dropping when a task
//! moves to done; blocked and stale fractions only ever subtract.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::{AssigneeType, DependencyGraph, Task, TaskStatus};
use crate::engine::resolver::AssigneeResolver;
use crate::error::{Error, Result};

/// Maximum number of concrete "next up" tasks listed in next actions.
const NEXT_UP_LIMIT: usize = 3;

/// Tunable scoring weights and recommendation thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerPolicy {
    pub base: f64,
    pub w_done: f64,
    pub w_active: f64,
    pub w_blocked: f64,
    pub w_stale: f64,
    pub w_density: f64,
    /// Undone direct dependents a task needs before it is called out as a blocker.
    pub blocker_fanout: usize,
    pub low_health_threshold: u8,
    /// Todo tasks per doing task above which capacity is flagged.
    pub todo_to_doing_ratio: usize,
    /// User tasks per AI IDE Agent task above which automation is suggested.
    pub user_to_agent_ratio: usize,
    /// Review count above which the review queue is flagged.
    pub review_backlog: usize,
}

impl Default for AnalyzerPolicy {
    fn default() -> Self {
        Self {
            base: 0.5,
            w_done: 0.5,
            w_active: 0.2,
            w_blocked: 0.3,
            w_stale: 0.1,
            w_density: 0.1,
            blocker_fanout: 2,
            low_health_threshold: 50,
            todo_to_doing_ratio: 3,
            user_to_agent_ratio: 2,
            review_backlog: 3,
        }
    }
}

impl AnalyzerPolicy {
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("base", self.base),
            ("w_done", self.w_done),
            ("w_active", self.w_active),
            ("w_blocked", self.w_blocked),
            ("w_stale", self.w_stale),
            ("w_density", self.w_density),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::PolicyLoad(format!(
                    "analyzer weight {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.base > 1.0 {
            return Err(Error::PolicyLoad(format!(
                "analyzer base must be at most 1.0, got {}",
                self.base
            )));
        }
        if self.w_done < self.w_active {
            return Err(Error::PolicyLoad(format!(
                "analyzer w_done ({}) must be at least w_active ({})",
                self.w_done, self.w_active
            )));
        }
        if self.blocker_fanout == 0 {
            return Err(Error::PolicyLoad("blocker_fanout must be positive".into()));
        }
        if self.low_health_threshold > 100 {
            return Err(Error::PolicyLoad(format!(
                "low_health_threshold must be at most 100, got {}",
                self.low_health_threshold
            )));
        }
        Ok(())
    }
}

/// Task counts per status and per carried assignee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StatusBreakdown {
    pub todo: usize,
    pub doing: usize,
    pub review: usize,
    pub done: usize,
    pub user: usize,
    pub ai_ide_agent: usize,
    pub archon: usize,
}

impl StatusBreakdown {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut breakdown = Self::default();
        for task in tasks {
            match task.status {
                TaskStatus::Todo => breakdown.todo += 1,
                TaskStatus::Doing => breakdown.doing += 1,
                TaskStatus::Review => breakdown.review += 1,
                TaskStatus::Done => breakdown.done += 1,
            }
            match task.assignee {
                AssigneeType::User => breakdown.user += 1,
                AssigneeType::AiIdeAgent => breakdown.ai_ide_agent += 1,
                AssigneeType::Archon => breakdown.archon += 1,
            }
        }
        breakdown
    }

    pub fn total(&self) -> usize {
        self.todo + self.doing + self.review + self.done
    }
}

/// Structural inputs to the score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HealthMetrics {
    pub total: usize,
    pub blocked: usize,
    pub stale: usize,
    pub active: usize,
    pub dangling_references: usize,
    pub done_fraction: f64,
    pub active_fraction: f64,
    pub blocked_fraction: f64,
    pub stale_fraction: f64,
    pub density: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthReport {
    /// 0 to 100, higher is healthier.
    pub health_score: u8,
    /// Most pressing first.
    pub recommendations: Vec<String>,
    pub insights: Vec<String>,
    pub next_actions: Vec<String>,
    pub breakdown: StatusBreakdown,
    pub metrics: HealthMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug)]
struct Recommendation {
    severity: Severity,
    /// Relative size within a severity, in [0, 1].
    weight: f64,
    message: String,
}

#[derive(Debug, Clone)]
pub struct ProgressAnalyzer {
    policy: AnalyzerPolicy,
}

impl ProgressAnalyzer {
    pub fn new(policy: AnalyzerPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// Score a snapshot and derive recommendations.
    ///
    /// The resolver is consulted only to decide whether any task would be
    /// eligible for Archon.
    ///
    /// # Errors
    /// `InvalidInput` when the snapshot has a dependency cycle or duplicate ids.
    pub fn analyze(&self, tasks: &[Task], resolver: &AssigneeResolver) -> Result<HealthReport> {
        if tasks.is_empty() {
            return Ok(HealthReport {
                health_score: 100,
                recommendations: Vec::new(),
                insights: vec!["No tasks in project".to_string()],
                next_actions: vec!["Create initial project tasks".to_string()],
                breakdown: StatusBreakdown::default(),
                metrics: HealthMetrics::default(),
            });
        }

        let graph = DependencyGraph::build(tasks)?;
        let breakdown = StatusBreakdown::from_tasks(tasks);
        let metrics = self.metrics(tasks, &graph, &breakdown);
        let health_score = self.score(&metrics);

        let recommendations = self.recommendations(tasks, &graph, &breakdown, &metrics, health_score, resolver);
        let insights = insights(&breakdown, &metrics);
        let next_actions = next_actions(&graph, &breakdown, &metrics);

        tracing::info!(
            tasks = metrics.total,
            health_score,
            blocked = metrics.blocked,
            recommendations = recommendations.len(),
            "analyzed project"
        );

        Ok(HealthReport {
            health_score,
            recommendations,
            insights,
            next_actions,
            breakdown,
            metrics,
        })
    }

    fn metrics(
        &self,
        tasks: &[Task],
        graph: &DependencyGraph<'_>,
        breakdown: &StatusBreakdown,
    ) -> HealthMetrics {
        let total = tasks.len();
        let mut blocked = 0;
        let mut stale = 0;
        let mut active = 0;
        for task in tasks {
            let is_blocked = graph.is_blocked(&task.id);
            if is_blocked {
                blocked += 1;
            }
            match task.status {
                TaskStatus::Doing if is_blocked => stale += 1,
                TaskStatus::Doing | TaskStatus::Review if !is_blocked => active += 1,
                _ => {}
            }
        }

        let fraction = |count: usize| count as f64 / total as f64;
        HealthMetrics {
            total,
            blocked,
            stale,
            active,
            dangling_references: graph.dangling().len(),
            done_fraction: fraction(breakdown.done),
            active_fraction: fraction(active),
            blocked_fraction: fraction(blocked),
            stale_fraction: fraction(stale),
            density: graph.density(),
        }
    }

    /// Weighted score mapped into [0, 100].
    pub fn score(&self, metrics: &HealthMetrics) -> u8 {
        let p = &self.policy;
        let raw = p.base + p.w_done * metrics.done_fraction + p.w_active * metrics.active_fraction
            - p.w_blocked * metrics.blocked_fraction
            - p.w_stale * metrics.stale_fraction
            - p.w_density * metrics.density;
        (raw.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    fn recommendations(
        &self,
        tasks: &[Task],
        graph: &DependencyGraph<'_>,
        breakdown: &StatusBreakdown,
        metrics: &HealthMetrics,
        health_score: u8,
        resolver: &AssigneeResolver,
    ) -> Vec<String> {
        let p = &self.policy;
        let total = metrics.total as f64;
        let mut recs: Vec<Recommendation> = Vec::new();

        for task in graph.topological_order() {
            if task.is_done() {
                continue;
            }
            let waiting = graph.undone_dependents(&task.id).len();
            if waiting >= p.blocker_fanout {
                recs.push(Recommendation {
                    severity: Severity::High,
                    weight: waiting as f64 / total,
                    message: format!(
                        "{} tasks blocked on task '{}' ({}) - prioritize completion",
                        waiting,
                        task.title,
                        task.id.short()
                    ),
                });
            }
        }

        if health_score < p.low_health_threshold {
            recs.push(Recommendation {
                severity: Severity::High,
                weight: f64::from(p.low_health_threshold - health_score) / 100.0,
                message: format!(
                    "Health below {} - review assignment distribution",
                    p.low_health_threshold
                ),
            });
        }

        if metrics.stale > 0 {
            recs.push(Recommendation {
                severity: Severity::Medium,
                weight: metrics.stale_fraction,
                message: format!(
                    "{} in-progress tasks are waiting on unfinished dependencies - finish the dependencies or move them back to todo",
                    metrics.stale
                ),
            });
        }

        if breakdown.review > p.review_backlog {
            recs.push(Recommendation {
                severity: Severity::Medium,
                weight: breakdown.review as f64 / total,
                message: "Focus on completing reviews to unblock progress".to_string(),
            });
        }

        if breakdown.archon == 0 {
            let eligible = tasks
                .iter()
                .filter(|t| !t.is_done() && resolver.resolve(t) == AssigneeType::Archon)
                .count();
            if eligible > 0 {
                recs.push(Recommendation {
                    severity: Severity::Low,
                    weight: eligible as f64 / total,
                    message: "No tasks assigned to Archon - consider automating routine work"
                        .to_string(),
                });
            }
        }

        if breakdown.todo > breakdown.doing * p.todo_to_doing_ratio {
            recs.push(Recommendation {
                severity: Severity::Low,
                weight: breakdown.todo as f64 / total,
                message: "Consider breaking down large tasks or increasing capacity".to_string(),
            });
        }

        if breakdown.user > breakdown.ai_ide_agent * p.user_to_agent_ratio {
            recs.push(Recommendation {
                severity: Severity::Low,
                weight: breakdown.user as f64 / total,
                message: "More tasks could be automated with AI IDE Agent".to_string(),
            });
        }

        if metrics.dangling_references > 0 {
            recs.push(Recommendation {
                severity: Severity::Low,
                weight: metrics.dangling_references as f64 / total,
                message: format!(
                    "{} dependency references point to tasks outside this project snapshot",
                    metrics.dangling_references
                ),
            });
        }

        // Stable sort keeps generation order among equals.
        recs.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| b.weight.total_cmp(&a.weight))
        });
        recs.into_iter().map(|r| r.message).collect()
    }
}

fn insights(breakdown: &StatusBreakdown, metrics: &HealthMetrics) -> Vec<String> {
    let mut insights = Vec::new();
    if metrics.done_fraction > 0.8 {
        insights.push("Project is near completion".to_string());
    } else if metrics.done_fraction > 0.5 {
        insights.push("Good progress - over half the tasks completed".to_string());
    } else if metrics.active_fraction > 0.3 {
        insights.push("Active development - many tasks in progress".to_string());
    } else {
        insights.push("Project may need attention - low activity".to_string());
    }

    if breakdown.review > breakdown.doing {
        insights.push("Many tasks in review - consider prioritizing reviews".to_string());
    }
    if metrics.blocked > 0 {
        insights.push(format!(
            "{} of {} tasks are blocked by unfinished dependencies",
            metrics.blocked, metrics.total
        ));
    }
    insights
}

fn next_actions(
    graph: &DependencyGraph<'_>,
    breakdown: &StatusBreakdown,
    metrics: &HealthMetrics,
) -> Vec<String> {
    let mut actions = Vec::new();
    if breakdown.todo > 0 {
        actions.push(format!("Start working on {} pending tasks", breakdown.todo));
    }

    let mut ready: Vec<&Task> = graph
        .ready_tasks()
        .into_iter()
        .filter(|t| t.status == TaskStatus::Todo)
        .collect();
    // Higher priority first; topological order breaks ties.
    ready.sort_by(|a, b| b.task_order.cmp(&a.task_order));
    for task in ready.into_iter().take(NEXT_UP_LIMIT) {
        actions.push(format!("Next up: '{}' ({})", task.title, task.assignee));
    }

    if breakdown.review > 0 {
        actions.push(format!("Review {} tasks awaiting review", breakdown.review));
    }
    if metrics.done_fraction > 0.8 {
        actions.push("Plan project completion and release tasks".to_string());
    }
    actions
}
