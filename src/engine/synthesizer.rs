//! Task synthesis from domain templates.
//!
//! A template expands into a linear chain: every step depends on the step
//! before it and nothing else. Steps that already exist in the project are
//! not re-created; the chain continues through the existing task's id.

use std::collections::{BTreeSet, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::{check_references, Domain, Task, TaskId};
use crate::engine::resolver::AssigneeResolver;
use crate::engine::templates::{BreakdownKind, TaskSkeleton, TemplateTable};
use crate::error::{Error, Result};

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "for", "of", "to", "with", "in", "on", "up", "into", "from",
    "by", "new",
];

/// Tunable synthesizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerPolicy {
    /// Jaccard similarity of normalized titles at which two tasks count as
    /// the same task.
    pub similarity_threshold: f64,
    /// Longest subject substituted into `{subject}` placeholders.
    pub subject_max_chars: usize,
}

impl Default for SynthesizerPolicy {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.75,
            subject_max_chars: 60,
        }
    }
}

impl SynthesizerPolicy {
    pub fn validate(&self) -> Result<()> {
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(Error::PolicyLoad(format!(
                "similarity_threshold must be in (0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if self.subject_max_chars == 0 {
            return Err(Error::PolicyLoad("subject_max_chars must be positive".into()));
        }
        Ok(())
    }
}

/// A template step satisfied by a task the project already has.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReusedTask {
    /// Title the template would have produced.
    pub template_title: String,
    pub existing_id: TaskId,
    pub existing_title: String,
    pub similarity: f64,
}

/// Result of expanding one template.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Synthesis {
    pub domain: Domain,
    /// Set when the tasks came from a single-task breakdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<BreakdownKind>,
    /// New tasks in template order.
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reused: Vec<ReusedTask>,
}

#[derive(Debug, Clone)]
pub struct TaskSynthesizer {
    policy: SynthesizerPolicy,
    templates: TemplateTable,
}

impl TaskSynthesizer {
    pub fn new(policy: SynthesizerPolicy, templates: TemplateTable) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy, templates })
    }

    pub fn templates(&self) -> &TemplateTable {
        &self.templates
    }

    /// Expand the domain template for a project description.
    ///
    /// # Errors
    /// `InvalidInput` when the description is blank.
    pub fn synthesize(
        &self,
        description: &str,
        domain: Domain,
        existing: &[Task],
        resolver: &AssigneeResolver,
    ) -> Result<Synthesis> {
        if description.trim().is_empty() {
            return Err(Error::invalid("description must not be empty"));
        }
        let subject = summarize(description, self.policy.subject_max_chars);
        let steps = self.templates.for_domain(domain);
        let (tasks, reused) = self.expand(steps, &subject, domain, existing, resolver)?;

        tracing::info!(
            %domain,
            created = tasks.len(),
            reused = reused.len(),
            "synthesized tasks"
        );
        Ok(Synthesis {
            domain,
            breakdown: None,
            tasks,
            reused,
        })
    }

    /// Break one task into sub-tasks. Sub-task titles embed the parent title.
    ///
    /// # Errors
    /// `InvalidInput` when the title is blank.
    pub fn break_down(
        &self,
        title: &str,
        description: &str,
        domain: Domain,
        existing: &[Task],
        resolver: &AssigneeResolver,
    ) -> Result<Synthesis> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::invalid("task title must not be empty"));
        }
        let kind = self
            .templates
            .breakdown_kind(&format!("{} {}", title, description));
        let subject = summarize(title, self.policy.subject_max_chars);
        let steps = self.templates.breakdown(kind);
        let (tasks, reused) = self.expand(steps, &subject, domain, existing, resolver)?;

        tracing::info!(%kind, %domain, created = tasks.len(), "broke down task");
        Ok(Synthesis {
            domain,
            breakdown: Some(kind),
            tasks,
            reused,
        })
    }

    fn expand(
        &self,
        steps: &[TaskSkeleton],
        subject: &str,
        domain: Domain,
        existing: &[Task],
        resolver: &AssigneeResolver,
    ) -> Result<(Vec<Task>, Vec<ReusedTask>)> {
        let existing_tokens: Vec<BTreeSet<String>> =
            existing.iter().map(|t| title_tokens(&t.title)).collect();

        let mut tasks = Vec::with_capacity(steps.len());
        let mut reused = Vec::new();
        let mut previous: Option<TaskId> = None;

        for step in steps {
            let (title, description) = step.render(subject);

            if let Some((idx, similarity)) = self.best_match(&title, &existing_tokens) {
                let found = &existing[idx];
                tracing::debug!(template = %title, existing = %found.title, similarity, "reusing existing task");
                reused.push(ReusedTask {
                    template_title: title,
                    existing_id: found.id,
                    existing_title: found.title.clone(),
                    similarity,
                });
                previous = Some(found.id);
                continue;
            }

            let mut task = Task::new(&title, &description)
                .with_domain(domain)
                .with_effort(step.effort);
            task.feature = step.feature.clone();
            task.task_order = step.task_order;
            if let Some(prev) = previous {
                task = task.with_dependency(prev);
            }
            task.assignee = resolver.resolve(&task);
            previous = Some(task.id);
            tasks.push(task);
        }

        let known: HashSet<TaskId> = existing.iter().map(|t| t.id).collect();
        check_references(&tasks, &known)?;
        Ok((tasks, reused))
    }

    /// Most similar existing title at or above the threshold. Earlier tasks
    /// win ties.
    fn best_match(&self, title: &str, existing: &[BTreeSet<String>]) -> Option<(usize, f64)> {
        let tokens = title_tokens(title);
        let mut best: Option<(usize, f64)> = None;
        for (idx, other) in existing.iter().enumerate() {
            let score = jaccard(&tokens, other);
            if score < self.policy.similarity_threshold {
                continue;
            }
            match best {
                Some((_, s)) if s >= score => {}
                _ => best = Some((idx, score)),
            }
        }
        best
    }
}

/// Collapse whitespace, trim trailing punctuation and cut to `max_chars`
/// on a word boundary where possible.
pub fn summarize(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_end_matches(['.', '!', '?', ',', ';', ':']);
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(pos) if pos > 0 => cut[..pos].trim_end_matches([',', ';', ':']).to_string(),
        _ => cut,
    }
}

/// Normalized token set of a title, used for duplicate detection.
pub fn title_tokens(title: &str) -> BTreeSet<String> {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOPWORDS.contains(w))
        .map(canonical_word)
        .collect()
}

fn canonical_word(word: &str) -> String {
    let singular = singularize(word);
    match singular.as_str() {
        "authentication" | "authorization" | "authn" | "authz" => "auth".to_string(),
        "db" => "database".to_string(),
        "doc" | "docs" => "documentation".to_string(),
        "testing" => "test".to_string(),
        "ui" => "frontend".to_string(),
        _ => singular,
    }
}

fn singularize(word: &str) -> String {
    if word.len() > 4 && word.ends_with("ies") {
        format!("{}y", &word[..word.len() - 3])
    } else if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Jaccard similarity of two token sets. Two empty sets are not similar.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
