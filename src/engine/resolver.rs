//! Assignee resolution.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! 1. effort above the user threshold, or a judgment marker → `User`
//! 2. a code-generation marker, or a code-shaped domain, with
//!    low-to-moderate effort → `AI IDE Agent`
//! 3. anything else → `Archon`
//!
//! The last rule is unconditional, so resolution is total.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::{AssigneeType, Domain, Effort, Task};
use crate::engine::keywords::KeywordSet;
use crate::error::Result;

const JUDGMENT_MARKERS: &[&str] = &[
    "decide",
    "decision",
    "design",
    "design review",
    "approve",
    "approval",
    "sign off",
    "requirements",
    "strategy",
    "stakeholder",
    "trade-off",
    "prioritize",
];

const CODEGEN_MARKERS: &[&str] = &[
    "implement",
    "endpoint",
    "schema",
    "function",
    "migration",
    "middleware",
    "component",
    "module",
    "refactor",
    "code",
    "validation",
    "routing",
    "test",
    "crud",
];

/// Tunable resolver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverPolicy {
    /// Effort strictly above this goes to a human.
    pub user_effort_threshold: Effort,
    /// Highest effort an AI IDE agent takes on.
    pub codegen_max_effort: Effort,
    pub judgment_markers: Vec<String>,
    pub codegen_markers: Vec<String>,
    /// Domains whose work counts as code generation even without a marker.
    pub codegen_domains: Vec<Domain>,
}

impl Default for ResolverPolicy {
    fn default() -> Self {
        Self {
            user_effort_threshold: Effort::Medium,
            codegen_max_effort: Effort::Medium,
            judgment_markers: JUDGMENT_MARKERS.iter().map(|s| s.to_string()).collect(),
            codegen_markers: CODEGEN_MARKERS.iter().map(|s| s.to_string()).collect(),
            codegen_domains: vec![Domain::Api, Domain::Frontend, Domain::Database],
        }
    }
}

/// Which rule produced an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "rule", content = "marker", rename_all = "snake_case")]
pub enum AssignmentRule {
    HighEffort,
    JudgmentMarker(String),
    CodeGeneration(String),
    CodeDomain(Domain),
    Default,
}

impl std::fmt::Display for AssignmentRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentRule::HighEffort => write!(f, "effort above threshold"),
            AssignmentRule::JudgmentMarker(m) => write!(f, "judgment marker '{}'", m),
            AssignmentRule::CodeGeneration(m) => write!(f, "code-generation marker '{}'", m),
            AssignmentRule::CodeDomain(d) => write!(f, "code-shaped domain '{}'", d),
            AssignmentRule::Default => write!(f, "routine work"),
        }
    }
}

/// A resolved assignee together with the rule that chose it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Assignment {
    pub assignee: AssigneeType,
    pub rule: AssignmentRule,
}

#[derive(Debug, Clone)]
pub struct AssigneeResolver {
    user_effort_threshold: Effort,
    codegen_max_effort: Effort,
    judgment: KeywordSet,
    codegen: KeywordSet,
    codegen_domains: Vec<Domain>,
}

impl AssigneeResolver {
    pub fn from_policy(policy: &ResolverPolicy) -> Result<Self> {
        Ok(Self {
            user_effort_threshold: policy.user_effort_threshold,
            codegen_max_effort: policy.codegen_max_effort,
            judgment: KeywordSet::new(policy.judgment_markers.as_slice())?,
            codegen: KeywordSet::new(policy.codegen_markers.as_slice())?,
            codegen_domains: policy.codegen_domains.clone(),
        })
    }

    pub fn resolve(&self, task: &Task) -> AssigneeType {
        self.explain(task).assignee
    }

    /// Resolve and report the deciding rule.
    pub fn explain(&self, task: &Task) -> Assignment {
        let text = task.searchable_text();

        if task.estimated_effort > self.user_effort_threshold {
            return Assignment {
                assignee: AssigneeType::User,
                rule: AssignmentRule::HighEffort,
            };
        }
        if let Some(marker) = self.judgment.first_match(&text) {
            return Assignment {
                assignee: AssigneeType::User,
                rule: AssignmentRule::JudgmentMarker(marker),
            };
        }
        if task.estimated_effort <= self.codegen_max_effort {
            if let Some(marker) = self.codegen.first_match(&text) {
                return Assignment {
                    assignee: AssigneeType::AiIdeAgent,
                    rule: AssignmentRule::CodeGeneration(marker),
                };
            }
            if self.codegen_domains.contains(&task.domain) {
                return Assignment {
                    assignee: AssigneeType::AiIdeAgent,
                    rule: AssignmentRule::CodeDomain(task.domain),
                };
            }
        }
        Assignment {
            assignee: AssigneeType::Archon,
            rule: AssignmentRule::Default,
        }
    }
}
