//! Task templates as data.
//!
//! Each domain maps to an ordered list of [`TaskSkeleton`]s. Adding a domain
//! or changing a breakdown is a table edit, either here or through the
//! `[templates]` section of the config file.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::{Domain, Effort};
use crate::engine::keywords::KeywordSet;
use crate::error::{Error, Result};

/// Placeholder replaced with the subject when a skeleton is rendered.
pub const SUBJECT_PLACEHOLDER: &str = "{subject}";

/// Number of steps the generic template must have.
pub const GENERIC_STEPS: usize = 4;

/// One canonical step of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaskSkeleton {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub effort: Effort,
    #[serde(default)]
    pub feature: String,
    #[serde(default)]
    pub task_order: u8,
}

impl TaskSkeleton {
    fn builtin(
        title: &str,
        description: &str,
        effort: Effort,
        feature: &str,
        task_order: u8,
    ) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            effort,
            feature: feature.to_string(),
            task_order,
        }
    }

    /// Title and description with `{subject}` substituted.
    pub fn render(&self, subject: &str) -> (String, String) {
        (
            self.title.replace(SUBJECT_PLACEHOLDER, subject),
            self.description.replace(SUBJECT_PLACEHOLDER, subject),
        )
    }
}

/// Shape of a single-task breakdown.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownKind {
    /// API endpoint work: schema, validation, logic, errors, tests.
    Endpoint,
    /// UI component work: wireframes, structure, interactivity, styling.
    Component,
    /// Anything else: research, implement, test.
    Generic,
}

impl BreakdownKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakdownKind::Endpoint => "endpoint",
            BreakdownKind::Component => "component",
            BreakdownKind::Generic => "generic",
        }
    }
}

impl std::fmt::Display for BreakdownKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn builtin_template(domain: Domain) -> Vec<TaskSkeleton> {
    use Effort::*;
    let s = TaskSkeleton::builtin;
    match domain {
        Domain::Auth => vec![
            s(
                "Design credential schema",
                "Design the user and credential schema for {subject}, covering login, registration and password reset flows",
                Medium,
                "authentication",
                10,
            ),
            s(
                "Implement login endpoint",
                "Implement a secure login endpoint for {subject} with JWT token generation and validation",
                Medium,
                "authentication",
                9,
            ),
            s(
                "Create registration endpoint",
                "Build user registration with email verification and password hashing",
                Medium,
                "authentication",
                8,
            ),
            s(
                "Add session management",
                "Implement session tracking, refresh tokens and logout",
                Medium,
                "authentication",
                7,
            ),
            s(
                "Write auth tests",
                "Write unit and integration tests for the login, registration and session flows",
                Low,
                "testing",
                6,
            ),
        ],
        Domain::Api => vec![
            s(
                "Design API endpoints",
                "Design the resource model and endpoint contracts for {subject}",
                Medium,
                "api",
                10,
            ),
            s(
                "Set up API framework and routing",
                "Initialize the API framework, set up the routing structure and configure middleware",
                Medium,
                "api",
                9,
            ),
            s(
                "Implement CRUD operations",
                "Implement create, read, update and delete handlers for each resource",
                Medium,
                "api",
                8,
            ),
            s(
                "Add input validation",
                "Add request validation and consistent error responses to every endpoint",
                Low,
                "validation",
                7,
            ),
            s(
                "Create API documentation",
                "Publish OpenAPI documentation with request and response examples",
                Low,
                "documentation",
                6,
            ),
        ],
        Domain::Frontend => vec![
            s(
                "Set up frontend framework and build system",
                "Initialize the project with build configuration and a dev environment",
                Low,
                "frontend",
                10,
            ),
            s(
                "Design UI component library",
                "Create reusable UI components and establish a design system for {subject}",
                Medium,
                "frontend",
                9,
            ),
            s(
                "Implement routing",
                "Implement client-side routing between the main views",
                Low,
                "frontend",
                8,
            ),
            s(
                "Add state management",
                "Wire shared application state and data fetching",
                Medium,
                "frontend",
                7,
            ),
            s(
                "Implement responsive layouts",
                "Build responsive layouts for mobile and desktop views",
                Medium,
                "frontend",
                6,
            ),
        ],
        Domain::Database => vec![
            s(
                "Design database schema",
                "Design the database schema for {subject} with relationships, indexes and constraints",
                High,
                "database",
                10,
            ),
            s(
                "Set up database migrations",
                "Implement a migration system for schema versioning",
                Medium,
                "database",
                9,
            ),
            s(
                "Create database access layer",
                "Implement ORM setup and data access patterns",
                Medium,
                "database",
                8,
            ),
            s(
                "Add indexes for hot queries",
                "Profile the main query paths and add supporting indexes",
                Low,
                "performance",
                7,
            ),
            s(
                "Set up backup strategy",
                "Choose a backup strategy and verify restores",
                Medium,
                "operations",
                6,
            ),
        ],
        Domain::Generic => vec![
            s(
                "Analyze requirements",
                "Analyze and document the detailed requirements for {subject}",
                Medium,
                "planning",
                10,
            ),
            s(
                "Implement core functionality",
                "Implement the core functionality for {subject}",
                Medium,
                "implementation",
                9,
            ),
            s(
                "Test and validate",
                "Write tests and validate the implementation of {subject}",
                Low,
                "testing",
                8,
            ),
            s(
                "Write documentation",
                "Document setup, usage and architecture of {subject}",
                Low,
                "documentation",
                7,
            ),
        ],
    }
}

fn builtin_breakdown(kind: BreakdownKind) -> Vec<TaskSkeleton> {
    use Effort::*;
    let s = TaskSkeleton::builtin;
    match kind {
        BreakdownKind::Endpoint => vec![
            s(
                "Design {subject} request/response schema",
                "Define request parameters, response format and data validation rules",
                Medium,
                "api_design",
                9,
            ),
            s(
                "Implement {subject} input validation",
                "Add input validation and sanitization for the endpoint",
                Low,
                "validation",
                8,
            ),
            s(
                "Add {subject} business logic",
                "Implement the core business logic behind the endpoint",
                Medium,
                "business_logic",
                8,
            ),
            s(
                "Create {subject} error handling",
                "Implement error handling with appropriate HTTP status codes",
                Low,
                "error_handling",
                7,
            ),
            s(
                "Write tests for {subject}",
                "Create unit and integration tests for the endpoint",
                Low,
                "testing",
                7,
            ),
        ],
        BreakdownKind::Component => vec![
            s(
                "Design {subject} wireframes",
                "Create wireframes and the visual design for the component",
                Medium,
                "design",
                8,
            ),
            s(
                "Implement {subject} structure",
                "Build the basic component structure and layout",
                Medium,
                "implementation",
                8,
            ),
            s(
                "Add {subject} interactivity",
                "Implement user interactions and event handling",
                Medium,
                "functionality",
                7,
            ),
            s(
                "Style {subject} component",
                "Apply responsive styling and accessibility features",
                Low,
                "styling",
                6,
            ),
        ],
        BreakdownKind::Generic => vec![
            s(
                "Research and plan {subject}",
                "Research requirements and create a detailed plan for {subject}",
                Medium,
                "planning",
                8,
            ),
            s(
                "Implement core {subject} functionality",
                "Build the main functionality for {subject}",
                Medium,
                "implementation",
                7,
            ),
            s(
                "Test and validate {subject}",
                "Create tests and validate the implementation of {subject}",
                Low,
                "testing",
                6,
            ),
        ],
    }
}

fn validate_steps(name: &str, steps: &[TaskSkeleton]) -> Result<()> {
    if steps.is_empty() {
        return Err(Error::PolicyLoad(format!("template '{}' has no steps", name)));
    }
    if let Some(blank) = steps.iter().position(|s| s.title.trim().is_empty()) {
        return Err(Error::PolicyLoad(format!(
            "template '{}' step {} has a blank title",
            name,
            blank + 1
        )));
    }
    Ok(())
}

/// Domain templates and breakdown templates, validated at load.
#[derive(Debug, Clone)]
pub struct TemplateTable {
    domains: BTreeMap<Domain, Vec<TaskSkeleton>>,
    breakdowns: BTreeMap<BreakdownKind, Vec<TaskSkeleton>>,
    api_markers: KeywordSet,
    endpoint_markers: KeywordSet,
    component_markers: KeywordSet,
}

impl TemplateTable {
    /// Built-in templates with no overrides.
    pub fn builtin() -> Result<Self> {
        Self::with_overrides(&BTreeMap::new())
    }

    /// Built-in templates with per-domain replacements from config.
    ///
    /// # Errors
    /// Returns `PolicyLoad` for an unknown domain name, an empty template, a
    /// blank step title, or a generic template that is not exactly
    /// four steps long.
    pub fn with_overrides(overrides: &BTreeMap<String, Vec<TaskSkeleton>>) -> Result<Self> {
        let mut domains: BTreeMap<Domain, Vec<TaskSkeleton>> = Domain::ALL
            .iter()
            .map(|d| (*d, builtin_template(*d)))
            .collect();

        for (name, steps) in overrides {
            let domain: Domain = name
                .parse()
                .map_err(|e: Error| Error::PolicyLoad(format!("templates: {}", e)))?;
            validate_steps(name, steps)?;
            tracing::debug!(%domain, steps = steps.len(), "template override");
            domains.insert(domain, steps.clone());
        }

        let generic_len = domains.get(&Domain::Generic).map(Vec::len).unwrap_or(0);
        if generic_len != GENERIC_STEPS {
            return Err(Error::PolicyLoad(format!(
                "generic template must have exactly {} steps, found {}",
                GENERIC_STEPS, generic_len
            )));
        }

        let breakdowns = [
            BreakdownKind::Endpoint,
            BreakdownKind::Component,
            BreakdownKind::Generic,
        ]
        .into_iter()
        .map(|k| (k, builtin_breakdown(k)))
        .collect();

        Ok(Self {
            domains,
            breakdowns,
            api_markers: KeywordSet::new(&["api"])?,
            endpoint_markers: KeywordSet::new(&["endpoint"])?,
            component_markers: KeywordSet::new(&["component", "ui", "interface", "form"])?,
        })
    }

    /// Steps for a domain, falling back to the generic template.
    pub fn for_domain(&self, domain: Domain) -> &[TaskSkeleton] {
        self.domains
            .get(&domain)
            .or_else(|| self.domains.get(&Domain::Generic))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Which breakdown fits a task's title and description.
    pub fn breakdown_kind(&self, text: &str) -> BreakdownKind {
        if self.api_markers.is_match(text) && self.endpoint_markers.is_match(text) {
            BreakdownKind::Endpoint
        } else if self.component_markers.is_match(text) {
            BreakdownKind::Component
        } else {
            BreakdownKind::Generic
        }
    }

    pub fn breakdown(&self, kind: BreakdownKind) -> &[TaskSkeleton] {
        self.breakdowns.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}
