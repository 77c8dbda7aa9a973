//! The decision engine.
//!
//! Four pure components share one set of policy tables:
//!
//! - [`DomainClassifier`] maps free text to a [`Domain`]
//! - [`TaskSynthesizer`] expands domain templates into dependent tasks
//! - [`AssigneeResolver`] picks who should do a task
//! - [`ProgressAnalyzer`] scores a project snapshot
//!
//! An [`Engine`] is immutable after [`Engine::load`] and is safe to share
//! across threads; no call caches state between invocations.

pub mod analyzer;
pub mod classifier;
pub mod keywords;
pub mod resolver;
pub mod synthesizer;
pub mod templates;

use std::sync::LazyLock;

pub use analyzer::{AnalyzerPolicy, HealthMetrics, HealthReport, ProgressAnalyzer, StatusBreakdown};
pub use classifier::{ClassifierPolicy, DomainClassifier, DomainScore};
pub use resolver::{AssigneeResolver, Assignment, AssignmentRule, ResolverPolicy};
pub use synthesizer::{ReusedTask, Synthesis, SynthesizerPolicy, TaskSynthesizer};
pub use templates::{BreakdownKind, TaskSkeleton, TemplateTable};

use crate::config::Config;
use crate::core::{AssigneeType, Domain, Task};
use crate::error::{Error, Result};

static BUILTIN: LazyLock<Engine> =
    LazyLock::new(|| Engine::load(&Config::default()).expect("built-in policy tables are valid"));

/// The loaded decision components.
#[derive(Debug, Clone)]
pub struct Engine {
    classifier: DomainClassifier,
    synthesizer: TaskSynthesizer,
    resolver: AssigneeResolver,
    analyzer: ProgressAnalyzer,
}

impl Engine {
    /// Compile and validate every policy table in `config`.
    ///
    /// # Errors
    /// Every failure is reported as `PolicyLoad`; an engine that fails to
    /// load reports itself unavailable.
    pub fn load(config: &Config) -> Result<Self> {
        let loaded = Self::try_load(config).map_err(|e| match e {
            Error::PolicyLoad(_) => e,
            other => Error::PolicyLoad(other.to_string()),
        });
        match &loaded {
            Ok(_) => tracing::debug!("policy tables loaded"),
            Err(err) => tracing::error!(%err, "policy tables failed to load"),
        }
        loaded
    }

    fn try_load(config: &Config) -> Result<Self> {
        let classifier = DomainClassifier::from_policy(&config.classifier)?;
        let templates = TemplateTable::with_overrides(&config.templates)?;
        let synthesizer = TaskSynthesizer::new(config.synthesizer.clone(), templates)?;
        let resolver = AssigneeResolver::from_policy(&config.resolver)?;
        let analyzer = ProgressAnalyzer::new(config.analyzer.clone())?;
        Ok(Self {
            classifier,
            synthesizer,
            resolver,
            analyzer,
        })
    }

    /// The engine built from default tables.
    pub fn builtin() -> &'static Engine {
        &BUILTIN
    }

    pub fn classifier(&self) -> &DomainClassifier {
        &self.classifier
    }

    pub fn resolver(&self) -> &AssigneeResolver {
        &self.resolver
    }

    pub fn templates(&self) -> &TemplateTable {
        self.synthesizer.templates()
    }

    pub fn classify(&self, description: &str) -> Domain {
        self.classifier.classify(description)
    }

    /// Expand the template for `domain`, or for the classified domain when
    /// `domain` is `None`.
    pub fn synthesize_detailed(
        &self,
        description: &str,
        domain: Option<Domain>,
        existing: &[Task],
    ) -> Result<Synthesis> {
        if description.trim().is_empty() {
            return Err(Error::invalid("description must not be empty"));
        }
        let domain = domain.unwrap_or_else(|| self.classify(description));
        self.synthesizer
            .synthesize(description, domain, existing, &self.resolver)
    }

    pub fn synthesize(&self, description: &str, domain: Domain, existing: &[Task]) -> Result<Vec<Task>> {
        self.synthesize_detailed(description, Some(domain), existing)
            .map(|s| s.tasks)
    }

    /// Break one task into sub-tasks, classifying the task text for the
    /// sub-tasks' domain.
    pub fn break_down(&self, title: &str, description: &str, existing: &[Task]) -> Result<Synthesis> {
        let domain = self.classify(&format!("{} {}", title, description));
        self.synthesizer
            .break_down(title, description, domain, existing, &self.resolver)
    }

    pub fn resolve_assignee(&self, task: &Task) -> AssigneeType {
        self.resolver.resolve(task)
    }

    pub fn explain_assignee(&self, task: &Task) -> Assignment {
        self.resolver.explain(task)
    }

    pub fn analyze(&self, tasks: &[Task]) -> Result<HealthReport> {
        self.analyzer.analyze(tasks, &self.resolver)
    }
}

/// Classify with the built-in tables.
pub fn classify(description: &str) -> Domain {
    Engine::builtin().classify(description)
}

/// Synthesize with the built-in tables.
pub fn synthesize(description: &str, domain: Domain, existing: &[Task]) -> Result<Vec<Task>> {
    Engine::builtin().synthesize(description, domain, existing)
}

/// Resolve with the built-in tables.
pub fn resolve_assignee(task: &Task) -> AssigneeType {
    Engine::builtin().resolve_assignee(task)
}

/// Analyze with the built-in tables.
pub fn analyze(tasks: &[Task]) -> Result<HealthReport> {
    Engine::builtin().analyze(tasks)
}
