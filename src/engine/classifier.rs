//! Domain classification.
//!
//! Scores each domain by counting keyword hits in the description and picks
//! the best one. Ties go to the domain declared first in [`Domain`]
//! (auth > api > frontend > database). Text without enough signal is
//! `generic`; classification never fails.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::Domain;
use crate::engine::keywords::KeywordSet;
use crate::error::{Error, Result};

/// Default minimum hit count a domain needs before it can win.
pub const DEFAULT_MIN_SCORE: usize = 1;

const AUTH_KEYWORDS: &[&str] = &[
    "auth",
    "authentication",
    "authorization",
    "oauth",
    "oauth2",
    "jwt",
    "login",
    "logout",
    "session",
    "token",
    "password",
    "credential",
    "signup",
    "sso",
];

const API_KEYWORDS: &[&str] = &[
    "api",
    "rest",
    "restful",
    "endpoint",
    "crud",
    "graphql",
    "backend",
    "server",
    "route",
    "webhook",
];

const FRONTEND_KEYWORDS: &[&str] = &[
    "frontend",
    "ui",
    "react",
    "vue",
    "angular",
    "component",
    "dashboard",
    "css",
    "page",
    "layout",
    "form",
];

const DATABASE_KEYWORDS: &[&str] = &[
    "database",
    "db",
    "sql",
    "schema",
    "migration",
    "postgres",
    "postgresql",
    "mysql",
    "index",
    "orm",
    "table",
];

/// Built-in keyword list for a domain. `Generic` has none.
pub fn default_keywords(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Auth => AUTH_KEYWORDS,
        Domain::Api => API_KEYWORDS,
        Domain::Frontend => FRONTEND_KEYWORDS,
        Domain::Database => DATABASE_KEYWORDS,
        Domain::Generic => &[],
    }
}

/// Tunable classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierPolicy {
    /// Hits a domain needs before it beats `generic`.
    pub min_score: usize,
    /// Per-domain keyword lists replacing the built-in list for that domain.
    pub keywords: BTreeMap<String, Vec<String>>,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            keywords: BTreeMap::new(),
        }
    }
}

/// Hit count for one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DomainScore {
    pub domain: Domain,
    pub hits: usize,
}

/// Keyword-driven domain classifier.
#[derive(Debug, Clone)]
pub struct DomainClassifier {
    min_score: usize,
    /// In tie-break priority order.
    sets: Vec<(Domain, KeywordSet)>,
}

impl DomainClassifier {
    /// Build the classifier from a policy, compiling every keyword set.
    ///
    /// # Errors
    /// Returns `PolicyLoad` when an override names an unknown or generic
    /// domain, or a keyword list does not compile.
    pub fn from_policy(policy: &ClassifierPolicy) -> Result<Self> {
        let mut overrides: BTreeMap<Domain, &Vec<String>> = BTreeMap::new();
        for (name, keywords) in &policy.keywords {
            let domain: Domain = name
                .parse()
                .map_err(|e: Error| Error::PolicyLoad(format!("classifier keywords: {}", e)))?;
            if domain == Domain::Generic {
                return Err(Error::PolicyLoad(
                    "classifier keywords: generic is the fallback and takes no keywords".into(),
                ));
            }
            overrides.insert(domain, keywords);
        }

        let mut sets = Vec::with_capacity(Domain::SPECIFIC.len());
        for domain in Domain::SPECIFIC {
            let set = match overrides.get(&domain) {
                Some(keywords) => KeywordSet::new(keywords.as_slice())?,
                None => KeywordSet::new(default_keywords(domain))?,
            };
            sets.push((domain, set));
        }

        Ok(Self {
            min_score: policy.min_score.max(1),
            sets,
        })
    }

    /// Per-domain hit counts, in priority order.
    pub fn scores(&self, text: &str) -> Vec<DomainScore> {
        self.sets
            .iter()
            .map(|(domain, set)| DomainScore {
                domain: *domain,
                hits: set.count(text),
            })
            .collect()
    }

    /// Classify free text into a domain.
    pub fn classify(&self, text: &str) -> Domain {
        let scores = self.scores(text);
        // Strictly greater keeps the earliest domain on ties.
        let best = scores.iter().fold(None::<&DomainScore>, |best, score| match best {
            Some(b) if b.hits >= score.hits => Some(b),
            _ => Some(score),
        });

        let domain = match best {
            Some(score) if score.hits >= self.min_score => score.domain,
            _ => Domain::Generic,
        };
        tracing::debug!(?scores, %domain, "classified description");
        domain
    }

    pub fn min_score(&self) -> usize {
        self.min_score
    }
}
