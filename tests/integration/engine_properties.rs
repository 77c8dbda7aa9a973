//! Structural and determinism properties of the decision engine.
//!
//! These run against the built-in policy tables through the crate's
//! free functions, the same entry points a host links against.

use std::collections::HashSet;

use taskagent::core::{
    check_references, AssigneeType, DependencyGraph, Domain, Effort, Task, TaskId, TaskStatus,
};
use taskagent::engine::{self, Engine};
use taskagent::Error;

use crate::fixtures::chain;

/// Test: Single-domain descriptions
/// Given text with markers for exactly one domain
/// When classified
/// Then that domain is returned
#[test]
fn test_single_domain_markers_classify_to_that_domain() {
    let cases = [
        ("Add JWT login with password reset", Domain::Auth),
        ("Expose a REST endpoint for invoices", Domain::Api),
        ("Build a React dashboard layout", Domain::Frontend),
        ("Write a postgres migration for the orders table", Domain::Database),
    ];
    for (text, expected) in cases {
        assert_eq!(engine::classify(text), expected, "classifying {:?}", text);
    }
}

/// Test: No markers
/// Given text with no domain markers
/// When classified
/// Then the domain is generic
#[test]
fn test_unmarked_text_is_generic() {
    for text in ["Organize the quarterly offsite", "Tidy up", "", "   "] {
        assert_eq!(engine::classify(text), Domain::Generic, "classifying {:?}", text);
    }
}

/// Test: Classification is a pure function of the text
#[test]
fn test_classification_is_deterministic() {
    let text = "Session handling for the admin dashboard API";
    let first = engine::classify(text);
    for _ in 0..10 {
        assert_eq!(engine::classify(text), first);
    }
}

/// Test: Mixed blog scenario
/// Given "Build a blog API with authentication"
/// When classified and synthesized
/// Then auth wins the tie and the first task has no unmet dependencies
#[test]
fn test_blog_api_with_authentication() {
    let text = "Build a blog API with authentication";
    let domain = engine::classify(text);
    assert_eq!(domain, Domain::Auth);

    let tasks = engine::synthesize(text, domain, &[]).unwrap();
    assert!(!tasks.is_empty());
    assert!(tasks[0].depends_on.is_empty());
}

/// Test: Generic template shape
/// Given any non-empty description on the generic domain
/// When synthesized
/// Then exactly four tasks form a single linear chain
#[test]
fn test_generic_synthesis_is_a_four_step_chain() {
    for text in ["Plan the offsite", "x", "Migrate the wiki to a new host and retire the old one"] {
        let tasks = engine::synthesize(text, Domain::Generic, &[]).unwrap();
        assert_eq!(tasks.len(), 4, "synthesizing {:?}", text);
        assert!(tasks[0].depends_on.is_empty());
        for pair in tasks.windows(2) {
            let expected: std::collections::BTreeSet<TaskId> = [pair[0].id].into_iter().collect();
            assert_eq!(pair[1].depends_on, expected);
        }

        let graph = DependencyGraph::build(&tasks).unwrap();
        let order: Vec<TaskId> = graph.topological_order().iter().map(|t| t.id).collect();
        let ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(order, ids);
    }
}

/// Test: Blank descriptions are rejected
#[test]
fn test_blank_description_is_invalid() {
    let err = engine::synthesize("  \n", Domain::Generic, &[]).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

/// Test: Synthesized batches are well formed
/// Given every domain, with and without existing tasks
/// When synthesized
/// Then the graph is acyclic and every reference resolves
#[test]
fn test_synthesized_references_resolve() {
    let existing = chain(&["Analyze requirements", "Kick-off meeting"]);
    let known: HashSet<TaskId> = existing.iter().map(|t| t.id).collect();
    let nothing: HashSet<TaskId> = HashSet::new();
    let none: &[Task] = &[];

    for domain in Domain::ALL {
        for (prior, ids) in [(none, &nothing), (&existing[..], &known)] {
            let tasks = engine::synthesize("Customer portal", domain, prior).unwrap();
            check_references(&tasks, ids).unwrap();

            let mut combined = prior.to_vec();
            combined.extend(tasks.iter().cloned());
            let graph = DependencyGraph::build(&combined).unwrap();
            assert!(graph.dangling().is_empty(), "{} batch has dangling references", domain);
        }
    }
}

/// Test: Existing tasks are reused
/// Given a project that already has the generic "Analyze requirements" step
/// When the generic template is synthesized again
/// Then that step is not duplicated and the next step links to it
#[test]
fn test_existing_step_is_reused_and_linked() {
    let existing = vec![Task::new("Analyze requirements", "").with_status(TaskStatus::Done)];
    let synthesis = Engine::builtin()
        .synthesize_detailed("Plan the offsite", Some(Domain::Generic), &existing)
        .unwrap();

    assert_eq!(synthesis.reused.len(), 1);
    assert_eq!(synthesis.reused[0].existing_id, existing[0].id);
    assert_eq!(synthesis.tasks.len(), 3);
    assert!(synthesis.tasks[0].depends_on.contains(&existing[0].id));
}

/// Test: Every synthesized task has an assignee the resolver agrees with
#[test]
fn test_synthesized_assignees_match_resolver() {
    let tasks = engine::synthesize("Users table and indexes", Domain::Database, &[]).unwrap();
    for task in &tasks {
        assert_eq!(task.assignee, engine::resolve_assignee(task), "task {:?}", task.title);
    }
}

/// Test: Assignment is total and deterministic
#[test]
fn test_resolve_assignee_is_deterministic() {
    let tasks = [
        Task::new("", ""),
        Task::new("Implement login endpoint", "").with_effort(Effort::Low),
        Task::new("Update changelog", "").with_effort(Effort::Low),
        Task::new("Pick a vendor", "decide between offers").with_effort(Effort::Medium),
        Task::new("Rewrite scheduler", "").with_effort(Effort::High),
    ];
    for task in &tasks {
        let first = engine::resolve_assignee(task);
        for _ in 0..5 {
            assert_eq!(engine::resolve_assignee(&task.clone()), first);
        }
    }
}

/// Test: High effort design review
/// Given a high-effort task mentioning "design review"
/// When resolved
/// Then the assignee is User
#[test]
fn test_high_effort_design_review_is_user() {
    let task = Task::new("Storage layer", "Schedule a design review with the platform team")
        .with_effort(Effort::High);
    assert_eq!(engine::resolve_assignee(&task), AssigneeType::User);
}

/// Test: Empty project analysis
#[test]
fn test_analyze_empty_is_perfect() {
    let report = engine::analyze(&[]).unwrap();
    assert_eq!(report.health_score, 100);
    assert!(report.recommendations.is_empty());
}

/// Test: Cycles are rejected
/// Given two tasks that depend on each other
/// When analyzed
/// Then analysis fails with InvalidInput instead of looping
#[test]
fn test_analyze_rejects_cycles() {
    let mut a = Task::new("A", "");
    let mut b = Task::new("B", "");
    let c = Task::new("C", "").with_dependency(b.id);
    b = b.with_dependency(a.id);
    a = a.with_dependency(c.id);

    let err = engine::analyze(&[a, b, c]).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

/// Test: Score monotonicity
/// Given a fixed project
/// When tasks move to done one at a time
/// Then the health score never decreases
#[test]
fn test_health_score_monotone_in_done() {
    let mut tasks = chain(&["Schema", "Models", "Endpoints", "Docs", "Release"]);
    tasks[1].status = TaskStatus::Doing;
    tasks[3].status = TaskStatus::Review;
    let order = [0, 2, 1, 4, 3];

    let mut previous = engine::analyze(&tasks).unwrap().health_score;
    for index in order {
        tasks[index].status = TaskStatus::Done;
        let score = engine::analyze(&tasks).unwrap().health_score;
        assert!(
            score >= previous,
            "score dropped from {} to {} after finishing {:?}",
            previous,
            score,
            tasks[index].title
        );
        previous = score;
    }
}

/// Test: Blocker is named
/// Given task A with three undone dependents
/// When analyzed
/// Then a recommendation names task A
#[test]
fn test_blocking_task_is_named() {
    let a = Task::new("Provision staging database", "");
    let mut tasks = vec![a.clone()];
    for title in ["Seed data", "Run load test", "Wire API"] {
        tasks.push(Task::new(title, "").with_dependency(a.id));
    }

    let report = engine::analyze(&tasks).unwrap();
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.contains("'Provision staging database'") && r.contains("3 tasks blocked")));
}
