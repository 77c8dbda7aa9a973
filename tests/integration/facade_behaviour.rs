//! Tool façade behaviour at the data-service boundary.
//!
//! Covers input validation before any I/O, bounded service calls,
//! cancellation, and how partial writes are reported.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use taskagent::config::Config;
use taskagent::core::{Domain, TaskStatus};
use taskagent::engine::{Engine, TaskSkeleton};
use taskagent::tools::schema::{
    AnalyzeProgressInput, ListTasksInput, PlanProjectInput, UpdateTaskStatusInput,
};
use taskagent::tools::{health, TaskAgent, TaskStore, ToolCall, ToolResult};
use taskagent::Error;

use crate::fixtures::{agent, chain, project, CountingStore, FlakyStore, SlowStore};

fn plan(project_id: &str, description: &str) -> PlanProjectInput {
    PlanProjectInput {
        project_id: project_id.into(),
        description: description.into(),
        domain: None,
    }
}

/// Test: Invalid input short-circuits
/// Given malformed inputs for every store-backed tool
/// When invoked
/// Then each fails with invalid_input and the store sees no calls
#[tokio::test]
async fn test_invalid_input_never_reaches_store() {
    let store = Arc::new(CountingStore::default());
    let agent = agent(store.clone());

    let calls = vec![
        ToolCall::PlanProject(plan("  ", "REST API")),
        ToolCall::PlanProject(plan("blog", "")),
        ToolCall::ListTasks(ListTasksInput {
            project_id: "blog".into(),
            status: Some("blocked".into()),
        }),
        ToolCall::UpdateTaskStatus(UpdateTaskStatusInput {
            project_id: "blog".into(),
            task: "login".into(),
            status: "finished".into(),
        }),
        ToolCall::UpdateTaskStatus(UpdateTaskStatusInput {
            project_id: "blog".into(),
            task: " ".into(),
            status: "done".into(),
        }),
        ToolCall::AnalyzeProgress(AnalyzeProgressInput {
            project_id: Some("blog".into()),
            tasks: Some(Vec::new()),
        }),
        ToolCall::AnalyzeProgress(AnalyzeProgressInput {
            project_id: None,
            tasks: None,
        }),
    ];

    for call in calls {
        let tool = call.name();
        let result = agent.invoke(call).await;
        assert!(!result.ok, "{} should fail", tool);
        assert_eq!(result.error.unwrap().kind, "invalid_input", "{}", tool);
    }
    assert_eq!(store.calls.total(), 0);
}

/// Test: Status filter error names the valid values
#[tokio::test]
async fn test_bad_status_message_lists_valid_statuses() {
    let agent = agent(Arc::new(CountingStore::default()));
    let err = agent
        .list_tasks(&ListTasksInput {
            project_id: "blog".into(),
            status: Some("blocked".into()),
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("todo, doing, review, done"));
}

/// Test: Slow service times out once
/// Given a store slower than the agent's timeout
/// When a read tool runs
/// Then it fails with upstream_unavailable after exactly one call
#[tokio::test(start_paused = true)]
async fn test_slow_store_times_out_without_retry() {
    let store = Arc::new(SlowStore::new(Duration::from_secs(60)));
    let agent = agent(store.clone()).with_timeout(Duration::from_millis(50));

    let err = agent
        .list_tasks(&ListTasksInput {
            project_id: "blog".into(),
            status: None,
        })
        .await
        .unwrap_err();

    match err {
        Error::UpstreamUnavailable {
            operation,
            target,
            reason,
        } => {
            assert_eq!(operation, "list_tasks");
            assert_eq!(target, "project blog");
            assert!(reason.contains("timed out"));
        }
        other => panic!("expected UpstreamUnavailable, got {:?}", other),
    }
    assert_eq!(store.calls.list.load(Ordering::SeqCst), 1);
    assert_eq!(store.calls.total(), 1);
}

/// Test: Planning against a slow service writes nothing
#[tokio::test(start_paused = true)]
async fn test_plan_times_out_before_creating() {
    let store = Arc::new(SlowStore::new(Duration::from_secs(60)));
    let agent = agent(store.clone()).with_timeout(Duration::from_millis(50));

    let result = agent
        .invoke(ToolCall::PlanProject(plan("blog", "REST API for posts")))
        .await;
    assert_eq!(result.error.unwrap().kind, "upstream_unavailable");
    assert_eq!(store.calls.create.load(Ordering::SeqCst), 0);
}

/// Test: Cancellation aborts an in-flight call
/// Given a slow store and a generous timeout
/// When the agent's token is cancelled mid-call
/// Then the tool fails with cancelled
#[tokio::test(start_paused = true)]
async fn test_cancellation_aborts_in_flight_call() {
    let store = Arc::new(SlowStore::new(Duration::from_secs(60)));
    let cancel = CancellationToken::new();
    let agent = agent(store.clone())
        .with_timeout(Duration::from_secs(30))
        .with_cancellation(cancel.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let result = agent
        .invoke(ToolCall::ListTasks(ListTasksInput {
            project_id: "blog".into(),
            status: None,
        }))
        .await;
    canceller.await.unwrap();

    assert!(!result.ok);
    assert_eq!(result.error.unwrap().kind, "cancelled");
    assert_eq!(store.calls.list.load(Ordering::SeqCst), 1);
}

/// Test: Partial persistence is reported
/// Given a store that rejects the third create
/// When a generic project is planned
/// Then the error says how many tasks were created and nothing is retried
#[tokio::test]
async fn test_partial_plan_reports_progress() {
    let store = Arc::new(FlakyStore::accepting(2));
    let agent = agent(store.clone());

    let err = agent
        .plan_project(&plan("offsite", "Organize the quarterly offsite"))
        .await
        .unwrap_err();

    match &err {
        Error::UpstreamUnavailable {
            operation, reason, ..
        } => {
            assert_eq!(*operation, "create_task");
            assert!(reason.contains("connection reset by peer"));
            assert!(reason.contains("2 of 4 tasks created"));
        }
        other => panic!("expected UpstreamUnavailable, got {:?}", other),
    }
    assert_eq!(store.calls.create.load(Ordering::SeqCst), 3);

    let stored = store.inner.list_tasks(&project("offsite")).await.unwrap();
    assert_eq!(stored.len(), 2);
}

/// Test: Unknown task
/// Given a project without a matching task
/// When its status is updated
/// Then task_not_found is returned and no update is sent
#[tokio::test]
async fn test_update_unknown_task_is_not_found() {
    let store = Arc::new(CountingStore::with_tasks(&project("blog"), chain(&["Write posts", "Publish"])));
    let agent = agent(store.clone());

    let result = agent
        .invoke(ToolCall::UpdateTaskStatus(UpdateTaskStatusInput {
            project_id: "blog".into(),
            task: "billing".into(),
            status: "done".into(),
        }))
        .await;

    assert_eq!(result.error.unwrap().kind, "task_not_found");
    assert_eq!(store.calls.list.load(Ordering::SeqCst), 1);
    assert_eq!(store.calls.update.load(Ordering::SeqCst), 0);
}

/// Test: Status update happens in one write
#[tokio::test]
async fn test_update_status_issues_single_write() {
    let store = Arc::new(CountingStore::with_tasks(&project("blog"), chain(&["Write posts", "Publish"])));
    let agent = agent(store.clone());

    let out = agent
        .update_task_status(&UpdateTaskStatusInput {
            project_id: "blog".into(),
            task: "publish".into(),
            status: "review".into(),
        })
        .await
        .unwrap();

    assert_eq!(out.previous_status, TaskStatus::Todo);
    assert_eq!(out.task.status, TaskStatus::Review);
    assert_eq!(out.task.title, "Publish");
    assert_eq!(store.calls.update.load(Ordering::SeqCst), 1);
}

/// Test: JSON wire format
/// Given a tool call decoded from JSON
/// When invoked
/// Then the encoded result carries the tool name, ok flag and output
#[tokio::test]
async fn test_json_call_roundtrip() {
    let agent = agent(Arc::new(CountingStore::default()));
    let call: ToolCall = serde_json::from_value(json!({
        "tool": "classify_domain",
        "input": { "description": "Users table and indexes" }
    }))
    .unwrap();

    let encoded = serde_json::to_value(agent.invoke(call).await).unwrap();
    assert_eq!(encoded["tool"], "classify_domain");
    assert_eq!(encoded["ok"], true);
    assert_eq!(encoded["output"]["domain"], "database");
    assert!(encoded.get("error").is_none());
}

#[test]
fn test_unknown_tool_is_rejected_by_decoder() {
    let parsed = serde_json::from_value::<ToolCall>(json!({
        "tool": "create_project",
        "input": { "title": "x" }
    }));
    assert!(parsed.is_err());
}

/// Test: Broken policy tables
/// Given a config whose generic template has the wrong length
/// When the engine loads
/// Then the failure is reported as unavailable
#[test]
fn test_policy_load_failure_is_unavailable() {
    let mut config = Config::default();
    config.templates.insert(
        "generic".to_string(),
        vec![TaskSkeleton {
            title: "Do it".into(),
            description: String::new(),
            effort: Default::default(),
            feature: String::new(),
            task_order: 1,
        }],
    );

    let err = Engine::load(&config).unwrap_err();
    assert!(matches!(err, Error::PolicyLoad(_)));
    let result = ToolResult::failure("plan_project", &err);
    assert_eq!(result.error.unwrap().kind, "unavailable");

    assert!(!health::probe_task_agent(&config).available);
}

/// Test: Overridden templates flow through the façade
#[tokio::test]
async fn test_custom_engine_templates_are_used() {
    let mut config = Config::default();
    config.templates.insert(
        "database".to_string(),
        vec![TaskSkeleton {
            title: "Model {subject}".into(),
            description: String::new(),
            effort: Default::default(),
            feature: "Data".into(),
            task_order: 1,
        }],
    );
    let engine = Engine::load(&config).unwrap();
    let store = Arc::new(CountingStore::default());
    let agent = TaskAgent::new(Arc::new(engine), store.clone());

    let out = agent
        .plan_project(&PlanProjectInput {
            project_id: "shop".into(),
            description: "Orders".into(),
            domain: Some("db".into()),
        })
        .await
        .unwrap();

    assert_eq!(out.domain, Domain::Database);
    assert_eq!(out.created.len(), 1);
    assert!(out.created[0].title.starts_with("Model"));
    assert_eq!(store.calls.create.load(Ordering::SeqCst), 1);
}
