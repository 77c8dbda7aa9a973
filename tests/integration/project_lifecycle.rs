//! End-to-end project lifecycle against the file-backed store.

use std::sync::Arc;

use tempfile::TempDir;

use taskagent::core::{AssigneeType, Domain, TaskStatus};
use taskagent::engine::BreakdownKind;
use taskagent::tools::schema::{
    AnalyzeProgressInput, BreakDownTaskInput, ListTasksInput, PlanProjectInput,
    UpdateTaskStatusInput,
};
use taskagent::tools::{FileTaskStore, TaskAgent, TaskStore};

use crate::fixtures::{agent, project};

fn file_agent(dir: &TempDir) -> (TaskAgent, Arc<FileTaskStore>) {
    let store = Arc::new(FileTaskStore::new(dir.path().join("tasks.json")));
    (agent(store.clone()), store)
}

async fn set_status(agent: &TaskAgent, project_id: &str, task: &str, status: &str) {
    agent
        .update_task_status(&UpdateTaskStatusInput {
            project_id: project_id.into(),
            task: task.into(),
            status: status.into(),
        })
        .await
        .unwrap();
}

/// Test: Plan, work, review
/// Given an empty project
/// When it is planned, progressed and analyzed
/// Then the stored tasks, listing and health report stay consistent
#[tokio::test]
async fn test_plan_progress_and_analyze() {
    let dir = TempDir::new().unwrap();
    let (agent, _store) = file_agent(&dir);

    let planned = agent
        .plan_project(&PlanProjectInput {
            project_id: "blog".into(),
            description: "Build a blog API with authentication".into(),
            domain: None,
        })
        .await
        .unwrap();
    assert_eq!(planned.domain, Domain::Auth);
    assert_eq!(planned.created.len(), 5);
    assert!(planned.created.iter().all(|t| t.status == TaskStatus::Todo));

    let fresh = agent
        .analyze_progress(&AnalyzeProgressInput {
            project_id: Some("blog".into()),
            tasks: None,
        })
        .await
        .unwrap();
    assert_eq!(fresh.breakdown.todo, 5);
    assert!(fresh.next_actions.iter().any(|a| a.starts_with("Start working on 5 pending tasks")));

    let first = planned.created[0].title.clone();
    let second = planned.created[1].title.clone();
    set_status(&agent, "blog", &first, "done").await;
    set_status(&agent, "blog", &second, "doing").await;

    let listed = agent
        .list_tasks(&ListTasksInput {
            project_id: "blog".into(),
            status: Some("doing".into()),
        })
        .await
        .unwrap();
    assert_eq!(listed.tasks.len(), 1);
    assert_eq!(listed.tasks[0].title, second);
    assert_eq!(listed.breakdown.done, 1);
    assert_eq!(listed.breakdown.total(), 5);

    let progressed = agent
        .analyze_progress(&AnalyzeProgressInput {
            project_id: Some("blog".into()),
            tasks: None,
        })
        .await
        .unwrap();
    assert!(progressed.health_score >= fresh.health_score);
    assert_eq!(progressed.metrics.blocked, 3);
}

/// Test: Planning twice is idempotent
#[tokio::test]
async fn test_replanning_reuses_stored_tasks() {
    let dir = TempDir::new().unwrap();
    let (agent, store) = file_agent(&dir);
    let input = PlanProjectInput {
        project_id: "blog".into(),
        description: "Organize the launch".into(),
        domain: Some("generic".into()),
    };

    agent.plan_project(&input).await.unwrap();
    let again = agent.plan_project(&input).await.unwrap();

    assert!(again.created.is_empty());
    assert_eq!(again.reused.len(), 4);
    assert_eq!(store.list_tasks(&project("blog")).await.unwrap().len(), 4);
}

/// Test: Breaking down an endpoint task
/// Given a task about an API endpoint
/// When it is broken down
/// Then the endpoint breakdown is stored and assigned
#[tokio::test]
async fn test_break_down_endpoint_task() {
    let dir = TempDir::new().unwrap();
    let (agent, store) = file_agent(&dir);

    let out = agent
        .break_down_task(&BreakDownTaskInput {
            project_id: "blog".into(),
            title: "Comments API".into(),
            description: "REST endpoint for posting comments".into(),
        })
        .await
        .unwrap();

    assert_eq!(out.breakdown, Some(BreakdownKind::Endpoint));
    assert_eq!(out.created.len(), 5);
    assert!(out.created.iter().all(|t| t.title.contains("Comments API")));
    for task in &out.created {
        assert_eq!(task.assignee, agent.engine().resolve_assignee(task));
    }
    assert!(out.created.iter().any(|t| t.assignee != AssigneeType::User));
    assert_eq!(store.list_tasks(&project("blog")).await.unwrap().len(), 5);
}

/// Test: Data survives a new store instance
#[tokio::test]
async fn test_tasks_persist_across_store_instances() {
    let dir = TempDir::new().unwrap();
    {
        let (agent, _store) = file_agent(&dir);
        agent
            .plan_project(&PlanProjectInput {
                project_id: "shop".into(),
                description: "Checkout page".into(),
                domain: None,
            })
            .await
            .unwrap();
        set_status(&agent, "shop", "Design", "review").await;
    }

    let reopened = FileTaskStore::new(dir.path().join("tasks.json"));
    let tasks = reopened.list_tasks(&project("shop")).await.unwrap();
    assert_eq!(tasks.len(), 5);
    assert!(tasks.iter().all(|t| t.domain == Domain::Frontend));
    assert_eq!(tasks.iter().filter(|t| t.status == TaskStatus::Review).count(), 1);
}
