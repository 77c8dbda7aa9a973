//! Availability reporting for the host service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::Engine;

/// Agent type name the task agent reports under.
pub const TASK_AGENT: &str = "task";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAvailability {
    pub agent_type: String,
    pub available: bool,
    /// Why the agent is unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    pub agents: Vec<AgentAvailability>,
    pub checked_at: DateTime<Utc>,
}

impl ServiceHealth {
    /// Roll up individual agents: all available is healthy, none is unhealthy.
    pub fn from_agents(agents: Vec<AgentAvailability>) -> Self {
        let up = agents.iter().filter(|a| a.available).count();
        let status = if agents.is_empty() || up == 0 {
            HealthStatus::Unhealthy
        } else if up == agents.len() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        };
        Self {
            status,
            agents,
            checked_at: Utc::now(),
        }
    }

    pub fn available_agents(&self) -> Vec<&str> {
        self.agents
            .iter()
            .filter(|a| a.available)
            .map(|a| a.agent_type.as_str())
            .collect()
    }
}

/// The task agent is available exactly when its policy tables load.
pub fn probe_task_agent(config: &Config) -> AgentAvailability {
    match Engine::load(config) {
        Ok(_) => AgentAvailability {
            agent_type: TASK_AGENT.to_string(),
            available: true,
            reason: None,
        },
        Err(err) => {
            tracing::warn!(%err, "task agent unavailable");
            AgentAvailability {
                agent_type: TASK_AGENT.to_string(),
                available: false,
                reason: Some(err.to_string()),
            }
        }
    }
}

pub fn check(config: &Config) -> ServiceHealth {
    ServiceHealth::from_agents(vec![probe_task_agent(config)])
}
