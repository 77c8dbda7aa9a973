use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use taskagent::config::Config;
use taskagent::core::Effort;
use taskagent::engine::Engine;
use taskagent::tools::schema::{
    AnalyzeProgressInput, BreakDownTaskInput, ClassifyDomainInput, ListTasksInput, PlanProjectInput,
    ResolveAssigneeInput, SynthesizeTasksInput, UpdateTaskStatusInput,
};
use taskagent::tools::{health, tool_specs, FileTaskStore, TaskAgent, ToolCall, ToolResult};
use taskagent::{Error, Result};

/// Taskagent - plans, assigns and reviews project tasks against a task store
#[derive(Parser, Debug)]
#[command(name = "taskagent")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    TASKAGENT_DEBUG=1     Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.taskagent/taskagent.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Config file (defaults to ~/.taskagent/config.toml)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Classify a description into a domain
    Classify { description: String },

    /// Expand a description into tasks without saving them
    Synthesize {
        description: String,

        /// Skip classification and use this domain
        #[arg(long)]
        domain: Option<String>,
    },

    /// Decide who should own a task
    Assign {
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "medium")]
        effort: String,
    },

    /// Report the health of a stored project
    Analyze { project_id: String },

    /// Plan a project and save the tasks
    Plan {
        project_id: String,
        description: String,

        #[arg(long)]
        domain: Option<String>,
    },

    /// Break one task into subtasks and save them
    Breakdown {
        project_id: String,
        title: String,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// List the tasks of a project
    List {
        project_id: String,

        /// Only show tasks with this status
        #[arg(long)]
        status: Option<String>,
    },

    /// Move a task to a new status
    Status {
        project_id: String,

        /// Task id, title, or part of the title
        task: String,

        status: String,
    },

    /// Read a JSON tool call from stdin and write the result to stdout
    Call,

    /// Print the tool registry with input and output schemas
    Tools,

    /// Report whether the agent can serve requests
    Health,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging is best effort; a missing home directory must not stop the CLI.
    if let Err(err) = taskagent::log::init_with_debug(cli.debug) {
        eprintln!("warning: logging disabled: {err}");
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Tools => print_json(&tool_specs()),
        Command::Health => print_json(&health::check(&config)),
        Command::Call => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw)?;
            let result = match serde_json::from_str::<ToolCall>(&raw) {
                Ok(call) => run_call(&config, call)?,
                Err(err) => ToolResult::failure("unknown", &Error::invalid(format!("malformed tool call: {err}"))),
            };
            finish(&result)
        }
        command => {
            let call = to_tool_call(command)?;
            let result = run_call(&config, call)?;
            finish(&result)
        }
    }
}

fn to_tool_call(command: Command) -> Result<ToolCall> {
    let call = match command {
        Command::Classify { description } => ToolCall::ClassifyDomain(ClassifyDomainInput { description }),
        Command::Synthesize { description, domain } => ToolCall::SynthesizeTasks(SynthesizeTasksInput {
            description,
            domain,
            existing_tasks: Vec::new(),
        }),
        Command::Assign {
            title,
            description,
            effort,
        } => ToolCall::ResolveAssignee(ResolveAssigneeInput {
            title,
            description,
            estimated_effort: effort.parse::<Effort>()?,
            domain: None,
        }),
        Command::Analyze { project_id } => ToolCall::AnalyzeProgress(AnalyzeProgressInput {
            project_id: Some(project_id),
            tasks: None,
        }),
        Command::Plan {
            project_id,
            description,
            domain,
        } => ToolCall::PlanProject(PlanProjectInput {
            project_id,
            description,
            domain,
        }),
        Command::Breakdown {
            project_id,
            title,
            description,
        } => ToolCall::BreakDownTask(BreakDownTaskInput {
            project_id,
            title,
            description,
        }),
        Command::List { project_id, status } => ToolCall::ListTasks(ListTasksInput { project_id, status }),
        Command::Status {
            project_id,
            task,
            status,
        } => ToolCall::UpdateTaskStatus(UpdateTaskStatusInput {
            project_id,
            task,
            status,
        }),
        Command::Call | Command::Tools | Command::Health => {
            return Err(Error::invalid("command is not a tool call"));
        }
    };
    Ok(call)
}

fn run_call(config: &Config, call: ToolCall) -> Result<ToolResult> {
    let engine = match Engine::load(config) {
        Ok(engine) => engine,
        Err(err) => return Ok(ToolResult::failure(call.name(), &err)),
    };
    let store = FileTaskStore::new(config.store_path()?);
    let cancel = CancellationToken::new();
    let agent = TaskAgent::new(Arc::new(engine), Arc::new(store))
        .with_timeout(config.store_timeout())
        .with_cancellation(cancel.clone());

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, cancelling");
                cancel.cancel();
            }
        });
        let result = agent.invoke(call).await;
        watcher.abort();
        result
    });
    Ok(result)
}

fn finish(result: &ToolResult) -> Result<()> {
    print_json(result)?;
    if !result.ok {
        std::process::exit(1);
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
