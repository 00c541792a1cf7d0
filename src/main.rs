use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, prelude::*};

use specflow_classifier::TaskClassifier;
use specflow_config::{ExecutionMode, Settings};
use specflow_orchestrator::{OrchestrationRequest, Orchestrator};
use specflow_plan::ExecutionPlanner;
use specflow_roles::{RoleCatalog, RoleId};

/// Specflow - turn a task description into an ordered set of role documents
#[derive(Parser)]
#[command(name = "specflow")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to a settings file (JSON or YAML). Defaults to ~/.specflow/config.{yaml,json}
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Enable debug logging (RUST_LOG takes precedence)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Classify, plan and run a task, printing the outcome as JSON
  Run {
    #[command(flatten)]
    task: TaskArgs,

    /// Project directory; documents are written under its docs dir
    #[arg(long)]
    project: Option<PathBuf>,

    /// Disable context sharing between steps
    #[arg(long)]
    no_context_sharing: bool,

    /// Run at most this many steps
    #[arg(long)]
    max_steps: Option<usize>,
  },

  /// Classify and plan a task without running it
  Plan {
    #[command(flatten)]
    task: TaskArgs,
  },

  /// List the built-in roles
  Roles,
}

#[derive(clap::Args)]
struct TaskArgs {
  /// Task description. Read from stdin when neither --task nor --task-file is given
  #[arg(long, conflicts_with = "task_file")]
  task: Option<String>,

  /// File holding the task description
  #[arg(long)]
  task_file: Option<PathBuf>,

  /// Execution mode: sequential, parallel or smart
  #[arg(long)]
  mode: Option<ExecutionMode>,

  /// Comma-separated role ids, e.g. requirements,design
  #[arg(long, value_delimiter = ',')]
  roles: Option<Vec<String>>,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  init_tracing(cli.verbose);

  let settings = load_settings(cli.config.as_deref())?;

  match cli.command {
    Some(Commands::Run {
      task,
      project,
      no_context_sharing,
      max_steps,
    }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(async {
        run_async(settings, task, project, no_context_sharing, max_steps).await
      })?;
    }
    Some(Commands::Plan { task }) => {
      plan(settings, task)?;
    }
    Some(Commands::Roles) => {
      list_roles()?;
    }
    None => {
      println!("specflow - use --help to see available commands");
    }
  }

  Ok(())
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "warn" };
  tracing_subscriber::registry()
    .with(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
    )
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false),
    )
    .init();
}

/// Explicit path, else the first existing file in ~/.specflow, else defaults.
fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
  if let Some(path) = explicit {
    return Settings::from_path(path)
      .with_context(|| format!("failed to load settings: {}", path.display()));
  }

  let Some(home) = dirs::home_dir() else {
    return Ok(Settings::default());
  };
  let base = home.join(".specflow");
  for name in ["config.yaml", "config.yml", "config.json"] {
    let path = base.join(name);
    if path.is_file() {
      return Settings::from_path(&path)
        .with_context(|| format!("failed to load settings: {}", path.display()));
    }
  }

  Ok(Settings::default())
}

async fn run_async(
  settings: Settings,
  task: TaskArgs,
  project: Option<PathBuf>,
  no_context_sharing: bool,
  max_steps: Option<usize>,
) -> Result<()> {
  let task_content = read_task(&task)?;

  let request = OrchestrationRequest {
    task_content,
    project_path: project,
    execution_mode: task.mode,
    selected_roles: task.roles,
    context_sharing: no_context_sharing.then_some(false),
    max_steps,
  };

  let orchestrator = Orchestrator::new(settings).context("failed to create orchestrator")?;

  // Ctrl-C cancels the in-flight step; remaining steps are skipped
  let cancel = CancellationToken::new();
  let signal_cancel = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      signal_cancel.cancel();
    }
  });

  let outcome = orchestrator
    .orchestrate_with_cancel(request, cancel)
    .await
    .context("orchestration failed")?;

  eprintln!(
    "Run {}: {:?} ({} steps)",
    outcome.result.run_id,
    outcome.result.overall_status,
    outcome.result.results.len()
  );
  for record in &outcome.documents {
    match (&record.path, &record.error) {
      (Some(path), _) => eprintln!("  {} -> {}", record.role, path.display()),
      (None, Some(error)) => eprintln!("  {} not written: {}", record.role, error),
      (None, None) => {}
    }
  }

  println!("{}", outcome.to_json_pretty()?);

  Ok(())
}

fn plan(settings: Settings, task: TaskArgs) -> Result<()> {
  let task_content = read_task(&task)?;

  let explicit = task
    .roles
    .as_ref()
    .map(|names| {
      names
        .iter()
        .map(|name| name.parse::<RoleId>())
        .collect::<Result<Vec<_>, _>>()
    })
    .transpose()
    .context("invalid --roles")?;

  let classifier = TaskClassifier::new(settings.classifier);
  let descriptor = classifier
    .describe(task_content.trim(), explicit.as_deref())
    .context("failed to classify task")?;

  let planner = ExecutionPlanner::new(RoleCatalog::builtin());
  let plan = planner
    .build_plan(
      &descriptor.text,
      descriptor.classification.selected_roles(),
      task.mode.unwrap_or(settings.default_mode),
    )
    .context("failed to build plan")?;

  let output = serde_json::json!({
    "classification": descriptor.classification,
    "plan": plan,
  });
  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}

fn list_roles() -> Result<()> {
  let catalog = RoleCatalog::builtin();
  let roles: Vec<_> = catalog.iter().collect();
  println!("{}", serde_json::to_string_pretty(&roles)?);
  Ok(())
}

fn read_task(args: &TaskArgs) -> Result<String> {
  use std::io::IsTerminal;

  let text = if let Some(task) = &args.task {
    task.clone()
  } else if let Some(path) = &args.task_file {
    std::fs::read_to_string(path)
      .with_context(|| format!("failed to read task file: {}", path.display()))?
  } else if io::stdin().is_terminal() {
    bail!("no task given; use --task, --task-file or pipe it on stdin");
  } else {
    let mut input = String::new();
    io::stdin()
      .read_to_string(&mut input)
      .context("failed to read task from stdin")?;
    input
  };

  if text.trim().is_empty() {
    bail!("task description is empty");
  }
  Ok(text)
}
