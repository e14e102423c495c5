//! Build plan execution.
//!
//! Runs a compiled [`BuildPlan`] step by step inside the session container.
//! Steps run in their fixed order, commands in declaration order, and the
//! first failure aborts the whole plan.

pub mod actions;
pub mod types;

use std::path::Path;

use tracing::{debug, error, info};

use crate::config::PortManifest;
use crate::environment::EnvironmentContext;
use crate::plan::BuildPlan;
use crate::runtime::{ContainerRuntime, Sandbox};

pub use actions::{StepCommand, execute_action};
pub use types::ExecuteError;

/// Execute `plan` for one package.
///
/// Each step runs in its `<step>_work_dir` from `manifest` when declared,
/// otherwise in `root`. Empty commands are skipped.
pub async fn execute_plan<R: ContainerRuntime>(
  plan: &BuildPlan,
  manifest: &PortManifest,
  env: &mut EnvironmentContext,
  sandbox: &Sandbox<'_, R>,
  root: &Path,
) -> Result<(), ExecuteError> {
  let default_work_dir = root.to_string_lossy().into_owned();

  for (step, commands) in plan.steps() {
    let work_dir = manifest.work_dir(step).unwrap_or(default_work_dir.as_str());
    info!(step = %step, commands = commands.len(), "executing step");

    for command in commands {
      if command.trim().is_empty() {
        debug!(step = %step, "skipping empty command");
        continue;
      }
      if let Err(e) = execute_action(command, step, work_dir, env, sandbox).await {
        error!(step = %step, error = %e, "step failed");
        return Err(e);
      }
    }
  }

  Ok(())
}
