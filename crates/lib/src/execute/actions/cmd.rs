//! Shell commands run inside the session container.

use tracing::{error, info};

use crate::execute::types::ExecuteError;
use crate::plan::BuildStep;
use crate::runtime::{ContainerRuntime, Sandbox};

/// Run an already expanded command in the sandbox at `work_dir`.
///
/// `env_prefix` is prepended verbatim; it is either empty or ends with `"; "`.
pub async fn execute_cmd<R: ContainerRuntime>(
  sandbox: &Sandbox<'_, R>,
  step: BuildStep,
  work_dir: &str,
  cmd: &str,
  env_prefix: &str,
) -> Result<(), ExecuteError> {
  info!(step = %step, work_dir = %work_dir, cmd = %cmd, "executing command");

  let full = format!("{env_prefix}{cmd}");
  let status = sandbox.exec(work_dir, &full).await?;

  if !status.success() {
    error!(step = %step, cmd = %cmd, code = ?status.code, "command failed");
    return Err(ExecuteError::CmdFailed {
      step,
      cmd: cmd.to_string(),
      code: status.code,
    });
  }

  Ok(())
}
