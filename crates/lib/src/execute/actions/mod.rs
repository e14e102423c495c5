//! Meta-command classification and dispatch.
//!
//! A build command starting with a meta-command keyword and a single space is
//! handled by kiln itself; everything else is a shell command for the
//! container. Classification happens before variable expansion.

pub mod cmd;
pub mod extract;
pub mod fetch;

use crate::consts::{DOWNLOADS_DIR, EXTRACT_KEYWORD, FETCH_KEYWORD};
use crate::environment::EnvironmentContext;
use crate::execute::types::ExecuteError;
use crate::plan::BuildStep;
use crate::runtime::{ContainerRuntime, Sandbox};

pub use cmd::execute_cmd;
pub use extract::execute_extract;
pub use fetch::execute_fetch;

/// A classified build command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCommand<'a> {
  /// `kiln_fetch <url>`
  Fetch(&'a str),
  /// `kiln_extract <archive>`
  Extract(&'a str),
  Shell(&'a str),
}

impl<'a> StepCommand<'a> {
  pub fn classify(command: &'a str) -> Self {
    if let Some(arg) = strip_keyword(command, FETCH_KEYWORD) {
      StepCommand::Fetch(arg)
    } else if let Some(arg) = strip_keyword(command, EXTRACT_KEYWORD) {
      StepCommand::Extract(arg)
    } else {
      StepCommand::Shell(command)
    }
  }
}

fn strip_keyword<'a>(command: &'a str, keyword: &str) -> Option<&'a str> {
  command.strip_prefix(keyword)?.strip_prefix(' ')
}

/// Execute one build command.
///
/// `work_dir` is the step's unexpanded working directory. A successful fetch
/// updates `${last_file}` in `env`.
pub async fn execute_action<R: ContainerRuntime>(
  command: &str,
  step: BuildStep,
  work_dir: &str,
  env: &mut EnvironmentContext,
  sandbox: &Sandbox<'_, R>,
) -> Result<(), ExecuteError> {
  match StepCommand::classify(command) {
    StepCommand::Fetch(arg) => {
      let url = env.variables.expand(arg);
      let downloads_dir = env.build_dir.join(DOWNLOADS_DIR);
      let path = execute_fetch(url.trim(), &downloads_dir, env.proxy.as_deref()).await?;
      env.variables.set("last_file", path.to_string_lossy());
      Ok(())
    }

    StepCommand::Extract(arg) => {
      let archive = extract::archive_path(&env.variables.expand(arg), &env.build_dir);
      execute_extract(&archive, &env.build_dir).await
    }

    StepCommand::Shell(cmd) => {
      let cmd = env.variables.expand(cmd);
      let work_dir = env.variables.expand(work_dir);
      execute_cmd(sandbox, step, &work_dir, &cmd, &env.env_prefix).await
    }
  }
}
