//! Types for build plan execution.

use std::path::PathBuf;

use thiserror::Error;

use crate::plan::BuildStep;
use crate::runtime::RuntimeError;

/// Errors that can occur while executing a build plan.
///
/// Every variant is fatal to the plan: execution stops at the first one.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// HTTP transfer failed during a fetch meta-command.
  #[error("fetch failed for {url}: {message}")]
  FetchFailed { url: String, message: String },

  /// Archive could not be unpacked during an extract meta-command.
  #[error("extract failed for {}: {message}", archive.display())]
  ExtractFailed { archive: PathBuf, message: String },

  #[error("unsupported archive format: {}", .0.display())]
  UnsupportedArchive(PathBuf),

  /// A shell command exited non-zero.
  #[error("command failed in step '{step}' with exit code {code:?}: {cmd}")]
  CmdFailed {
    step: BuildStep,
    cmd: String,
    code: Option<i32>,
  },

  /// The container runtime could not be driven.
  #[error("container runtime error: {0}")]
  Runtime(#[from] RuntimeError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
