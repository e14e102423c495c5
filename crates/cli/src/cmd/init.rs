//! Implementation of the `kiln init` command.
//!
//! Clones a configuration repository holding ready-made manifests.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use kiln_lib::init::clone_config_repo;

use crate::output::{print_success, symbols};

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if `dest` is not empty or the clone fails.
pub fn cmd_init(conf: &str, dest: &Path) -> Result<()> {
  let path = clone_config_repo(conf, dest).with_context(|| format!("Failed to clone {conf}"))?;

  print_success("Cloned configuration repository");
  println!("  {} {} {}", conf, symbols::ARROW.cyan(), path.display());
  Ok(())
}
