//! Implementation of the `kiln install` command.
//!
//! Starts one session container, builds the requested package and every
//! missing dependency inside it, and tears the container down again.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use kiln_lib::layout::RepoLayout;
use kiln_lib::session::install_with_docker;

use crate::output::{format_duration, print_stat, print_success};

/// Execute the install command.
///
/// Prints the packages built (in build order), the count served from the
/// install cache and the elapsed time.
pub fn cmd_install(root: Option<&Path>, spec: &str) -> Result<()> {
  let layout = RepoLayout::discover(root).context("Failed to locate repository root")?;
  debug!(root = %layout.root().display(), "using repository");

  let start = Instant::now();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let outcome = rt
    .block_on(install_with_docker(&layout, spec))
    .with_context(|| format!("Install of {spec} failed"))?;

  println!();
  print_success(&format!("Installed {spec}"));
  let built: Vec<String> = outcome.built.iter().map(ToString::to_string).collect();
  print_stat("Packages built", &built.len().to_string());
  if !built.is_empty() {
    print_stat("Build order", &built.join(" → "));
  }
  print_stat("Packages cached", &outcome.cached.len().to_string());
  print_stat("Elapsed", &format_duration(start.elapsed()));

  Ok(())
}
