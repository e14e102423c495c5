//! Implementation of the `kiln create` command.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use kiln_lib::init::{create_port, create_project};
use kiln_lib::layout::RepoLayout;

use crate::output::{print_info, print_success, symbols};

/// Write `kiln.toml` and the build/install roots for a new project.
pub fn cmd_create_project(root: Option<&Path>, project: &str) -> Result<()> {
  let layout = RepoLayout::discover(root).context("Failed to locate repository root")?;
  let result = create_project(&layout, project).context("Failed to create project")?;

  print_success(&format!("Created project {}", project.bold()));
  println!(
    "  {} Config:     {}",
    symbols::INFO.cyan(),
    result.config_path.display()
  );
  println!(
    "  {} Buildtrees: {}",
    symbols::INFO.cyan(),
    result.buildtrees_dir.display()
  );
  println!(
    "  {} Packages:   {}",
    symbols::INFO.cyan(),
    result.packages_dir.display()
  );
  Ok(())
}

/// Write an empty manifest for `descriptor`.
pub fn cmd_create_port(root: Option<&Path>, descriptor: &str) -> Result<()> {
  let layout = RepoLayout::discover(root).context("Failed to locate repository root")?;
  let path = create_port(&layout, descriptor).context("Failed to create port")?;

  print_success(&format!("Created port {}", descriptor.bold()));
  print_info(&format!("Edit {} to describe the build", path.display().to_string().cyan()));
  Ok(())
}
