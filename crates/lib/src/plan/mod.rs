//! Build plan compilation.
//!
//! A [`BuildPlan`] maps each [`BuildStep`] to its ordered, still unexpanded
//! command list. [`compile_plan`] builds it in three phases:
//!
//! 1. the package's own commands, verbatim
//! 2. commands injected by its dependencies, prepended per step
//! 3. commands inherited from an exported build system, only for
//!    `configure`/`build`/`install` when the step is still empty

mod build_system;
mod inject;

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::config::PortManifest;
use crate::layout::RepoLayout;
use crate::package::PackageSpec;
use crate::placeholder::VariableTable;

/// The fixed, totally ordered set of build steps.
///
/// Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuildStep {
  PreConfigure,
  Configure,
  PreBuild,
  Build,
  PostBuild,
  PreInstall,
  Install,
  PostInstall,
}

impl BuildStep {
  pub const ALL: [BuildStep; 8] = [
    BuildStep::PreConfigure,
    BuildStep::Configure,
    BuildStep::PreBuild,
    BuildStep::Build,
    BuildStep::PostBuild,
    BuildStep::PreInstall,
    BuildStep::Install,
    BuildStep::PostInstall,
  ];

  /// The manifest key for this step.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::PreConfigure => "pre_configure",
      Self::Configure => "configure",
      Self::PreBuild => "pre_build",
      Self::Build => "build",
      Self::PostBuild => "post_build",
      Self::PreInstall => "pre_install",
      Self::Install => "install",
      Self::PostInstall => "post_install",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|step| step.as_str() == name)
  }
}

impl fmt::Display for BuildStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Per-step command lists for one package build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildPlan {
  steps: BTreeMap<BuildStep, Vec<String>>,
}

impl BuildPlan {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn commands(&self, step: BuildStep) -> &[String] {
    self.steps.get(&step).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn push(&mut self, step: BuildStep, command: impl Into<String>) {
    self.steps.entry(step).or_default().push(command.into());
  }

  pub fn extend(&mut self, step: BuildStep, commands: impl IntoIterator<Item = String>) {
    self.steps.entry(step).or_default().extend(commands);
  }

  /// Insert `commands` ahead of the step's existing commands, keeping their order.
  pub fn prepend(&mut self, step: BuildStep, commands: Vec<String>) {
    if commands.is_empty() {
      return;
    }
    let existing = self.steps.entry(step).or_default();
    let tail = std::mem::replace(existing, commands);
    existing.extend(tail);
  }

  /// Non-empty steps in execution order.
  pub fn steps(&self) -> impl Iterator<Item = (BuildStep, &[String])> {
    self
      .steps
      .iter()
      .filter(|(_, commands)| !commands.is_empty())
      .map(|(step, commands)| (*step, commands.as_slice()))
  }

  pub fn is_empty(&self) -> bool {
    self.steps().next().is_none()
  }

  /// Total number of commands across all steps.
  pub fn len(&self) -> usize {
    self.steps.values().map(Vec::len).sum()
  }
}

/// Compile the build plan for a package.
///
/// `variables` supplies `${install_dir}` and `${jobs}` for inherited
/// build-system templates; the plan itself is left unexpanded. Dependency
/// manifests are read from `layout`.
pub fn compile_plan(layout: &RepoLayout, manifest: &PortManifest, variables: &VariableTable) -> BuildPlan {
  let mut plan = BuildPlan::new();

  if let Some(config) = manifest.build_config() {
    for step in BuildStep::ALL {
      plan.extend(step, config.commands(step).iter().cloned());
    }
  } else {
    debug!("manifest has no build configuration");
  }

  inject::apply_injects(&mut plan, layout, manifest);
  build_system::apply_build_system(&mut plan, layout, manifest, variables);

  plan
}

/// Load the manifests of a package's declared dependencies, in declaration order.
///
/// Malformed descriptors and missing or unparsable manifests are skipped.
fn dependency_manifests<'a>(
  layout: &'a RepoLayout,
  manifest: &'a PortManifest,
) -> impl Iterator<Item = (PackageSpec, PortManifest)> + 'a {
  manifest.dependencies().iter().filter_map(move |descriptor| {
    let spec = match PackageSpec::parse(descriptor) {
      Ok(spec) => spec,
      Err(e) => {
        debug!(dependency = %descriptor, error = %e, "skipping malformed dependency descriptor");
        return None;
      }
    };
    match PortManifest::load(&layout.manifest_path(&spec)) {
      Ok(dep_manifest) => Some((spec, dep_manifest)),
      Err(e) => {
        debug!(dependency = %spec, error = %e, "skipping unreadable dependency manifest");
        None
      }
    }
  })
}
