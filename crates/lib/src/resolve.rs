//! Dependency resolution.
//!
//! [`DependencyResolver::resolve`] installs a package and, depth first, every
//! package it depends on. Within one [`InstallSession`] each package is built
//! at most once; across sessions an existing install directory counts as
//! installed and is never looked into again.
//!
//! The cache check is existence only. A package whose build fails, or panics
//! part way through, has its install directory removed so the failure is not
//! mistaken for a cache hit later.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::{GlobalConfig, PortManifest};
use crate::environment::prepare_environment;
use crate::execute::execute_plan;
use crate::layout::RepoLayout;
use crate::package::PackageSpec;
use crate::plan::compile_plan;
use crate::runtime::{ContainerRuntime, Sandbox};
use crate::session::InstallError;

/// State shared by every package resolved during one install invocation.
#[derive(Debug)]
pub struct InstallSession<'a, R: ContainerRuntime> {
  sandbox: Sandbox<'a, R>,
  processed: HashSet<PackageSpec>,
  /// Packages currently being resolved, outermost first.
  in_progress: Vec<PackageSpec>,
  built: Vec<PackageSpec>,
  cached: Vec<PackageSpec>,
}

impl<'a, R: ContainerRuntime> InstallSession<'a, R> {
  pub fn new(sandbox: Sandbox<'a, R>) -> Self {
    Self {
      sandbox,
      processed: HashSet::new(),
      in_progress: Vec::new(),
      built: Vec::new(),
      cached: Vec::new(),
    }
  }

  pub fn sandbox(&self) -> &Sandbox<'a, R> {
    &self.sandbox
  }

  pub fn is_processed(&self, spec: &PackageSpec) -> bool {
    self.processed.contains(spec)
  }

  /// Packages built in this session, in build order.
  pub fn built(&self) -> &[PackageSpec] {
    &self.built
  }

  /// Packages found already installed.
  pub fn cached(&self) -> &[PackageSpec] {
    &self.cached
  }

  pub(crate) fn into_results(self) -> (Vec<PackageSpec>, Vec<PackageSpec>) {
    (self.built, self.cached)
  }

  fn cycle_chain(&self, spec: &PackageSpec) -> String {
    let start = self.in_progress.iter().position(|s| s == spec).unwrap_or_default();
    self.in_progress[start..]
      .iter()
      .chain(std::iter::once(spec))
      .map(ToString::to_string)
      .collect::<Vec<_>>()
      .join(" -> ")
  }
}

/// Resolves packages against one repository layout and configuration.
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
  layout: &'a RepoLayout,
  config: &'a GlobalConfig,
}

impl<'a> DependencyResolver<'a> {
  pub fn new(layout: &'a RepoLayout, config: &'a GlobalConfig) -> Self {
    Self { layout, config }
  }

  /// Install `spec` and its transitive dependencies.
  ///
  /// # Errors
  ///
  /// Any failure is fatal: a malformed or missing manifest, a malformed
  /// dependency descriptor, a dependency cycle, a failing dependency, or a
  /// failing build command.
  pub async fn resolve<R: ContainerRuntime>(
    &self,
    spec: &PackageSpec,
    session: &mut InstallSession<'_, R>,
  ) -> Result<(), InstallError> {
    if session.is_processed(spec) {
      debug!(package = %spec, "already processed in this session");
      return Ok(());
    }

    if session.in_progress.contains(spec) {
      return Err(InstallError::DependencyCycle {
        chain: session.cycle_chain(spec),
      });
    }

    if self.layout.install_dir(spec).exists() {
      info!(package = %spec, "already installed, skipping");
      session.processed.insert(spec.clone());
      session.cached.push(spec.clone());
      return Ok(());
    }

    session.in_progress.push(spec.clone());
    let result = self.build(spec, session).await;
    session.in_progress.pop();
    result?;

    session.processed.insert(spec.clone());
    session.built.push(spec.clone());
    Ok(())
  }

  async fn build<R: ContainerRuntime>(
    &self,
    spec: &PackageSpec,
    session: &mut InstallSession<'_, R>,
  ) -> Result<(), InstallError> {
    let manifest = PortManifest::load(&self.layout.manifest_path(spec))?;

    let dependencies = manifest
      .dependencies()
      .iter()
      .map(|descriptor| PackageSpec::parse(descriptor))
      .collect::<Result<Vec<_>, _>>()?;

    for dependency in &dependencies {
      info!(package = %spec, dependency = %dependency, "found dependency");
      Box::pin(self.resolve(dependency, session))
        .await
        .map_err(|e| InstallError::DependencyFailed {
          dependency: dependency.clone(),
          source: Box::new(e),
        })?;
    }

    info!(package = %spec, "installing package");
    let mut env = prepare_environment(self.layout, self.config, spec, &manifest, &dependencies).await?;
    let plan = compile_plan(self.layout, &manifest, &env.variables);
    debug!(package = %spec, commands = plan.len(), "compiled build plan");

    let guard = IncompleteInstall::new(spec, env.install_dir.clone());
    execute_plan(&plan, &manifest, &mut env, session.sandbox(), self.layout.root())
      .await
      .map_err(|e| InstallError::Build {
        spec: spec.clone(),
        source: e,
      })?;
    guard.complete();

    info!(package = %spec, "package installed");
    Ok(())
  }
}

/// Removes an install directory on drop unless the build completed.
///
/// Covers both an error return and a panic unwinding out of the build.
#[derive(Debug)]
struct IncompleteInstall {
  package: String,
  path: PathBuf,
  armed: bool,
}

impl IncompleteInstall {
  fn new(spec: &PackageSpec, path: PathBuf) -> Self {
    Self {
      package: spec.to_string(),
      path,
      armed: true,
    }
  }

  fn complete(mut self) {
    self.armed = false;
  }
}

impl Drop for IncompleteInstall {
  fn drop(&mut self) {
    if !self.armed {
      return;
    }
    debug!(package = %self.package, path = ?self.path, "removing incomplete install directory");
    match std::fs::remove_dir_all(&self.path) {
      Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
        warn!(package = %self.package, error = %e, "failed to remove incomplete install directory");
      }
      _ => {}
    }
  }
}
