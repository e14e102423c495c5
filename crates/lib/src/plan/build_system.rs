//! Inherited build-system templates.

use tracing::{info, warn};

use super::{BuildPlan, BuildStep, dependency_manifests};
use crate::config::{ExportedBuildSystem, PortManifest};
use crate::layout::RepoLayout;
use crate::placeholder::VariableTable;

const INHERITABLE: [BuildStep; 3] = [BuildStep::Configure, BuildStep::Build, BuildStep::Install];

/// Fill empty `configure`/`build`/`install` steps from the named build system.
///
/// The provider is the first declared dependency exporting a template with the
/// manifest's `build_system` name. No provider is a warning, not an error.
pub(super) fn apply_build_system(
  plan: &mut BuildPlan,
  layout: &RepoLayout,
  manifest: &PortManifest,
  variables: &VariableTable,
) {
  let Some(name) = manifest.build_system() else {
    return;
  };

  let provider = dependency_manifests(layout, manifest).find_map(|(dependency, dep_manifest)| {
    dep_manifest
      .build_config()
      .and_then(|config| config.exported_build_system(name))
      .cloned()
      .map(|system| (dependency, system))
  });

  let Some((dependency, system)) = provider else {
    warn!(build_system = %name, "no dependency exports the requested build system");
    return;
  };

  let template_vars = template_variables(variables);
  for step in INHERITABLE {
    if !plan.commands(step).is_empty() {
      continue;
    }
    if let Some(command) = render(&system, step, &template_vars) {
      info!(build_system = %name, provider = %dependency, step = %step, command = %command, "inherited command");
      plan.push(step, command);
    }
  }
}

/// `${prefix}` is the package install directory; `${jobs}` the parallelism.
fn template_variables(variables: &VariableTable) -> VariableTable {
  let mut vars = VariableTable::new();
  vars.set("prefix", variables.get("install_dir").unwrap_or_default());
  vars.set("jobs", variables.get("jobs").unwrap_or_default());
  vars
}

fn render(system: &ExportedBuildSystem, step: BuildStep, vars: &VariableTable) -> Option<String> {
  let (command, options) = system.template(step)?;
  if command.trim().is_empty() {
    return None;
  }
  let joined = std::iter::once(command)
    .chain(options.iter().map(String::as_str))
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ");
  Some(vars.expand(&joined))
}
