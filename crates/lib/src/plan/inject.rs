//! Dependency-injected commands.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::{BuildPlan, BuildStep, dependency_manifests};
use crate::config::PortManifest;
use crate::layout::RepoLayout;

/// Prepend every inject rule declared by the package's dependencies.
///
/// Commands are gathered per step in declaration order (dependency, then
/// rule, then command) and prepended as one block, so injected commands run
/// in that order ahead of the package's own. A dependency never injects into
/// its own plan.
pub(super) fn apply_injects(plan: &mut BuildPlan, layout: &RepoLayout, manifest: &PortManifest) {
  let mut injected: BTreeMap<BuildStep, Vec<String>> = BTreeMap::new();

  for (dependency, dep_manifest) in dependency_manifests(layout, manifest) {
    for rule in dep_manifest.inject_rules() {
      let Some(step) = BuildStep::from_name(&rule.step) else {
        warn!(dependency = %dependency, step = %rule.step, "ignoring inject rule for unknown step");
        continue;
      };
      debug!(dependency = %dependency, step = %step, count = rule.command.len(), "injecting commands");
      injected.entry(step).or_default().extend(rule.command.iter().cloned());
    }
  }

  for (step, commands) in injected {
    plan.prepend(step, commands);
  }
}
