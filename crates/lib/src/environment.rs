//! Per-package build environment.
//!
//! Before a package is built its scratch and install directories are created,
//! a fresh [`VariableTable`] is populated, and a shell prefix is synthesized
//! that puts every dependency's install tree on the usual search paths.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{GlobalConfig, PortManifest};
use crate::layout::RepoLayout;
use crate::package::PackageSpec;
use crate::placeholder::VariableTable;

/// Variables and the search-path prefix used while building one package.
#[derive(Debug, Clone)]
pub struct EnvironmentContext {
  pub variables: VariableTable,
  /// `export ...; ` prefix for every shell command, or empty.
  pub env_prefix: String,
  pub build_dir: PathBuf,
  pub install_dir: PathBuf,
  pub proxy: Option<String>,
  pub jobs: usize,
}

/// Subdirectories probed in each dependency install tree, and the variables they feed.
const SEARCH_DIRS: &[(&str, SearchKind)] = &[
  ("bin", SearchKind::Bin),
  ("include", SearchKind::Include),
  ("lib", SearchKind::Lib),
  ("lib64", SearchKind::Lib),
  ("lib/pkgconfig", SearchKind::PkgConfig),
  ("share/pkgconfig", SearchKind::PkgConfig),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchKind {
  Bin,
  Include,
  Lib,
  PkgConfig,
}

/// Variables emitted in this order, each fed by one accumulator.
const EXPORTS: &[(&str, SearchKind)] = &[
  ("PATH", SearchKind::Bin),
  ("LD_LIBRARY_PATH", SearchKind::Lib),
  ("LIBRARY_PATH", SearchKind::Lib),
  ("C_INCLUDE_PATH", SearchKind::Include),
  ("CPLUS_INCLUDE_PATH", SearchKind::Include),
  ("PKG_CONFIG_PATH", SearchKind::PkgConfig),
];

/// Build the search-path prefix from dependency install directories.
///
/// Only subdirectories that exist contribute. Paths keep dependency order and
/// any pre-existing value of each variable is appended, not replaced. Paths
/// are escaped for a double-quoted shell word. Returns an empty string when
/// nothing was collected.
pub fn assemble_env_prefix(install_dirs: &[PathBuf]) -> String {
  let mut collected: Vec<(SearchKind, String)> = Vec::new();
  for dir in install_dirs {
    for (sub, kind) in SEARCH_DIRS {
      let path = dir.join(sub);
      if path.is_dir() {
        collected.push((*kind, escape_double_quoted(&path.to_string_lossy())));
      }
    }
  }

  let assignments: Vec<String> = EXPORTS
    .iter()
    .filter_map(|(var, kind)| {
      let paths: Vec<&str> = collected
        .iter()
        .filter(|(k, _)| k == kind)
        .map(|(_, p)| p.as_str())
        .collect();
      if paths.is_empty() {
        return None;
      }
      Some(format!("{var}=\"{}${{{var}:+:${var}}}\"", paths.join(":")))
    })
    .collect();

  if assignments.is_empty() {
    String::new()
  } else {
    format!("export {}; ", assignments.join(" "))
  }
}

/// Create the package directories and assemble its build environment.
///
/// `dependencies` are the already-resolved dependency descriptors in
/// declaration order.
pub async fn prepare_environment(
  layout: &RepoLayout,
  config: &GlobalConfig,
  spec: &PackageSpec,
  manifest: &PortManifest,
  dependencies: &[PackageSpec],
) -> std::io::Result<EnvironmentContext> {
  let build_dir = layout.build_dir(spec);
  let install_dir = layout.install_dir(spec);

  tokio::fs::create_dir_all(&build_dir).await?;
  tokio::fs::create_dir_all(&install_dir).await?;

  let jobs = config.jobs();
  let proxy = config.proxy().map(str::to_string);

  let mut variables = VariableTable::new();
  variables.set("kiln_root", path_str(layout.root()));
  variables.set("build_dir", path_str(&build_dir));
  variables.set("install_dir", path_str(&install_dir));
  variables.set("url", manifest.url().unwrap_or_default());
  variables.set("proxy", proxy.clone().unwrap_or_default());
  variables.set("jobs", jobs.to_string());
  variables.set("name", spec.name.as_str());
  variables.set("namespace", spec.namespace.as_str());
  variables.set("version", spec.version.as_str());
  variables.set("last_file", "");

  let dep_dirs: Vec<PathBuf> = dependencies.iter().map(|dep| layout.install_dir(dep)).collect();
  let env_prefix = assemble_env_prefix(&dep_dirs);
  debug!(package = %spec, prefix = %env_prefix, "assembled build environment");

  Ok(EnvironmentContext {
    variables,
    env_prefix,
    build_dir,
    install_dir,
    proxy,
    jobs,
  })
}

fn path_str(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}

/// Backslash-escape the characters that stay special inside `"..."`.
fn escape_double_quoted(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    if matches!(c, '\\' | '"' | '$' | '`') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}
