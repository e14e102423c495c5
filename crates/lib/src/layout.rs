//! Repository layout.
//!
//! Every persisted location kiln reads or writes is derived from a single
//! repository root:
//!
//! ```text
//! <root>/
//! ├── kiln.toml                              # global configuration
//! ├── port/<namespace>/<name>/<version>/
//! │   └── port.toml                          # package manifest
//! ├── buildtrees/<name>/<version>/           # scratch build directory
//! │   └── _downloads/                        # fetched artifacts
//! └── packages/<name>/<version>/             # install tree (cache-hit marker)
//! ```

use std::path::{Path, PathBuf};

use crate::consts::{BUILDTREES_DIR, CONFIG_FILE, DOWNLOADS_DIR, MANIFEST_FILE, PACKAGES_DIR, PORT_DIR, ROOT_ENV};
use crate::package::PackageSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLayout {
  root: PathBuf,
}

impl RepoLayout {
  /// Use `root` as the repository root, made absolute.
  pub fn from_root(root: impl AsRef<Path>) -> std::io::Result<Self> {
    let root = root.as_ref();
    let root = if root.is_absolute() {
      root.to_path_buf()
    } else {
      std::env::current_dir()?.join(root)
    };
    let root = dunce::canonicalize(&root).unwrap_or(root);
    Ok(Self { root })
  }

  /// Locate the repository root.
  ///
  /// Precedence: explicit `root`, then the `KILN_ROOT` environment variable,
  /// then the current directory.
  pub fn discover(root: Option<&Path>) -> std::io::Result<Self> {
    if let Some(root) = root {
      return Self::from_root(root);
    }
    if let Ok(root) = std::env::var(ROOT_ENV) {
      return Self::from_root(root);
    }
    Self::from_root(std::env::current_dir()?)
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn config_path(&self) -> PathBuf {
    self.root.join(CONFIG_FILE)
  }

  pub fn packages_root(&self) -> PathBuf {
    self.root.join(PACKAGES_DIR)
  }

  pub fn buildtrees_root(&self) -> PathBuf {
    self.root.join(BUILDTREES_DIR)
  }

  /// `<root>/packages/<name>/<version>`; its existence is the cache-hit signal.
  pub fn install_dir(&self, spec: &PackageSpec) -> PathBuf {
    self.packages_root().join(&spec.name).join(&spec.version)
  }

  pub fn build_dir(&self, spec: &PackageSpec) -> PathBuf {
    self.buildtrees_root().join(&spec.name).join(&spec.version)
  }

  pub fn downloads_dir(&self, spec: &PackageSpec) -> PathBuf {
    self.build_dir(spec).join(DOWNLOADS_DIR)
  }

  pub fn manifest_dir(&self, spec: &PackageSpec) -> PathBuf {
    self
      .root
      .join(PORT_DIR)
      .join(&spec.namespace)
      .join(&spec.name)
      .join(&spec.version)
  }

  pub fn manifest_path(&self, spec: &PackageSpec) -> PathBuf {
    self.manifest_dir(spec).join(MANIFEST_FILE)
  }
}
