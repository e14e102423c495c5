//! Names and defaults shared across the crate.

/// Global configuration file at the repository root.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Manifest file inside `port/<namespace>/<name>/<version>/`.
pub const MANIFEST_FILE: &str = "port.toml";

pub const PORT_DIR: &str = "port";
pub const PACKAGES_DIR: &str = "packages";
pub const BUILDTREES_DIR: &str = "buildtrees";

/// Fetched artifacts land in `<build_dir>/_downloads`.
pub const DOWNLOADS_DIR: &str = "_downloads";

/// Environment variable overriding the repository root.
pub const ROOT_ENV: &str = "KILN_ROOT";

pub const DEFAULT_IMAGE: &str = "gcc:latest";
pub const DEFAULT_NETWORK: &str = "host";
pub const DEFAULT_CONTAINER_CLI: &str = "docker";
pub const DEFAULT_CONTAINER_SHELL: &str = "bash";

pub const SESSION_PREFIX: &str = "kiln-session";

pub const DEFAULT_CONF_REPO: &str = "https://github.com/adjfangjiawei/gcpkgconf.git";

/// Meta-command keyword that downloads a URL.
pub const FETCH_KEYWORD: &str = "kiln_fetch";

/// Meta-command keyword that unpacks an archive into the build directory.
pub const EXTRACT_KEYWORD: &str = "kiln_extract";
