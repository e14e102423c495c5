//! Header comments for scaffolded files.

/// Prepended to a new `kiln.toml`.
pub const PROJECT_HEADER: &str = "\
# kiln project configuration.
#
# [global].jobs sets the parallelism substituted for ${jobs}.
# [docker] selects the image every package is built in; proxy is used for
# kiln_fetch downloads and exposed to build commands as ${proxy}.

";

/// Prepended to a new `port.toml`. `{descriptor}` is replaced.
pub const PORT_HEADER: &str = "\
# Manifest for {descriptor}.
#
# Steps run in order: pre_configure, configure, pre_build, build, post_build,
# pre_install, install, post_install. Commands may use ${build_dir},
# ${install_dir}, ${url}, ${jobs}, ${last_file} and friends.
# `kiln_fetch <url>` downloads, `kiln_extract <archive>` unpacks into ${build_dir}.

";
