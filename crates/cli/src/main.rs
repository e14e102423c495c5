mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kiln_lib::consts::DEFAULT_CONF_REPO;

use crate::output::print_error;

/// kiln - source-based package manager building every package in a container
#[derive(Parser)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Repository root (default: $KILN_ROOT, else the current directory)
  #[arg(long, global = true)]
  root: Option<PathBuf>,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build and install a package and its dependencies
  Install {
    /// Package descriptor (name@namespace@version)
    spec: String,
  },

  /// Scaffold a project configuration or a package manifest
  Create(CreateArgs),

  /// Clone a configuration repository of ready-made manifests
  Init {
    /// Git URL of the configuration repository
    #[arg(long, default_value = DEFAULT_CONF_REPO)]
    conf: String,

    /// Directory to clone into
    #[arg(long, default_value = "./kiln")]
    dest: PathBuf,
  },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct CreateArgs {
  /// Write kiln.toml for a new project with this name
  #[arg(long)]
  project: Option<String>,

  /// Write an empty manifest for this descriptor (name@namespace@version)
  #[arg(long)]
  port: Option<String>,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn run(cli: Cli) -> Result<()> {
  let root = cli.root.as_deref();
  match cli.command {
    Commands::Install { spec } => cmd::cmd_install(root, &spec),
    Commands::Create(CreateArgs {
      project: Some(project), ..
    }) => cmd::cmd_create_project(root, &project),
    // The argument group guarantees `--port` is present here.
    Commands::Create(CreateArgs { port, .. }) => cmd::cmd_create_port(root, port.as_deref().unwrap_or_default()),
    Commands::Init { conf, dest } => cmd::cmd_init(&conf, &dest),
  }
}
