mod create;
mod init;
mod install;

pub use create::{cmd_create_port, cmd_create_project};
pub use init::cmd_init;
pub use install::cmd_install;
