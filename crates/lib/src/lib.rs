//! kiln-lib: Core types and logic for kiln
//!
//! kiln is a source-based package manager that builds every package inside a
//! disposable container. This crate provides:
//! - `PackageSpec`: the `name@namespace@version` descriptor
//! - `PortManifest`: the per-package build/dependency manifest
//! - `BuildPlan`: the compiled, ordered per-step command list
//! - `DependencyResolver`: depth-first, cached, cycle-guarded installation
//! - `install`: the session orchestrator owning the container lifecycle

pub mod config;
pub mod consts;
pub mod environment;
pub mod execute;
pub mod init;
pub mod layout;
pub mod package;
pub mod placeholder;
pub mod plan;
pub mod resolve;
pub mod runtime;
pub mod session;
pub mod util;
