//! End-to-end tests driving the `kiln` binary against a fake container CLI.

#![cfg(unix)]

mod common;
mod create_tests;
mod install_tests;
