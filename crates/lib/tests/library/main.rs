//! Library-level integration tests: manifests on disk, a host-backed
//! runtime, and the public install API end to end.

#![cfg(unix)]

mod common;
mod install_tests;
