//! Shared utilities.
//!
//! Hashing for downloaded artifacts and test helpers.

pub mod hash;

#[cfg(test)]
pub mod testutil;
