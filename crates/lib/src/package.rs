//! Package descriptors.
//!
//! Every package is identified by a descriptor of the fixed form
//! `name@namespace@version`. The parsed triple is the key for the
//! per-session processed set and for every on-disk location.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors that can occur while parsing a package descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackageSpecError {
  #[error("invalid package descriptor '{descriptor}': expected 'name@namespace@version', found {fields} field(s)")]
  FieldCount { descriptor: String, fields: usize },

  #[error("invalid package descriptor '{descriptor}': {field} must not be empty")]
  EmptyField { descriptor: String, field: &'static str },
}

/// An immutable `{name, namespace, version}` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageSpec {
  pub name: String,
  pub namespace: String,
  pub version: String,
}

impl PackageSpec {
  pub fn new(name: impl Into<String>, namespace: impl Into<String>, version: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      namespace: namespace.into(),
      version: version.into(),
    }
  }

  /// Parse a `name@namespace@version` descriptor.
  ///
  /// # Errors
  ///
  /// Returns an error if the descriptor does not have exactly three
  /// `@`-separated fields or if any field is empty.
  pub fn parse(descriptor: &str) -> Result<Self, PackageSpecError> {
    let parts: Vec<&str> = descriptor.split('@').collect();
    let [name, namespace, version] = parts.as_slice() else {
      return Err(PackageSpecError::FieldCount {
        descriptor: descriptor.to_string(),
        fields: parts.len(),
      });
    };

    for (field, value) in [("name", name), ("namespace", namespace), ("version", version)] {
      if value.is_empty() {
        return Err(PackageSpecError::EmptyField {
          descriptor: descriptor.to_string(),
          field,
        });
      }
    }

    Ok(Self::new(*name, *namespace, *version))
  }
}

impl fmt::Display for PackageSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}@{}@{}", self.name, self.namespace, self.version)
  }
}

impl FromStr for PackageSpec {
  type Err = PackageSpecError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}
