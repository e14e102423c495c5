//! Variable tables and `${name}` expansion.
//!
//! Build commands, working directories and meta-command arguments reference
//! per-package values through tokens such as `${build_dir}` or `${url}`. A
//! [`VariableTable`] maps each token to its value and [`expand`] substitutes
//! them.
//!
//! # Expansion Order
//!
//! Tokens are applied in lexicographic order of the token text. Each token is
//! replaced in a single left-to-right pass that resumes after the inserted
//! value, so a value containing its own token is never re-expanded. A token
//! applied later does see text inserted by an earlier one:
//!
//! ```
//! use kiln_lib::placeholder::VariableTable;
//!
//! let mut table = VariableTable::new();
//! table.set("a", "${b}");
//! table.set("b", "x");
//! assert_eq!(table.expand("${a}/${b}"), "x/x");
//! ```
//!
//! Unknown tokens and shell variables such as `$HOME` pass through unchanged.

use std::collections::BTreeMap;

/// Format `name` as its `${name}` token.
pub fn token(name: &str) -> String {
  format!("${{{name}}}")
}

/// Mapping from placeholder token to its expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
  entries: BTreeMap<String, String>,
}

impl VariableTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Bind `${name}` to `value`, replacing any previous binding.
  pub fn set(&mut self, name: &str, value: impl Into<String>) {
    self.entries.insert(token(name), value.into());
  }

  /// Look up the value bound to `${name}`.
  pub fn get(&self, name: &str) -> Option<&str> {
    self.entries.get(&token(name)).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Iterate `(token, value)` pairs in application order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn expand(&self, text: &str) -> String {
    expand(text, self)
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableTable {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self {
      entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
    }
  }
}

/// Replace every occurrence of each token in `table` within `text`.
pub fn expand(text: &str, table: &VariableTable) -> String {
  let mut result = text.to_string();
  for (token, value) in table.iter() {
    // An empty pattern would match between every character.
    if token.is_empty() || !result.contains(token) {
      continue;
    }
    // `str::replace` scans the input once and never revisits inserted text.
    result = result.replace(token, value);
  }
  result
}
