//! Fetch meta-command.
//!
//! Downloads a URL into the package's `_downloads` directory, optionally
//! through a proxy.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::execute::types::ExecuteError;
use crate::util::hash::hash_bytes;

/// Download `url` into `downloads_dir` and return the destination path.
///
/// The directory is created if needed. An existing file of the same name is
/// overwritten.
pub async fn execute_fetch(url: &str, downloads_dir: &Path, proxy: Option<&str>) -> Result<PathBuf, ExecuteError> {
  let failed = |message: String| ExecuteError::FetchFailed {
    url: url.to_string(),
    message,
  };

  if url.trim().is_empty() {
    return Err(failed("empty url".to_string()));
  }

  info!(url = %url, proxy = ?proxy, "fetching URL");

  fs::create_dir_all(downloads_dir).await?;
  let dest_path = downloads_dir.join(url_to_filename(url));

  let mut builder = reqwest::Client::builder();
  if let Some(proxy) = proxy {
    let proxy = reqwest::Proxy::all(proxy).map_err(|e| failed(format!("invalid proxy '{proxy}': {e}")))?;
    builder = builder.proxy(proxy);
  }
  let client = builder.build().map_err(|e| failed(e.to_string()))?;

  let response = client.get(url).send().await.map_err(|e| failed(e.to_string()))?;
  if !response.status().is_success() {
    return Err(failed(format!("HTTP {}", response.status())));
  }

  let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

  let mut file = fs::File::create(&dest_path).await?;
  file.write_all(&bytes).await?;
  file.flush().await?;

  info!(path = ?dest_path, size = bytes.len(), sha256 = %hash_bytes(&bytes), "download complete");

  Ok(dest_path)
}

/// Convert a URL to a safe filename.
///
/// Takes the last path component and sanitizes it. Falls back to a hash of
/// the URL if no suitable filename can be extracted.
pub(crate) fn url_to_filename(url: &str) -> String {
  if let Some(filename) = url.rsplit('/').next() {
    let filename = filename.split(['?', '#']).next().unwrap_or(filename);

    // Only alphanumerics, dash, underscore and dot survive.
    let sanitized: String = filename
      .chars()
      .map(|c| {
        if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
          c
        } else {
          '_'
        }
      })
      .collect();

    if !sanitized.is_empty() && sanitized != "." && sanitized != ".." {
      return sanitized;
    }
  }

  format!("download_{}", &hash_bytes(url.as_bytes())[..16])
}
