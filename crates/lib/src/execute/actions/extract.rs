//! Extract meta-command.
//!
//! Unpacks an archive into the package build directory, keeping the archive's
//! own top-level layout. The format is taken from the file's leading bytes,
//! falling back to the file name. Supported formats:
//! - tar, optionally compressed with gzip, bzip2, xz or zstd
//! - zip

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use tar::Archive;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use xz2::read::XzDecoder;

use crate::execute::types::ExecuteError;

/// Bytes needed to recognise every supported format (the tar magic sits at 257).
const SNIFF_LEN: u64 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveKind {
  TarGz,
  TarBz2,
  TarXz,
  TarZst,
  Tar,
  Zip,
}

impl ArchiveKind {
  /// Recognise an archive from its leading bytes.
  fn sniff(head: &[u8]) -> Option<Self> {
    if head.starts_with(&[0x1f, 0x8b]) {
      Some(Self::TarGz)
    } else if head.starts_with(b"BZh") {
      Some(Self::TarBz2)
    } else if head.starts_with(&[0xfd, b'7', b'z', b'X', b'Z', 0x00]) {
      Some(Self::TarXz)
    } else if head.starts_with(&[0x28, 0xb5, 0x2f, 0xfd]) {
      Some(Self::TarZst)
    } else if head.starts_with(b"PK\x03\x04") || head.starts_with(b"PK\x05\x06") {
      Some(Self::Zip)
    } else if head.get(257..262) == Some(b"ustar".as_slice()) {
      Some(Self::Tar)
    } else {
      None
    }
  }

  fn from_extension(path: &Path) -> Option<Self> {
    let name = path.file_name()?.to_str()?.to_ascii_lowercase();
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
      Some(Self::TarGz)
    } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
      Some(Self::TarBz2)
    } else if name.ends_with(".tar.xz") || name.ends_with(".txz") {
      Some(Self::TarXz)
    } else if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
      Some(Self::TarZst)
    } else if name.ends_with(".tar") {
      Some(Self::Tar)
    } else if name.ends_with(".zip") {
      Some(Self::Zip)
    } else {
      None
    }
  }
}

/// Unpack `archive` into `dest`, creating `dest` if needed.
///
/// Permissions, modification times and extended attributes recorded in tar
/// archives are preserved. Runs on the blocking pool.
pub async fn execute_extract(archive: &Path, dest: &Path) -> Result<(), ExecuteError> {
  let failed = |message: String| ExecuteError::ExtractFailed {
    archive: archive.to_path_buf(),
    message,
  };

  let file = tokio::fs::File::open(archive).await.map_err(|e| failed(e.to_string()))?;
  let mut head = Vec::with_capacity(SNIFF_LEN as usize);
  file
    .take(SNIFF_LEN)
    .read_to_end(&mut head)
    .await
    .map_err(|e| failed(e.to_string()))?;

  let kind = ArchiveKind::sniff(&head)
    .or_else(|| ArchiveKind::from_extension(archive))
    .ok_or_else(|| ExecuteError::UnsupportedArchive(archive.to_path_buf()))?;

  info!(archive = ?archive, dest = ?dest, "extracting archive");
  debug!(archive = ?archive, kind = ?kind, "detected archive format");

  let archive_path = archive.to_path_buf();
  let dest_path = dest.to_path_buf();
  tokio::task::spawn_blocking(move || unpack(kind, &archive_path, &dest_path))
    .await
    .map_err(|e| failed(e.to_string()))?
    .map_err(|e| failed(e.to_string()))?;

  info!(archive = ?archive, "extraction complete");
  Ok(())
}

fn unpack(kind: ArchiveKind, archive: &Path, dest: &Path) -> std::io::Result<()> {
  std::fs::create_dir_all(dest)?;
  let file = BufReader::new(File::open(archive)?);
  match kind {
    ArchiveKind::TarGz => unpack_tar(GzDecoder::new(file), dest),
    ArchiveKind::TarBz2 => unpack_tar(BzDecoder::new(file), dest),
    ArchiveKind::TarXz => unpack_tar(XzDecoder::new(file), dest),
    ArchiveKind::TarZst => unpack_tar(zstd::stream::read::Decoder::with_buffer(file)?, dest),
    ArchiveKind::Tar => unpack_tar(file, dest),
    ArchiveKind::Zip => unpack_zip(file, dest),
  }
}

fn unpack_tar<R: Read>(reader: R, dest: &Path) -> std::io::Result<()> {
  let mut archive = Archive::new(reader);
  archive.set_preserve_permissions(true);
  archive.set_preserve_mtime(true);
  archive.set_unpack_xattrs(true);
  archive.unpack(dest)
}

fn unpack_zip<R: Read + Seek>(reader: R, dest: &Path) -> std::io::Result<()> {
  let mut zip = zip::ZipArchive::new(reader).map_err(std::io::Error::other)?;
  zip.extract(dest).map_err(std::io::Error::other)
}

/// Path the extract argument refers to, resolved against the build directory
/// when relative.
pub(crate) fn archive_path(arg: &str, build_dir: &Path) -> PathBuf {
  let path = Path::new(arg.trim());
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    build_dir.join(path)
  }
}
