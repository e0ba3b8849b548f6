//! Content-addressed store for raw measurement files.
//!
//! Files are keyed by the MD5 digest of their bytes and inserted at most once:
//! ingesting the same bytes again is a no-op, whatever the file is called.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};

use crate::error::Result;

/// One archived file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedFile {
    pub original_name: String,
    pub original_dir: String,
    pub creation_tstamp: DateTime<Utc>,
    /// `YYYYMMDD` of `creation_tstamp`.
    pub creation_date: u32,
    /// Lowercase hex MD5 of `contents`.
    pub digest: String,
    pub contents: Vec<u8>,
}

pub trait FileArchive {
    fn contains(&self, digest: &str) -> bool;
    fn get(&self, digest: &str) -> Option<&ArchivedFile>;
    /// Store `file`; callers check [`FileArchive::contains`] first.
    fn insert(&mut self, file: ArchivedFile) -> Result<()>;
}

/// In-process archive.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    files: BTreeMap<String, ArchivedFile>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileArchive for MemoryArchive {
    fn contains(&self, digest: &str) -> bool {
        self.files.contains_key(digest)
    }

    fn get(&self, digest: &str) -> Option<&ArchivedFile> {
        self.files.get(digest)
    }

    fn insert(&mut self, file: ArchivedFile) -> Result<()> {
        self.files.entry(file.digest.clone()).or_insert(file);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Inserted(String),
    /// Same bytes were already archived.
    Existing(String),
}

pub fn md5_hex(contents: &[u8]) -> String {
    format!("{:x}", Md5::digest(contents))
}

fn date_number(tstamp: &DateTime<Utc>) -> u32 {
    let text = tstamp.format("%Y%m%d").to_string();
    text.parse().unwrap_or_default()
}

/// Read `path` and add it to `archive` unless its digest is already there.
pub fn ingest_file(path: &Path, archive: &mut impl FileArchive) -> Result<IngestOutcome> {
    log::info!("processing file {}", path.display());
    let contents = std::fs::read(path)?;
    let digest = md5_hex(&contents);
    let original_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let original_dir = path
        .parent()
        .map(|d| d.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let Some(existing) = archive.get(&digest) {
        if existing.original_name != original_name || existing.original_dir != original_dir {
            log::warn!(
                "{} has the same contents as {}/{}",
                path.display(),
                existing.original_dir,
                existing.original_name
            );
        }
        log::debug!("{original_name} already loaded");
        return Ok(IngestOutcome::Existing(digest));
    }

    let creation_tstamp: DateTime<Utc> = std::fs::metadata(path)?.modified()?.into();
    archive.insert(ArchivedFile {
        original_name,
        original_dir,
        creation_date: date_number(&creation_tstamp),
        creation_tstamp,
        digest: digest.clone(),
        contents,
    })?;
    Ok(IngestOutcome::Inserted(digest))
}

/// Files under `root` whose extension is one of `extensions`, at most `depth`
/// directories below it (`None` for no limit), sorted.
pub fn scan_files(root: &Path, depth: Option<usize>, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![(root.to_path_buf(), 0usize)];
    while let Some((dir, level)) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                if depth.map_or(true, |d| level < d) {
                    pending.push((path, level + 1));
                }
            } else if path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
            {
                found.push(path);
            }
        }
    }
    found.sort();
    if !found.is_empty() {
        log::info!(
            "Scanning directory '{}'. Found {} files matching {:?}",
            root.display(),
            found.len(),
            extensions
        );
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_of_known_bytes() {
        assert_eq!(md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn same_bytes_are_archived_once() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "400 1.0\n").unwrap();
        std::fs::write(&b, "400 1.0\n").unwrap();

        let mut archive = MemoryArchive::new();
        let first = ingest_file(&a, &mut archive).unwrap();
        let second = ingest_file(&b, &mut archive).unwrap();
        assert!(matches!(first, IngestOutcome::Inserted(_)));
        assert!(matches!(second, IngestOutcome::Existing(_)));
        assert_eq!(archive.len(), 1);

        let IngestOutcome::Inserted(digest) = first else {
            unreachable!()
        };
        let stored = archive.get(&digest).unwrap();
        assert_eq!(stored.original_name, "a.txt");
        assert_eq!(stored.contents, b"400 1.0\n");
        assert!(stored.creation_date > 20000101);
    }

    #[test]
    fn scan_respects_depth_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("run1").join("raw");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("top.txt"), "x").unwrap();
        std::fs::write(dir.path().join("notes.md"), "x").unwrap();
        std::fs::write(dir.path().join("run1").join("mid.TXT"), "x").unwrap();
        std::fs::write(nested.join("deep.txt"), "x").unwrap();

        let shallow = scan_files(dir.path(), Some(1), &["txt"]).unwrap();
        assert_eq!(shallow.len(), 2);
        let all = scan_files(dir.path(), None, &["txt"]).unwrap();
        assert_eq!(all.len(), 3);
        let top = scan_files(dir.path(), Some(0), &["txt", "md"]).unwrap();
        assert_eq!(top.len(), 2);
    }
}
