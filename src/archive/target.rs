//! Archive inspection and member selection

use crate::error::{ConfigError, VerifyError, VerifyResult};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

use super::verifier::{VerifierFactory, ZipVerifier};

/// One entry of the archive's central directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Position in the central directory
    pub index: usize,

    /// Entry name
    pub name: String,

    /// Stored (compressed) size in bytes
    pub compressed_size: u64,

    /// Uncompressed size in bytes
    pub size: u64,

    /// Entry is password protected
    pub encrypted: bool,

    /// Entry is a directory
    pub is_dir: bool,
}

/// Pick the member that is cheapest to test
///
/// Smallest stored size among encrypted files; ties go to the lowest index.
pub fn select_member(members: &[ArchiveMember]) -> Option<&ArchiveMember> {
    members
        .iter()
        .filter(|m| m.encrypted && !m.is_dir)
        .min_by_key(|m| (m.compressed_size, m.index))
}

/// An inspected archive and the member every worker tests against
#[derive(Debug, Clone)]
pub struct ArchiveTarget {
    path: PathBuf,
    member: ArchiveMember,
    member_count: usize,
}

impl ArchiveTarget {
    /// Open the archive, list its members and select one
    ///
    /// Every failure here is a configuration error: nothing has been
    /// spawned yet and there is nothing to retry.
    pub fn inspect(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(ConfigError::ArchiveNotFound { path });
        }

        let invalid = |reason: String| ConfigError::InvalidArchive {
            path: path.clone(),
            reason,
        };

        let file = File::open(&path).map_err(|e| invalid(e.to_string()))?;
        let mut archive =
            ZipArchive::new(BufReader::new(file)).map_err(|e| invalid(e.to_string()))?;

        if archive.len() == 0 {
            return Err(ConfigError::EmptyArchive { path: path.clone() });
        }

        let mut members = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| invalid(e.to_string()))?;

            members.push(ArchiveMember {
                index,
                name: entry.name().to_string(),
                compressed_size: entry.compressed_size(),
                size: entry.size(),
                encrypted: entry.encrypted(),
                is_dir: entry.is_dir(),
            });
        }

        let member = select_member(&members)
            .cloned()
            .ok_or_else(|| ConfigError::NotEncrypted { path: path.clone() })?;

        debug!(
            archive = %path.display(),
            member = %member.name,
            stored_bytes = member.compressed_size,
            members = members.len(),
            "Selected archive member"
        );

        Ok(Self {
            path,
            member,
            member_count: members.len(),
        })
    }

    /// Archive path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Member tested by every worker
    pub fn member(&self) -> &ArchiveMember {
        &self.member
    }

    /// Number of entries in the archive
    pub fn member_count(&self) -> usize {
        self.member_count
    }
}

impl VerifierFactory for ArchiveTarget {
    type Verifier = ZipVerifier;

    fn open(&self, _worker: usize) -> VerifyResult<ZipVerifier> {
        let file = File::open(&self.path).map_err(|e| VerifyError::Open {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let archive = ZipArchive::new(BufReader::new(file)).map_err(|e| VerifyError::Open {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        Ok(ZipVerifier::new(archive, self.member.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(index: usize, compressed_size: u64, encrypted: bool, is_dir: bool) -> ArchiveMember {
        ArchiveMember {
            index,
            name: format!("entry-{}", index),
            compressed_size,
            size: compressed_size,
            encrypted,
            is_dir,
        }
    }

    #[test]
    fn test_select_smallest_encrypted_member() {
        let members = vec![
            member(0, 500, true, false),
            member(1, 20, false, false),
            member(2, 120, true, false),
            member(3, 0, true, true),
        ];

        let selected = select_member(&members).unwrap();
        assert_eq!(selected.index, 2);
    }

    #[test]
    fn test_select_breaks_ties_by_index() {
        let members = vec![member(4, 64, true, false), member(1, 64, true, false)];
        assert_eq!(select_member(&members).unwrap().index, 1);
    }

    #[test]
    fn test_select_none_when_unencrypted() {
        let members = vec![member(0, 10, false, false), member(1, 0, true, true)];
        assert!(select_member(&members).is_none());
        assert!(select_member(&[]).is_none());
    }

    #[test]
    fn test_inspect_missing_archive() {
        let err = ArchiveTarget::inspect("/nonexistent/archive.zip").unwrap_err();
        assert!(matches!(err, ConfigError::ArchiveNotFound { .. }));
    }
}
