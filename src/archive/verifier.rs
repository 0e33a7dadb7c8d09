//! Candidate verification against one archive member

use crate::error::{VerifyError, VerifyResult};
use std::fs::File;
use std::io::{self, BufReader, Read};
use zip::result::ZipError;
use zip::ZipArchive;

use super::target::ArchiveMember;

/// Tests password candidates
///
/// A wrong password is `Ok(false)`. `Err` is reserved for failures that
/// have nothing to do with the candidate (the archive vanished, a read
/// failed at the OS level) and stops the owning worker.
pub trait Verifier {
    fn verify(&mut self, candidate: &[u8]) -> VerifyResult<bool>;
}

/// Opens one verifier per worker
///
/// Verifiers are not shared: each worker thread opens its own and drops
/// it when it exits.
pub trait VerifierFactory: Send + Sync + 'static {
    type Verifier: Verifier;

    fn open(&self, worker: usize) -> VerifyResult<Self::Verifier>;
}

/// Verifier holding a private handle on the archive
pub struct ZipVerifier {
    archive: ZipArchive<BufReader<File>>,
    member: ArchiveMember,

    /// Reused across attempts
    buffer: Vec<u8>,
}

impl ZipVerifier {
    pub(crate) fn new(archive: ZipArchive<BufReader<File>>, member: ArchiveMember) -> Self {
        let capacity = member.size.min(1 << 20) as usize;
        Self {
            archive,
            member,
            buffer: Vec::with_capacity(capacity),
        }
    }
}

impl Verifier for ZipVerifier {
    fn verify(&mut self, candidate: &[u8]) -> VerifyResult<bool> {
        let mut entry = match self.archive.by_index_decrypt(self.member.index, candidate) {
            Ok(entry) => entry,
            Err(ZipError::Io(e)) => return classify_io(&self.member.name, e),
            // Wrong password, or a header that only decodes under the right one
            Err(_) => return Ok(false),
        };

        // ZipCrypto accepts about 1 in 256 wrong passwords at the header
        // check. Reading to the end validates the CRC and rejects them.
        self.buffer.clear();
        match entry.read_to_end(&mut self.buffer) {
            Ok(_) => Ok(true),
            Err(e) => classify_io(&self.member.name, e),
        }
    }
}

/// OS-level failures are fatal; everything else is a corrupt stream from a wrong key
fn classify_io(member: &str, error: io::Error) -> VerifyResult<bool> {
    if error.raw_os_error().is_some() {
        Err(VerifyError::Io {
            member: member.to_string(),
            source: error,
        })
    } else {
        Ok(false)
    }
}
