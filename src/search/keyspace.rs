//! Keyspace enumeration and partitioning
//!
//! The keyspace is every string of `length` symbols over `alphabet`. It is
//! split by fixed-length prefix: all prefixes of length `p` are numbered in
//! lexicographic order and prefix `i` goes to partition `i % partitions`.
//! Each partition then walks `(prefix, suffix)` in lexicographic order.
//!
//! ```text
//! alphabet = "01", length = 3, 2 workers, p = 2
//!
//!   prefixes 0 ("00"), 2 ("10") -> partition 0: 000 001 100 101
//!   prefixes 1 ("01"), 3 ("11") -> partition 1: 010 011 110 111
//! ```

use crate::error::ConfigError;
use std::sync::Arc;

/// Prefixes generated per worker, when the length allows it
const PREFIXES_PER_WORKER: u64 = 8;

/// Every candidate of a fixed length over an ordered alphabet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyspace {
    alphabet: Vec<char>,
    length: usize,
    size: u64,
}

impl Keyspace {
    /// Create a keyspace, validating the alphabet and length
    pub fn new(alphabet: &str, length: usize) -> Result<Self, ConfigError> {
        let mut symbols: Vec<char> = Vec::with_capacity(alphabet.len());
        for symbol in alphabet.chars() {
            if symbols.contains(&symbol) {
                return Err(ConfigError::DuplicateSymbol { symbol });
            }
            symbols.push(symbol);
        }

        if symbols.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        if length == 0 {
            return Err(ConfigError::InvalidLength { length });
        }

        let size = checked_power(symbols.len() as u64, length).ok_or(
            ConfigError::KeyspaceTooLarge {
                symbols: symbols.len(),
                length,
            },
        )?;

        Ok(Self {
            alphabet: symbols,
            length,
            size,
        })
    }

    /// Ordered symbols
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Alphabet as a string
    pub fn alphabet_string(&self) -> String {
        self.alphabet.iter().collect()
    }

    /// Candidate length
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of candidates (`|alphabet|^length`)
    pub fn size(&self) -> u64 {
        self.size
    }

    fn radix(&self) -> u64 {
        self.alphabet.len() as u64
    }

    /// Write the base-|alphabet| digits of `index` into `digits` (most significant first)
    fn decompose(&self, mut index: u64, digits: &mut [usize]) {
        let radix = self.radix();
        for digit in digits.iter_mut().rev() {
            *digit = (index % radix) as usize;
            index /= radix;
        }
    }
}

fn checked_power(base: u64, exponent: usize) -> Option<u64> {
    let exponent = u32::try_from(exponent).ok()?;
    base.checked_pow(exponent)
}

/// A disjoint, prefix-defined subset of the keyspace owned by one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    index: usize,
    prefix_len: usize,
    prefixes: Vec<u64>,
    keyspace: Arc<Keyspace>,
}

impl Partition {
    /// Partition number (also the owning worker's id)
    pub fn index(&self) -> usize {
        self.index
    }

    /// Length of the fixed prefix
    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    /// Lexicographic indices of the owned prefixes
    pub fn prefixes(&self) -> &[u64] {
        &self.prefixes
    }

    /// Number of candidates in this partition
    pub fn len(&self) -> u64 {
        let suffix_len = self.keyspace.length - self.prefix_len;
        // Bounded by the keyspace size, which already fits in u64
        let per_prefix = self.keyspace.radix().pow(suffix_len as u32);
        self.prefixes.len() as u64 * per_prefix
    }

    /// True if the partition owns no candidates
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Cursor over this partition's candidates, reusing one buffer
    pub fn cursor(&self) -> CandidateCursor<'_> {
        CandidateCursor::new(self)
    }

    /// Owned candidates in lexicographic order (allocates per candidate)
    pub fn candidates(&self) -> impl Iterator<Item = String> + '_ {
        let mut cursor = self.cursor();
        std::iter::from_fn(move || cursor.next_candidate().map(str::to_owned))
    }
}

/// Splits a keyspace into worker partitions
#[derive(Debug, Clone, Copy, Default)]
pub struct Partitioner;

impl Partitioner {
    /// Choose the prefix length for `worker_count` workers
    ///
    /// Smallest `p` giving at least [`PREFIXES_PER_WORKER`] prefixes per
    /// worker, capped at `length - 1` so that a suffix position remains.
    pub fn prefix_len(keyspace: &Keyspace, worker_count: usize) -> usize {
        let max_len = keyspace.length - 1;
        let target = (worker_count.max(1) as u64).saturating_mul(PREFIXES_PER_WORKER);

        let mut prefix_len = 0;
        let mut prefixes: u64 = 1;
        while prefix_len < max_len && prefixes < target {
            prefix_len += 1;
            prefixes = prefixes.saturating_mul(keyspace.radix());
        }
        prefix_len
    }

    /// Split `keyspace` into at most `worker_count` partitions
    ///
    /// Produces exactly `worker_count` partitions unless there are fewer
    /// prefixes than workers, in which case one partition per prefix.
    pub fn partition(keyspace: &Keyspace, worker_count: usize) -> Vec<Partition> {
        let keyspace = Arc::new(keyspace.clone());
        let prefix_len = Self::prefix_len(&keyspace, worker_count);
        let prefix_count = keyspace.radix().pow(prefix_len as u32);

        let partition_count = (worker_count.max(1) as u64).min(prefix_count) as usize;
        let mut prefixes: Vec<Vec<u64>> = vec![Vec::new(); partition_count];
        for prefix in 0..prefix_count {
            prefixes[(prefix % partition_count as u64) as usize].push(prefix);
        }

        prefixes
            .into_iter()
            .enumerate()
            .map(|(index, prefixes)| Partition {
                index,
                prefix_len,
                prefixes,
                keyspace: Arc::clone(&keyspace),
            })
            .collect()
    }
}

/// Lazily walks a partition's candidates in `(prefix, suffix)` order
///
/// Keeps one odometer of alphabet indices and one string buffer, so
/// producing a candidate does not allocate.
pub struct CandidateCursor<'a> {
    partition: &'a Partition,

    /// Position in `partition.prefixes` of the prefix being walked
    prefix_pos: usize,

    /// Alphabet indices of the current candidate
    digits: Vec<usize>,

    buffer: String,

    /// False until the first candidate of the current prefix is produced
    started: bool,
}

impl<'a> CandidateCursor<'a> {
    fn new(partition: &'a Partition) -> Self {
        let length = partition.keyspace.length;
        let max_symbol_len = partition
            .keyspace
            .alphabet
            .iter()
            .map(|c| c.len_utf8())
            .max()
            .unwrap_or(1);

        Self {
            partition,
            prefix_pos: 0,
            digits: vec![0; length],
            buffer: String::with_capacity(length * max_symbol_len),
            started: false,
        }
    }

    /// Advance to the next candidate; `None` once the partition is exhausted
    pub fn next_candidate(&mut self) -> Option<&str> {
        let partition: &'a Partition = self.partition;
        let keyspace = &partition.keyspace;
        let prefix_len = partition.prefix_len;

        if !self.started {
            let prefix = *partition.prefixes.get(self.prefix_pos)?;
            keyspace.decompose(prefix, &mut self.digits[..prefix_len]);
            self.digits[prefix_len..].fill(0);
            self.started = true;
        } else if !self.increment_suffix() {
            self.prefix_pos += 1;
            self.started = false;
            return self.next_candidate();
        }

        self.buffer.clear();
        self.buffer
            .extend(self.digits.iter().map(|&d| keyspace.alphabet[d]));
        Some(&self.buffer)
    }

    /// Odometer step over the suffix digits; false on wrap-around
    fn increment_suffix(&mut self) -> bool {
        let radix = self.partition.keyspace.alphabet.len();
        let prefix_len = self.partition.prefix_len;

        for digit in self.digits[prefix_len..].iter_mut().rev() {
            *digit += 1;
            if *digit < radix {
                return true;
            }
            *digit = 0;
        }
        false
    }
}
