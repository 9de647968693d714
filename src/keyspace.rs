use std::iter::FusedIterator;
use std::ops::Range;

use crate::charset::Charset;
use crate::error::{CrackError, Result};
use crate::MAX_LENGTH;

/// Every string over a charset with length `1..=max_length`, in a fixed global
/// order: ascending length, then the Cartesian power in charset order with the
/// leftmost position varying slowest.
///
/// Each candidate has a linear index in that order. Within one length the
/// index is a mixed-radix number whose digits are charset positions, so any
/// candidate can be computed from its index without walking from zero.
#[derive(Clone, Debug)]
pub struct Keyspace {
    charset: Charset,
    max_length: usize,
    // offsets[l] is the index of the first candidate of length l + 1;
    // offsets[max_length] is the total.
    offsets: Vec<u64>,
}

impl Keyspace {
    pub fn new(charset: Charset, max_length: usize) -> Result<Self> {
        if max_length == 0 {
            return Err(CrackError::invalid("max length must be at least 1"));
        }
        if max_length > MAX_LENGTH {
            return Err(CrackError::invalid(format!(
                "max length {max_length} exceeds the limit of {MAX_LENGTH}"
            )));
        }

        let overflow = || {
            CrackError::invalid(format!(
                "search space of {} characters up to length {max_length} exceeds 2^64 candidates",
                charset.len()
            ))
        };

        let base = charset.len() as u64;
        let mut offsets = vec![0u64];
        let mut per_length = 1u64;
        let mut total = 0u64;
        for _ in 1..=max_length {
            per_length = per_length.checked_mul(base).ok_or_else(overflow)?;
            total = total.checked_add(per_length).ok_or_else(overflow)?;
            offsets.push(total);
        }

        Ok(Self {
            charset,
            max_length,
            offsets,
        })
    }

    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Σ |charset|^L for L in 1..=max_length.
    pub fn total(&self) -> u64 {
        self.offsets[self.max_length]
    }

    /// Index range holding every candidate of `length`.
    pub fn length_range(&self, length: usize) -> Option<Range<u64>> {
        if length == 0 || length > self.max_length {
            return None;
        }
        Some(self.offsets[length - 1]..self.offsets[length])
    }

    fn length_of(&self, index: u64) -> usize {
        // offsets[0] == 0 so at least one offset is <= index
        self.offsets.partition_point(|&o| o <= index)
    }

    fn digits_at(&self, index: u64) -> Option<Vec<usize>> {
        if index >= self.total() {
            return None;
        }
        let length = self.length_of(index);
        let base = self.charset.len() as u64;
        let mut local = index - self.offsets[length - 1];
        let mut digits = vec![0usize; length];
        for digit in digits.iter_mut().rev() {
            *digit = (local % base) as usize;
            local /= base;
        }
        Some(digits)
    }

    /// The candidate at linear `index`, or `None` past the end.
    pub fn candidate_at(&self, index: u64) -> Option<String> {
        let chars = self.charset.chars();
        self.digits_at(index)
            .map(|digits| digits.into_iter().map(|d| chars[d]).collect())
    }

    /// Linear index of `candidate`, or `None` if it is not in this keyspace.
    pub fn index_of(&self, candidate: &str) -> Option<u64> {
        let length = candidate.chars().count();
        if length == 0 || length > self.max_length {
            return None;
        }
        let base = self.charset.len() as u64;
        let mut local = 0u64;
        for c in candidate.chars() {
            local = local * base + self.charset.position(c)? as u64;
        }
        Some(self.offsets[length - 1] + local)
    }

    pub fn iter(&self) -> Candidates<'_> {
        self.range(0..self.total())
    }

    /// Lazily yield the candidates whose indices fall in `range`. The range is
    /// clamped to the keyspace.
    pub fn range(&self, range: Range<u64>) -> Candidates<'_> {
        let end = range.end.min(self.total());
        let start = range.start.min(end);
        Candidates {
            chars: self.charset.chars(),
            next: start,
            end,
            digits: self.digits_at(start).unwrap_or_default(),
            buf: String::new(),
        }
    }

    /// Split the whole keyspace into `parts` contiguous ranges.
    pub fn partition(&self, parts: u64) -> Partition {
        Partition::new(0..self.total(), parts)
    }
}

impl<'a> IntoIterator for &'a Keyspace {
    type Item = String;
    type IntoIter = Candidates<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pull-based candidate stream over an index range of a [`Keyspace`].
pub struct Candidates<'a> {
    chars: &'a [char],
    next: u64,
    end: u64,
    // charset positions of the candidate at `next`
    digits: Vec<usize>,
    buf: String,
}

impl Candidates<'_> {
    /// Index of the candidate the next call will produce.
    pub fn position(&self) -> u64 {
        self.next
    }

    pub fn remaining(&self) -> u64 {
        self.end - self.next
    }

    /// Advance and borrow the next candidate along with its index. Reuses one
    /// buffer, so this is the form the search loop uses.
    pub fn next_candidate(&mut self) -> Option<(u64, &str)> {
        if self.next >= self.end {
            return None;
        }

        let chars = self.chars;
        self.buf.clear();
        self.buf.extend(self.digits.iter().map(|&d| chars[d]));

        let index = self.next;
        self.next += 1;
        self.increment();
        Some((index, &self.buf))
    }

    fn increment(&mut self) {
        let base = self.chars.len();
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < base {
                return;
            }
            *digit = 0;
        }
        // every position wrapped, so move on to the first candidate one longer
        let length = self.digits.len() + 1;
        self.digits.clear();
        self.digits.resize(length, 0);
    }
}

impl Iterator for Candidates<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.next_candidate().map(|(_, candidate)| candidate.to_owned())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Candidates<'_> {}

/// Disjoint contiguous sub-ranges that exactly cover an index range. Pieces
/// are computed on demand, so a partition of a huge keyspace costs nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    start: u64,
    len: u64,
    parts: u64,
}

impl Partition {
    /// `parts` is clamped to `1..=range length` so no piece is empty unless
    /// the range itself is.
    pub fn new(range: Range<u64>, parts: u64) -> Self {
        let len = range.end.saturating_sub(range.start);
        Self {
            start: range.start,
            len,
            parts: parts.clamp(1, len.max(1)),
        }
    }

    /// Pieces of roughly `chunk_size` candidates each.
    pub fn with_chunk_size(range: Range<u64>, chunk_size: u64) -> Self {
        let len = range.end.saturating_sub(range.start);
        Self::new(range, len.div_ceil(chunk_size.max(1)))
    }

    pub fn parts(&self) -> u64 {
        self.parts
    }

    /// The `i`-th piece. Pieces are in index order.
    pub fn get(&self, i: u64) -> Range<u64> {
        let i = i.min(self.parts);
        let bound = |k: u64| {
            self.start + ((self.len as u128 * k as u128) / self.parts as u128) as u64
        };
        bound(i)..bound((i + 1).min(self.parts))
    }

    pub fn iter(&self) -> impl Iterator<Item = Range<u64>> + '_ {
        (0..self.parts).map(|i| self.get(i))
    }
}
