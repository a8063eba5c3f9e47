// Path: crates/api/src/seq/mod.rs
//! The ordered byte-sequence capability.
//!
//! Keys and values may be backed by owned buffers, shared slices, views or
//! concatenations. Every representation exposes the same small capability
//! (`len`, `byte_at`, an optional contiguous view, an optional copy), and
//! equality, ordering and hashing are implemented once as free functions over
//! that capability, so two representations of the same bytes always compare
//! and hash identically.

use bytes::Bytes;
use hkv_types::error::ByteSeqError;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::Arc;

/// A readable, finite sequence of bytes.
pub trait ByteSeq: Send + Sync {
    /// A short name for the representation, used in error messages.
    fn kind(&self) -> &'static str;

    /// Number of bytes in the sequence.
    fn len(&self) -> usize;

    /// The byte at `index`, or `None` past the end.
    fn byte_at(&self, index: usize) -> Option<u8>;

    /// Returns true if the sequence holds no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bytes as one contiguous slice, if the representation has one.
    fn as_contiguous(&self) -> Option<&[u8]> {
        None
    }

    /// Copies the sequence into an owned buffer.
    ///
    /// Representations without a contiguous view must override this to
    /// support copying; the default reports the capability as unsupported.
    fn try_copy(&self) -> Result<Vec<u8>, ByteSeqError> {
        self.as_contiguous()
            .map(<[u8]>::to_vec)
            .ok_or(ByteSeqError::Unsupported {
                kind: self.kind(),
                capability: "copy",
            })
    }
}

impl ByteSeq for Vec<u8> {
    fn kind(&self) -> &'static str {
        "vec"
    }
    fn len(&self) -> usize {
        self.as_slice().len()
    }
    fn byte_at(&self, index: usize) -> Option<u8> {
        self.get(index).copied()
    }
    fn as_contiguous(&self) -> Option<&[u8]> {
        Some(self.as_slice())
    }
}

impl ByteSeq for Arc<[u8]> {
    fn kind(&self) -> &'static str {
        "shared"
    }
    fn len(&self) -> usize {
        self.as_ref().len()
    }
    fn byte_at(&self, index: usize) -> Option<u8> {
        self.get(index).copied()
    }
    fn as_contiguous(&self) -> Option<&[u8]> {
        Some(self.as_ref())
    }
}

impl ByteSeq for Bytes {
    fn kind(&self) -> &'static str {
        "bytes"
    }
    fn len(&self) -> usize {
        self.as_ref().len()
    }
    fn byte_at(&self, index: usize) -> Option<u8> {
        self.get(index).copied()
    }
    fn as_contiguous(&self) -> Option<&[u8]> {
        Some(self.as_ref())
    }
}

impl<'a> ByteSeq for &'a [u8] {
    fn kind(&self) -> &'static str {
        "slice"
    }
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }
    fn byte_at(&self, index: usize) -> Option<u8> {
        self.get(index).copied()
    }
    fn as_contiguous(&self) -> Option<&[u8]> {
        Some(*self)
    }
}

impl<const N: usize> ByteSeq for [u8; N] {
    fn kind(&self) -> &'static str {
        "array"
    }
    fn len(&self) -> usize {
        N
    }
    fn byte_at(&self, index: usize) -> Option<u8> {
        self.get(index).copied()
    }
    fn as_contiguous(&self) -> Option<&[u8]> {
        Some(self.as_slice())
    }
}

/// A window onto another sequence.
#[derive(Clone, Copy)]
pub struct SliceView<'a> {
    inner: &'a dyn ByteSeq,
    start: usize,
    end: usize,
}

impl<'a> SliceView<'a> {
    /// Creates a view of `inner[range]`.
    pub fn new(inner: &'a dyn ByteSeq, range: Range<usize>) -> Result<Self, ByteSeqError> {
        let len = inner.len();
        if range.start > range.end || range.end > len {
            return Err(ByteSeqError::OutOfBounds {
                start: range.start,
                end: range.end,
                len,
            });
        }
        Ok(Self {
            inner,
            start: range.start,
            end: range.end,
        })
    }
}

impl ByteSeq for SliceView<'_> {
    fn kind(&self) -> &'static str {
        "view"
    }
    fn len(&self) -> usize {
        self.end - self.start
    }
    fn byte_at(&self, index: usize) -> Option<u8> {
        if index >= self.len() {
            return None;
        }
        self.inner.byte_at(self.start + index)
    }
    fn as_contiguous(&self) -> Option<&[u8]> {
        self.inner.as_contiguous()?.get(self.start..self.end)
    }
    fn try_copy(&self) -> Result<Vec<u8>, ByteSeqError> {
        if let Some(bytes) = self.as_contiguous() {
            return Ok(bytes.to_vec());
        }
        let whole = self.inner.try_copy()?;
        Ok(whole.get(self.start..self.end).map(<[u8]>::to_vec).unwrap_or_default())
    }
}

/// Two sequences read back to back without copying.
#[derive(Clone, Copy)]
pub struct Concat<'a> {
    left: &'a dyn ByteSeq,
    right: &'a dyn ByteSeq,
}

impl<'a> Concat<'a> {
    /// Creates the concatenation `left ++ right`.
    pub fn new(left: &'a dyn ByteSeq, right: &'a dyn ByteSeq) -> Self {
        Self { left, right }
    }
}

impl ByteSeq for Concat<'_> {
    fn kind(&self) -> &'static str {
        "concat"
    }
    fn len(&self) -> usize {
        self.left.len() + self.right.len()
    }
    fn byte_at(&self, index: usize) -> Option<u8> {
        let split = self.left.len();
        if index < split {
            self.left.byte_at(index)
        } else {
            self.right.byte_at(index - split)
        }
    }
    fn try_copy(&self) -> Result<Vec<u8>, ByteSeqError> {
        let mut out = self.left.try_copy()?;
        out.extend_from_slice(&self.right.try_copy()?);
        Ok(out)
    }
}

/// Iterates the bytes of any sequence.
pub fn iter(seq: &dyn ByteSeq) -> impl Iterator<Item = u8> + '_ {
    (0..seq.len()).map_while(move |i| seq.byte_at(i))
}

/// Lexicographic comparison of two sequences, independent of representation.
pub fn compare(a: &dyn ByteSeq, b: &dyn ByteSeq) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_contiguous(), b.as_contiguous()) {
        return x.cmp(y);
    }
    iter(a).cmp(iter(b))
}

/// Byte-wise equality of two sequences, independent of representation.
pub fn equals(a: &dyn ByteSeq, b: &dyn ByteSeq) -> bool {
    a.len() == b.len() && compare(a, b) == Ordering::Equal
}

/// Feeds the sequence into `state`. Equal sequences feed identical input.
pub fn hash_into<H: Hasher>(seq: &dyn ByteSeq, state: &mut H) {
    state.write_usize(seq.len());
    for byte in iter(seq) {
        state.write_u8(byte);
    }
}

/// Borrows any sequence as a value with `Eq`, `Ord` and `Hash`, so mixed
/// representations can share one map or set.
#[derive(Clone, Copy)]
pub struct SeqKey<'a>(pub &'a dyn ByteSeq);

impl PartialEq for SeqKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        equals(self.0, other.0)
    }
}

impl Eq for SeqKey<'_> {}

impl PartialOrd for SeqKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SeqKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self.0, other.0)
    }
}

impl Hash for SeqKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_into(self.0, state);
    }
}

impl std::fmt::Debug for SeqKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SeqKey({}, {} bytes)", self.0.kind(), self.0.len())
    }
}
