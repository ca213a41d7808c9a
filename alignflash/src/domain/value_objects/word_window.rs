//! Decomposition of a byte range into edge words and an aligned interior.
//!
//! ```text
//!   address                                               end
//!      │                                                   │
//!  ┌───┼───────┬───────┬───────┬─── ··· ───┬───────┬───────┼───┐
//!  │   │ lead  │       │       │           │       │ trail │   │
//!  └───┴───────┴───────┴───────┴─── ··· ───┴───────┴───────┴───┘
//!              ▲                                   ▲
//!        aligned_start                        aligned_end
//!              └────────────── interior ───────────┘
//! ```

use core::ops::Range;

use super::{ByteRange, WORD_SIZE, WordAddress};

/// The word-aligned interior of a [`ByteRange`] plus its partial edge words.
///
/// `aligned_start` is the request start rounded up to a word boundary and
/// `aligned_end` the request end rounded down. When rounding would invert them
/// (the request sits inside a single word) both collapse to `aligned_start`
/// and the interior is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WordWindow {
    range: ByteRange,
    aligned_start: WordAddress,
    aligned_end: WordAddress,
}

/// A partially covered word at either edge of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeWord {
    word: WordAddress,
    offset: usize,
    len: usize,
    buffer_offset: usize,
}

/// The whole-word run in the middle of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interior {
    start: WordAddress,
    len: usize,
    buffer_offset: usize,
}

impl WordWindow {
    /// Compute the window for `range`.
    pub const fn new(range: ByteRange) -> Self {
        // ByteRange guarantees the word-padded end fits, so neither rounding can overflow.
        let aligned_start = WordAddress::align_down(range.address() + (WORD_SIZE as u32 - 1));
        let mut aligned_end = WordAddress::align_down(range.end());
        if aligned_end.value() < aligned_start.value() {
            aligned_end = aligned_start;
        }
        Self {
            range,
            aligned_start,
            aligned_end,
        }
    }

    /// The request this window was derived from.
    #[inline]
    pub const fn range(&self) -> ByteRange {
        self.range
    }

    /// Request start rounded up to a word boundary.
    #[inline]
    pub const fn aligned_start(&self) -> WordAddress {
        self.aligned_start
    }

    /// Request end rounded down to a word boundary (never below `aligned_start`).
    #[inline]
    pub const fn aligned_end(&self) -> WordAddress {
        self.aligned_end
    }

    /// Whether the request needs no partial-word handling at all.
    #[inline]
    pub const fn is_word_aligned(&self) -> bool {
        self.leading_edge().is_none() && self.trailing_edge().is_none()
    }

    /// The word before `aligned_start`, when the request starts mid-word.
    ///
    /// Covers `min(len, aligned_start - address)` bytes, so a request that
    /// fits entirely inside one word is served by this edge alone.
    pub const fn leading_edge(&self) -> Option<EdgeWord> {
        let address = self.range.address();
        if self.range.is_empty() || address == self.aligned_start.value() {
            return None;
        }

        let offset = (address % WORD_SIZE as u32) as usize;
        let available = WORD_SIZE - offset;
        let requested = self.range.len() as usize;
        let len = if requested < available { requested } else { available };

        Some(EdgeWord {
            word: WordAddress::align_down(address),
            offset,
            len,
            buffer_offset: 0,
        })
    }

    /// The whole words between `aligned_start` and `aligned_end`, if any.
    pub const fn interior(&self) -> Option<Interior> {
        let len = self.aligned_end.offset_from(self.aligned_start) as usize;
        if len == 0 {
            return None;
        }

        Some(Interior {
            start: self.aligned_start,
            len,
            buffer_offset: (self.aligned_start.value() - self.range.address()) as usize,
        })
    }

    /// The word at `aligned_end`, when the request ends mid-word.
    pub const fn trailing_edge(&self) -> Option<EdgeWord> {
        let end = self.range.end();
        if end <= self.aligned_end.value() {
            return None;
        }

        Some(EdgeWord {
            word: self.aligned_end,
            offset: 0,
            len: (end - self.aligned_end.value()) as usize,
            buffer_offset: (self.aligned_end.value() - self.range.address()) as usize,
        })
    }
}

impl EdgeWord {
    /// Address of the word on the device.
    #[inline]
    pub const fn word(&self) -> WordAddress {
        self.word
    }

    /// Number of request bytes that land in this word.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Byte positions inside the word that belong to the request.
    #[inline]
    pub const fn word_range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }

    /// Matching byte positions in the caller's buffer.
    #[inline]
    pub const fn buffer_range(&self) -> Range<usize> {
        self.buffer_offset..self.buffer_offset + self.len
    }
}

impl Interior {
    /// First word of the interior.
    #[inline]
    pub const fn start(&self) -> WordAddress {
        self.start
    }

    /// Length of the interior in bytes (a whole number of words).
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Matching byte positions in the caller's buffer.
    #[inline]
    pub const fn buffer_range(&self) -> Range<usize> {
        self.buffer_offset..self.buffer_offset + self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(address: u32, length: u32) -> WordWindow {
        ByteRange::new(address, length).unwrap().word_window()
    }

    #[test]
    fn test_aligned_request_has_no_edges() {
        let w = window(8, 16);
        assert!(w.is_word_aligned());
        assert_eq!(w.aligned_start().value(), 8);
        assert_eq!(w.aligned_end().value(), 24);

        let interior = w.interior().unwrap();
        assert_eq!(interior.start().value(), 8);
        assert_eq!(interior.len(), 16);
        assert_eq!(interior.buffer_range(), 0..16);
    }

    #[test]
    fn test_unaligned_both_edges() {
        // Bytes 1..7: tail of word 0, head of word 4
        let w = window(1, 6);
        assert_eq!(w.aligned_start().value(), 4);
        assert_eq!(w.aligned_end().value(), 4);
        assert!(w.interior().is_none());

        let lead = w.leading_edge().unwrap();
        assert_eq!(lead.word().value(), 0);
        assert_eq!(lead.word_range(), 1..4);
        assert_eq!(lead.buffer_range(), 0..3);

        let trail = w.trailing_edge().unwrap();
        assert_eq!(trail.word().value(), 4);
        assert_eq!(trail.word_range(), 0..3);
        assert_eq!(trail.buffer_range(), 3..6);
    }

    #[test]
    fn test_request_inside_one_word_collapses() {
        let w = window(5, 2);
        assert_eq!(w.aligned_start().value(), 8);
        assert_eq!(w.aligned_end().value(), 8);
        assert!(w.interior().is_none());
        assert!(w.trailing_edge().is_none());

        let lead = w.leading_edge().unwrap();
        assert_eq!(lead.word().value(), 4);
        assert_eq!(lead.word_range(), 1..3);
        assert_eq!(lead.buffer_range(), 0..2);
    }

    #[test]
    fn test_aligned_start_short_tail() {
        let w = window(4, 2);
        assert!(w.leading_edge().is_none());
        assert!(w.interior().is_none());

        let trail = w.trailing_edge().unwrap();
        assert_eq!(trail.word().value(), 4);
        assert_eq!(trail.word_range(), 0..2);
        assert_eq!(trail.buffer_range(), 0..2);
    }

    #[test]
    fn test_interior_buffer_offset() {
        let w = window(2, 12);
        let interior = w.interior().unwrap();
        assert_eq!(interior.start().value(), 4);
        assert_eq!(interior.len(), 8);
        assert_eq!(interior.buffer_range(), 2..10);
        assert_eq!(w.trailing_edge().unwrap().buffer_range(), 10..12);
    }

    #[test]
    fn test_empty_request() {
        let w = window(3, 0);
        assert!(w.leading_edge().is_none());
        assert!(w.interior().is_none());
        assert!(w.trailing_edge().is_none());
    }

    #[test]
    fn test_pieces_tile_the_request() {
        for address in 0..16u32 {
            for length in 0..40u32 {
                let w = window(address, length);
                let mut covered = [false; 40];

                let pieces = w
                    .leading_edge()
                    .map(|e| e.buffer_range())
                    .into_iter()
                    .chain(w.interior().map(|i| i.buffer_range()))
                    .chain(w.trailing_edge().map(|e| e.buffer_range()));

                for piece in pieces {
                    for i in piece {
                        assert!(!covered[i], "byte {} covered twice for ({}, {})", i, address, length);
                        covered[i] = true;
                    }
                }

                assert!(
                    covered[..length as usize].iter().all(|c| *c),
                    "gap for ({}, {})",
                    address,
                    length
                );
                assert!(w.aligned_start().value() <= w.aligned_end().value());
            }
        }
    }

    #[test]
    fn test_edge_words_are_where_the_bytes_live() {
        for address in 0..16u32 {
            for length in 1..24u32 {
                let w = window(address, length);
                for edge in w.leading_edge().into_iter().chain(w.trailing_edge()) {
                    let first_byte = edge.word().value() + edge.word_range().start as u32;
                    assert_eq!(first_byte, address + edge.buffer_range().start as u32);
                }
            }
        }
    }
}
