//! Bounded word-aligned scratch for programming from unaligned sources.

use super::value_objects::{ERASED_WORD, WORD_SIZE, Word};

/// Fixed-capacity staging area of `WORDS` device words.
///
/// The device program primitive needs its source to start on a word boundary
/// in memory. When a caller's buffer does not, the interior of a write is
/// copied through one of these a chunk at a time, so memory use stays at
/// `WORDS * 4` bytes no matter how large the write is.
///
/// A buffer is owned by a single write call and never shared.
pub struct StagingBuffer<const WORDS: usize> {
    words: [Word; WORDS],
}

impl<const WORDS: usize> StagingBuffer<WORDS> {
    /// Capacity in bytes.
    pub const CAPACITY: usize = WORDS * WORD_SIZE;

    /// Create an empty staging buffer.
    pub const fn new() -> Self {
        Self {
            words: [ERASED_WORD; WORDS],
        }
    }

    /// Copy the leading whole words of `src` (at most [`Self::CAPACITY`]
    /// bytes) and return the staged words.
    ///
    /// Trailing bytes that do not make up a whole word are not staged.
    pub fn stage(&mut self, src: &[u8]) -> &[Word] {
        let count = (src.len() / WORD_SIZE).min(WORDS);
        for (word, chunk) in self.words.iter_mut().zip(src.chunks_exact(WORD_SIZE)).take(count) {
            word.copy_from_slice(chunk);
        }
        &self.words[..count]
    }
}

impl<const WORDS: usize> Default for StagingBuffer<WORDS> {
    fn default() -> Self {
        Self::new()
    }
}
