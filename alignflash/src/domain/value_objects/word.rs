//! The device word and its byte views.

use aligned::{A4, Aligned};

/// Size of one program unit in bytes.
pub const WORD_SIZE: usize = 4;

/// One device word, guaranteed 4-byte aligned in memory.
///
/// Device writes take `&[Word]` so that the "source must start on a word
/// boundary" requirement of the hardware is carried by the type.
pub type Word = Aligned<A4, [u8; WORD_SIZE]>;

/// A word in the erased state (all bits 1). Programming it is a no-op.
pub const ERASED_WORD: Word = Aligned([0xFF; WORD_SIZE]);

const _: () = assert!(core::mem::size_of::<Word>() == WORD_SIZE);
const _: () = assert!(core::mem::align_of::<Word>() == WORD_SIZE);

/// View `bytes` as words without copying.
///
/// Returns `None` when `bytes` does not start on a 4-byte boundary in memory
/// or its length is not a whole number of words.
pub fn try_cast_words(bytes: &[u8]) -> Option<&[Word]> {
    if bytes.len() % WORD_SIZE != 0 || bytes.as_ptr() as usize % WORD_SIZE != 0 {
        return None;
    }

    // SAFETY: `Word` is `repr(C)` over `[u8; 4]` with size 4 and alignment 4
    // (checked above at compile time). The pointer is 4-aligned and the length
    // is a whole number of words, and every byte pattern is a valid `Word`.
    Some(unsafe {
        core::slice::from_raw_parts(bytes.as_ptr().cast::<Word>(), bytes.len() / WORD_SIZE)
    })
}

/// View a run of words as bytes.
pub fn words_as_bytes(words: &[Word]) -> &[u8] {
    // SAFETY: `Word` has no padding, so `len * 4` initialized bytes follow the pointer.
    unsafe { core::slice::from_raw_parts(words.as_ptr().cast::<u8>(), words.len() * WORD_SIZE) }
}

/// View a run of words as mutable bytes.
pub fn words_as_bytes_mut(words: &mut [Word]) -> &mut [u8] {
    // SAFETY: as for `words_as_bytes`; the exclusive borrow is carried over.
    unsafe {
        core::slice::from_raw_parts_mut(words.as_mut_ptr().cast::<u8>(), words.len() * WORD_SIZE)
    }
}
