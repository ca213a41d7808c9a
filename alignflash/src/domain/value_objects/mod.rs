//! Value objects for the domain layer.
//!
//! Value objects are immutable, validated data types for the address
//! arithmetic between byte requests and the word/sector geometry of the
//! device. They replace raw pointer and integer juggling with checked
//! construction.

mod word;
mod word_address;
mod byte_range;
mod word_window;
mod sector_range;

pub use word::{ERASED_WORD, WORD_SIZE, Word, try_cast_words, words_as_bytes, words_as_bytes_mut};
pub use word_address::WordAddress;
pub use byte_range::ByteRange;
pub use word_window::{EdgeWord, Interior, WordWindow};
pub use sector_range::{SectorAlignment, SectorRange};
