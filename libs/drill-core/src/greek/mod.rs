//! Greek script handling: normalization, transliteration and input checks.

pub mod normalize;
pub mod transliterate;
pub mod validate;

pub use normalize::{equivalent, normalize, strip_accents};
pub use transliterate::{to_greek, to_latin, Transliterator};
pub use validate::{has_latin_letters, is_greek_text, validate_input, InputReport};
