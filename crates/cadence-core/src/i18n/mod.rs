mod language;
mod translations;

pub use language::{Language, PluralCategory, UnsupportedLanguageError};
pub use translations::Translator;
