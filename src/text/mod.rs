/*! Tweet text normalization.

Atomic transforms, their named pipeline compositions, and the
configurable [`preprocess`] entry point.

!*/

pub mod atomic;
mod contractions;
pub mod preprocess;
pub mod standardize;
mod tokenize;

pub use preprocess::{preprocess, PreprocessConfig};
pub use standardize::Standardizer;
pub use tokenize::{Token, Tokenize};
