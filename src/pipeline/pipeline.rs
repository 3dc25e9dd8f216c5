//! Pipeline trait.
use crate::error::Error;

/// Implemented by every pipeline. Generic over the return type so that
/// pipelines producing a result can use the trait too.
pub trait Pipeline<T> {
    fn run(&self) -> Result<T, Error>;
}
