pub mod error;
pub mod pipeline;
pub mod text;
pub mod tweet;
