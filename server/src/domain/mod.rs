//! Domain logic
//!
//! - `generation` - Character biographies and short stories via a chat completion API

pub mod generation;

pub use generation::{CompletionProvider, GenerationError, GenerationService, MistralClient};
