pub mod openai;
pub mod prompt_builder;
pub mod prompts;

use crate::config::BackendCredentials;
use crate::error::CompletionError;
use prompt_builder::RenderedPrompt;

/// Trait for talking to a completion service.
pub trait CompletionBackend {
    /// One blocking request/response exchange. Returns the first candidate's
    /// text, never an empty string.
    fn complete(
        &self,
        prompt: &RenderedPrompt,
        credentials: &BackendCredentials,
    ) -> Result<String, CompletionError>;
}

impl<T: CompletionBackend + ?Sized> CompletionBackend for &T {
    fn complete(
        &self,
        prompt: &RenderedPrompt,
        credentials: &BackendCredentials,
    ) -> Result<String, CompletionError> {
        (**self).complete(prompt, credentials)
    }
}
