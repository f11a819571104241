//! Diff → prompt → completion → description.

use crate::config::BackendConfig;
use crate::error::PipelineError;
use crate::llm::CompletionBackend;
use crate::llm::prompt_builder::{pr_diff_data, PromptRenderer, RenderedPrompt};
use crate::llm::prompts::{TemplateStore, SUMMARIZE_PR_DIFF};

/// The render stage on its own, for previewing the prompt without a backend.
pub fn render_prompt(
    templates: &TemplateStore,
    diff: &str,
) -> Result<RenderedPrompt, PipelineError> {
    render_with(PromptRenderer::new(templates), diff)
}

fn render_with(renderer: PromptRenderer<'_>, diff: &str) -> Result<RenderedPrompt, PipelineError> {
    renderer
        .render(SUMMARIZE_PR_DIFF, &pr_diff_data(diff))
        .map_err(PipelineError::Render)
}

pub struct Pipeline<'a, B> {
    renderer: PromptRenderer<'a>,
    config: BackendConfig<'a>,
    backend: B,
}

impl<'a, B: CompletionBackend> Pipeline<'a, B> {
    pub fn new(templates: &'a TemplateStore, config: BackendConfig<'a>, backend: B) -> Self {
        Pipeline {
            renderer: PromptRenderer::new(templates),
            config,
            backend,
        }
    }

    pub fn render_prompt(&self, diff: &str) -> Result<RenderedPrompt, PipelineError> {
        render_with(self.renderer, diff)
    }

    /// Run every stage in order and stop at the first failure.
    pub fn generate_description(&self, diff: &str) -> Result<String, PipelineError> {
        let prompt = self.render_prompt(diff)?;
        let credentials = self.config.resolve().map_err(PipelineError::Resolve)?;

        let description = self
            .backend
            .complete(&prompt, &credentials)
            .map_err(PipelineError::Complete)?;

        Ok(description.trim().to_string())
    }
}
