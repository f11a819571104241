use std::collections::BTreeMap;
use std::fmt;

use crate::error::PromptError;
use crate::llm::prompts::TemplateStore;

/// Placeholder name → value, built per invocation.
pub type PromptData = BTreeMap<String, String>;

/// Final prompt text, ready to be sent as the user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt(String);

impl RenderedPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RenderedPrompt {
    fn from(text: String) -> Self {
        RenderedPrompt(text)
    }
}

impl From<&str> for RenderedPrompt {
    fn from(text: &str) -> Self {
        RenderedPrompt(text.to_string())
    }
}

impl fmt::Display for RenderedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fills named templates from a [`TemplateStore`].
#[derive(Clone, Copy)]
pub struct PromptRenderer<'a> {
    store: &'a TemplateStore,
}

impl<'a> PromptRenderer<'a> {
    pub fn new(store: &'a TemplateStore) -> Self {
        PromptRenderer { store }
    }

    pub fn render(&self, name: &str, data: &PromptData) -> Result<RenderedPrompt, PromptError> {
        let template = self.store.resolve(name)?;
        let text = template.render(data)?;

        log::trace!("Rendered {}:\n{}", template.name(), truncate(&text, 3500));

        Ok(RenderedPrompt(text))
    }
}

/// Data for the PR summary template: the raw diff under `file_diffs`.
pub fn pr_diff_data(diff: &str) -> PromptData {
    let mut data = PromptData::new();
    data.insert("file_diffs".to_string(), diff.to_string());
    data
}

/// Truncate long strings for debug logging.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...\n[truncated {} bytes]", &s[..end], s.len() - end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::prompts::SUMMARIZE_PR_DIFF;

    const DIFF: &str = "--- a/x\n+++ b/x\n@@ -1 +1 @@\n-old\n+new\n";

    #[test]
    fn diff_is_substituted_verbatim() {
        let store = TemplateStore::bundled().unwrap();
        let prompt = PromptRenderer::new(&store)
            .render(SUMMARIZE_PR_DIFF, &pr_diff_data(DIFF))
            .unwrap();

        assert!(prompt.as_str().contains(&format!("```diff\n{DIFF}\n```")));
    }

    #[test]
    fn template_syntax_inside_the_diff_stays_literal() {
        let store = TemplateStore::bundled().unwrap();
        let diff = "+let s = \"{{ file_diffs }} {% if x %}\";\n";
        let prompt = PromptRenderer::new(&store)
            .render(SUMMARIZE_PR_DIFF, &pr_diff_data(diff))
            .unwrap();

        assert!(prompt.as_str().contains(diff));
    }

    #[test]
    fn rendering_is_deterministic() {
        let store = TemplateStore::bundled().unwrap();
        let renderer = PromptRenderer::new(&store);
        let data = pr_diff_data(DIFF);

        let first = renderer.render(SUMMARIZE_PR_DIFF, &data).unwrap();
        let second = renderer.render(SUMMARIZE_PR_DIFF, &data).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_template_is_reported_by_name() {
        let store = TemplateStore::bundled().unwrap();
        let err = PromptRenderer::new(&store)
            .render("nonexistent", &pr_diff_data(DIFF))
            .unwrap_err();

        assert!(matches!(err, PromptError::TemplateNotFound(n) if n == "nonexistent"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "ééé";
        let out = truncate(s, 3);
        assert!(out.starts_with("é..."));
        assert!(out.ends_with("[truncated 4 bytes]"));
    }
}
