use std::collections::BTreeMap;

use minijinja::{AutoEscape, Environment};

use crate::error::PromptError;

/// Name of the template that turns a branch diff into a PR description.
pub const SUMMARIZE_PR_DIFF: &str = "summarize_pr_diff.tmpl";

/// System message sent ahead of every rendered prompt.
pub const PR_INSTRUCTIONS: &str = r#"You are a GitHub Pull Request description assistant.
You read the diff between two branches and explain what the source branch changes and why.
Be specific and concise; avoid generic phrases like 'misc changes' or 'small fixes'.
Do not narrate your thought process. The response should only include the final description."#;

/// Templates compiled into the binary, keyed by resource name.
const BUNDLED: &[(&str, &str)] = &[(
    SUMMARIZE_PR_DIFF,
    include_str!("../../templates/summarize_pr_diff.tmpl"),
)];

/// Read-only registry of parsed prompt templates.
///
/// Built once at startup and shared by reference afterwards.
pub struct TemplateStore {
    env: Environment<'static>,
    names: Vec<&'static str>,
}

/// A resolved template, ready to render.
pub struct Template<'a> {
    name: &'a str,
    inner: minijinja::Template<'a, 'a>,
}

impl TemplateStore {
    /// Parse every bundled template. Any failure here is a packaging defect.
    pub fn bundled() -> Result<Self, PromptError> {
        Self::from_sources(BUNDLED)
    }

    fn from_sources(sources: &[(&'static str, &'static str)]) -> Result<Self, PromptError> {
        let mut env = Environment::new();
        // Diffs go in verbatim, whatever the template name looks like.
        env.set_auto_escape_callback(|_| AutoEscape::None);

        let mut names = Vec::with_capacity(sources.len());
        for &(name, text) in sources {
            env.add_template(name, text)
                .map_err(|source| PromptError::InvalidTemplate {
                    name: name.to_string(),
                    source,
                })?;
            names.push(name);
        }

        Ok(TemplateStore { env, names })
    }

    pub fn resolve<'a>(&'a self, name: &'a str) -> Result<Template<'a>, PromptError> {
        let inner = self
            .env
            .get_template(name)
            .map_err(|_| PromptError::TemplateNotFound(name.to_string()))?;
        Ok(Template { name, inner })
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }
}

impl Template<'_> {
    pub fn name(&self) -> &str {
        self.name
    }

    /// Substitute `data` into the template. Keys the template does not
    /// mention are ignored and placeholders without a key render empty.
    pub fn render(&self, data: &BTreeMap<String, String>) -> Result<String, PromptError> {
        self.inner.render(data).map_err(|source| PromptError::Render {
            name: self.name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_bundled_template_resolves_and_renders_with_no_data() {
        let store = TemplateStore::bundled().unwrap();
        assert_eq!(store.names().len(), BUNDLED.len());

        for name in store.names() {
            let tmpl = store.resolve(name).unwrap();
            let out = tmpl.render(&BTreeMap::new()).unwrap();
            assert!(!out.is_empty(), "{name} rendered empty");
        }
    }

    #[test]
    fn unknown_name_is_not_found() {
        let store = TemplateStore::bundled().unwrap();
        let err = store.resolve("nonexistent").err().unwrap();
        assert!(matches!(err, PromptError::TemplateNotFound(n) if n == "nonexistent"));
    }

    #[test]
    fn malformed_template_fails_to_load() {
        let err = TemplateStore::from_sources(&[("broken.tmpl", "{{ unclosed")])
            .err()
            .unwrap();
        assert!(matches!(err, PromptError::InvalidTemplate { name, .. } if name == "broken.tmpl"));
    }

    #[test]
    fn missing_placeholder_renders_empty() {
        let store = TemplateStore::from_sources(&[("t.tmpl", "a[{{ missing }}]b")]).unwrap();
        let out = store.resolve("t.tmpl").unwrap().render(&BTreeMap::new()).unwrap();
        assert_eq!(out, "a[]b");
    }

    #[test]
    fn html_like_names_are_not_escaped() {
        let store = TemplateStore::from_sources(&[("t.html", "{{ v }}")]).unwrap();
        let mut data = BTreeMap::new();
        data.insert("v".to_string(), "<a> & \"b\"".to_string());
        let out = store.resolve("t.html").unwrap().render(&data).unwrap();
        assert_eq!(out, "<a> & \"b\"");
    }
}
