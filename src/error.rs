//! Error types for the diff-to-description pipeline.
//!
//! Each stage owns one enum. [`PipelineError`] tags whichever of them
//! stopped the run with the stage it came from.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while resolving or rendering prompt templates.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// A bundled template failed to parse. This is a packaging defect.
    #[error("invalid bundled template {name}: {source}")]
    InvalidTemplate {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to render template {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Failures while resolving backend configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing API key: set `{key}` in the config file or the {env} environment variable")]
    MissingCredentials { key: String, env: String },

    #[error("invalid value for `{key}`: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: &'static str,
    },

    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failures of a single exchange with the completion service.
///
/// `Transport`, `Status` and `Decode` are backend failures and are never
/// retried. `EmptyCompletion` means the service answered without usable text.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request to completion service failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("completion service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode completion response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("completion service returned no usable candidate")]
    EmptyCompletion,
}

/// The pipeline stage at which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Render,
    Resolve,
    Complete,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Render => "prompt rendering",
            Stage::Resolve => "configuration resolution",
            Stage::Complete => "completion",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first failure of a pipeline run, tagged with its stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{} failed", Stage::Render)]
    Render(#[source] PromptError),

    #[error("{} failed", Stage::Resolve)]
    Resolve(#[source] ConfigError),

    #[error("{} failed", Stage::Complete)]
    Complete(#[source] CompletionError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Render(_) => Stage::Render,
            PipelineError::Resolve(_) => Stage::Resolve,
            PipelineError::Complete(_) => Stage::Complete,
        }
    }
}
