//! Configuration types for document-to-table extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across calls, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A positional constructor breaks on every new field. The builder lets
//! callers set only what they care about and rely on documented defaults for
//! the rest — and it gives `build()` one place to reject invalid chunking
//! geometry before any work starts.

use crate::error::Doc2TableError;
use crate::pipeline::invoke::ModelInvoker;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default chunk window size in characters.
///
/// Configurable policy, not a load-bearing invariant: large enough that most
/// documents fit in one chunk, small enough to stay inside the context window
/// of common local models.
pub const DEFAULT_CHUNK_SIZE: usize = 8000;

/// Default overlap between consecutive chunk windows, in characters.
///
/// The overlap exists so a record that straddles a chunk boundary is seen
/// whole by at least one chunk.
pub const DEFAULT_CHUNK_OVERLAP: usize = 500;

/// Default local model identifier passed to the command template.
pub const DEFAULT_MODEL: &str = "llama2";

/// Configuration for a document-to-table extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use doc2table::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .model("mistral")
///     .chunk_size(4000)
///     .chunk_overlap(200)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Chunk window size in characters. Default: 8000.
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters. Must be strictly
    /// less than `chunk_size` or the chunk cursor would never advance.
    /// Default: 500.
    pub chunk_overlap: usize,

    /// Local model identifier substituted into the command template.
    /// Default: "llama2".
    pub model: String,

    /// Command template with `{model}` and `{prompt_file}` placeholders.
    ///
    /// Resolution order when `None`: the `OLLAMA_CMD` environment variable,
    /// then the built-in default
    /// (`ollama run {model} --prompt-file {prompt_file}`).
    pub command_template: Option<String>,

    /// Optional path where the exact payload sent to the model is written.
    ///
    /// When set, the same file is rewritten for every chunk and left in place
    /// after the run, for debugging. When `None`, each chunk uses a fresh
    /// temporary file that is removed on every exit path.
    pub temp_prompt: Option<PathBuf>,

    /// Pre-constructed model invoker. Takes precedence over
    /// `command_template`. This is the seam tests use to script replies
    /// without starting a real process.
    pub invoker: Option<Arc<dyn ModelInvoker>>,

    /// Per-chunk progress events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            model: DEFAULT_MODEL.to_string(),
            command_template: None,
            temp_prompt: None,
            invoker: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .field("model", &self.model)
            .field("command_template", &self.command_template)
            .field("temp_prompt", &self.temp_prompt)
            .field("invoker", &self.invoker.as_ref().map(|_| "<dyn ModelInvoker>"))
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn command_template(mut self, template: impl Into<String>) -> Self {
        self.config.command_template = Some(template.into());
        self
    }

    pub fn temp_prompt(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.temp_prompt = Some(path.into());
        self
    }

    pub fn invoker(mut self, invoker: Arc<dyn ModelInvoker>) -> Self {
        self.config.invoker = Some(invoker);
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Build the configuration, validating chunking geometry.
    ///
    /// `chunk_overlap >= chunk_size` is rejected here rather than at chunking
    /// time: with a non-positive cursor advance the chunk loop would never
    /// terminate.
    pub fn build(self) -> Result<ExtractionConfig, Doc2TableError> {
        let c = &self.config;
        if c.chunk_size == 0 {
            return Err(Doc2TableError::InvalidConfig(
                "chunk_size must be ≥ 1".into(),
            ));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(Doc2TableError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        if c.model.is_empty() {
            return Err(Doc2TableError::InvalidConfig(
                "model identifier must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds() {
        let config = ExtractionConfig::builder().build().unwrap();
        assert_eq!(config.chunk_size, 8000);
        assert_eq!(config.chunk_overlap, 500);
        assert_eq!(config.model, "llama2");
    }

    #[test]
    fn overlap_equal_to_size_is_rejected() {
        let err = ExtractionConfig::builder()
            .chunk_size(100)
            .chunk_overlap(100)
            .build()
            .unwrap_err();
        assert!(matches!(err, Doc2TableError::InvalidConfig(_)));
    }

    #[test]
    fn overlap_larger_than_size_is_rejected() {
        let err = ExtractionConfig::builder()
            .chunk_size(100)
            .chunk_overlap(500)
            .build()
            .unwrap_err();
        assert!(matches!(err, Doc2TableError::InvalidConfig(_)));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = ExtractionConfig::builder()
            .chunk_size(0)
            .chunk_overlap(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Doc2TableError::InvalidConfig(_)));
    }
}
