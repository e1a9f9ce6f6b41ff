//! Model invocation: hand a payload file to the external model process.
//!
//! The pipeline never talks to a model API directly — it shells out to a
//! locally installed runner (ollama by default) through a configurable
//! command template. The [`ModelInvoker`] trait is deliberately narrow
//! (`invoke(model, prompt_file) → stdout`) so the whole pipeline can be
//! exercised in tests with a fake invoker returning scripted replies, without
//! starting real external processes.
//!
//! ## Command template
//!
//! The template carries `{model}` and `{prompt_file}` placeholders. Both are
//! shell-quoted before substitution because the rendered command runs through
//! `sh -c` — a model name containing a space or quote must arrive at the
//! runner as one argument, not as shell syntax.

use crate::error::Doc2TableError;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Default command template, overridable via [`COMMAND_TEMPLATE_ENV`] or
/// [`crate::config::ExtractionConfig::command_template`].
pub const DEFAULT_COMMAND_TEMPLATE: &str = "ollama run {model} --prompt-file {prompt_file}";

/// Environment variable consulted when no template is configured.
pub const COMMAND_TEMPLATE_ENV: &str = "OLLAMA_CMD";

/// Capability interface for sending one payload to a model and receiving its
/// raw textual reply.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Invoke the model with the payload stored at `prompt_file` and return
    /// its standard output as text.
    ///
    /// A non-zero exit status is a fatal [`Doc2TableError::ModelInvocation`]
    /// carrying the captured error stream.
    async fn invoke(&self, model: &str, prompt_file: &Path) -> Result<String, Doc2TableError>;
}

/// Invoker that renders the command template and runs it through `sh -c`.
#[derive(Debug, Clone)]
pub struct ShellInvoker {
    template: String,
}

impl ShellInvoker {
    /// Create an invoker with an explicit command template.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Create an invoker from the environment: [`COMMAND_TEMPLATE_ENV`] if
    /// set and non-empty, otherwise [`DEFAULT_COMMAND_TEMPLATE`].
    pub fn from_env() -> Self {
        let template = std::env::var(COMMAND_TEMPLATE_ENV)
            .ok()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_COMMAND_TEMPLATE.to_string());
        Self::new(template)
    }

    /// Substitute the shell-quoted model and payload path into the template.
    fn render(&self, model: &str, prompt_file: &Path) -> Result<String, Doc2TableError> {
        let quoted_model = shlex::try_quote(model)
            .map_err(|e| Doc2TableError::Internal(format!("cannot quote model name: {e}")))?;
        let file = prompt_file.to_string_lossy();
        let quoted_file = shlex::try_quote(&file)
            .map_err(|e| Doc2TableError::Internal(format!("cannot quote prompt path: {e}")))?;

        Ok(self
            .template
            .replace("{model}", &quoted_model)
            .replace("{prompt_file}", &quoted_file))
    }
}

#[async_trait]
impl ModelInvoker for ShellInvoker {
    async fn invoke(&self, model: &str, prompt_file: &Path) -> Result<String, Doc2TableError> {
        let command = self.render(model, prompt_file)?;
        debug!("Running model command: {command}");

        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&command)
            .output()
            .await
            .map_err(|e| Doc2TableError::Internal(format!("failed to spawn shell: {e}")))?;

        if !output.status.success() {
            return Err(Doc2TableError::ModelInvocation {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
