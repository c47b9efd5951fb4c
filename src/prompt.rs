//! User interaction for confirmations.

use crate::error::{Error, Result};
use dialoguer::Confirm;

/// Trait for asking the user yes/no questions.
pub trait Prompter {
    /// Asks `prompt` and returns the answer, `default` when the user just hits enter.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Terminal prompter backed by `dialoguer`.
#[derive(Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|e| Error::PromptError(e.to_string()))
    }
}

/// Prompter that never asks and always returns the same answer.
pub struct FixedPrompter(pub bool);

impl Prompter for FixedPrompter {
    fn confirm(&self, _prompt: &str, _default: bool) -> Result<bool> {
        Ok(self.0)
    }
}
