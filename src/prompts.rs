use std::io::BufRead;

use anyhow::{Context, Result};
use dialoguer::Input;

/// Asks for the part of the branch name after `<story id>-`.
pub trait BranchPrompt {
    fn branch_suffix(&mut self, story_id: u64, default: &str) -> Result<String>;
}

/// Interactive prompt on a terminal, one line from stdin otherwise.
pub struct TerminalPrompt;

impl BranchPrompt for TerminalPrompt {
    fn branch_suffix(&mut self, story_id: u64, default: &str) -> Result<String> {
        if !::console::Term::stderr().is_term() {
            let stdin = std::io::stdin();
            return LinePrompt::new(stdin.lock()).branch_suffix(story_id, default);
        }
        let suffix: String = Input::new()
            .with_prompt(prompt_text(story_id))
            .default(default.to_string())
            .allow_empty(true)
            .interact_text()?;
        Ok(suffix_or_default(&suffix, default))
    }
}

/// Reads the answer as a single line; end of input means the default.
pub struct LinePrompt<R> {
    input: R,
}

impl<R: BufRead> LinePrompt<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> BranchPrompt for LinePrompt<R> {
    fn branch_suffix(&mut self, story_id: u64, default: &str) -> Result<String> {
        eprintln!("{} [{default}]:", prompt_text(story_id));
        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .context("failed to read branch name")?;
        Ok(suffix_or_default(&line, default))
    }
}

fn prompt_text(story_id: u64) -> String {
    format!("Enter branch name (will be prepended by {story_id})")
}

pub fn suffix_or_default(input: &str, default: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}
