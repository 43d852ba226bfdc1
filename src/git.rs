use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};

/// Marker git prints in front of failures. Only a fallback: exit status is
/// checked first.
const ERROR_MARKER: &str = "error: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    pub command: String,
    pub success: bool,
    /// stdout followed by stderr
    pub text: String,
}

impl GitOutput {
    pub fn failed(&self) -> bool {
        !self.success || self.text.contains(ERROR_MARKER)
    }
}

/// Branch operations the workflows need from the local repository.
pub trait Git {
    fn list_branches(&self) -> Result<GitOutput>;
    fn checkout(&self, branch: &str) -> Result<GitOutput>;
    fn checkout_new(&self, branch: &str) -> Result<GitOutput>;
    fn merge_no_ff(&self, branch: &str) -> Result<GitOutput>;
    fn delete_branch(&self, branch: &str) -> Result<GitOutput>;
}

/// Runs the `git` binary, in the process working directory unless told
/// otherwise.
#[derive(Debug, Default)]
pub struct SystemGit {
    cwd: Option<PathBuf>,
}

impl SystemGit {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
        }
    }

    fn run(&self, args: &[&str]) -> Result<GitOutput> {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        let output = cmd
            .output()
            .with_context(|| format!("failed to run git {}", args.join(" ")))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let text = [stdout.trim_end(), stderr.trim_end()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(GitOutput {
            command: format!("git {}", args.join(" ")),
            success: output.status.success(),
            text,
        })
    }
}

impl Git for SystemGit {
    fn list_branches(&self) -> Result<GitOutput> {
        self.run(&["branch"])
    }

    fn checkout(&self, branch: &str) -> Result<GitOutput> {
        self.run(&["checkout", branch])
    }

    fn checkout_new(&self, branch: &str) -> Result<GitOutput> {
        self.run(&["checkout", "-b", branch])
    }

    fn merge_no_ff(&self, branch: &str) -> Result<GitOutput> {
        self.run(&["merge", "--no-ff", branch])
    }

    fn delete_branch(&self, branch: &str) -> Result<GitOutput> {
        self.run(&["branch", "-d", branch])
    }
}

/// Name of the `* `-marked branch in `git branch` output.
pub fn current_branch(listing: &str) -> Option<&str> {
    listing
        .lines()
        .find_map(|line| line.strip_prefix("* "))
        .map(str::trim)
}

/// `git config --get <key>`; unset keys come back as `None`.
pub fn config_get(key: &str) -> Result<Option<String>> {
    let output = Command::new("git")
        .args(["config", "--get", key])
        .output()
        .with_context(|| format!("failed to run git config --get {key}"))?;
    if !output.status.success() {
        return Ok(None);
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(Some(value).filter(|value| !value.is_empty()))
}

pub fn config_set(global: bool, key: &str, value: &str) -> Result<()> {
    let mut cmd = Command::new("git");
    cmd.arg("config");
    if global {
        cmd.arg("--global");
    }
    let output = cmd
        .args([key, value])
        .output()
        .with_context(|| format!("failed to run git config {key}"))?;
    if !output.status.success() {
        anyhow::bail!(
            "git config {key} failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}
