pub mod aliases;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod git;
pub mod logging;
pub mod prompts;
pub mod story;
#[cfg(test)]
mod testing;
pub mod tracker;
pub mod workflow;
