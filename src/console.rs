use std::io::Write;

use crate::git::GitOutput;
use crate::logging::Logger;

/// User-facing output. Quiet mode silences the stream; every line still
/// reaches the log file when one is attached.
pub struct Console {
    out: Box<dyn Write>,
    quiet: bool,
    verbose: bool,
    logger: Option<Logger>,
}

impl Console {
    pub fn new(out: Box<dyn Write>, quiet: bool, verbose: bool) -> Self {
        Self {
            out,
            quiet,
            verbose,
            logger: None,
        }
    }

    pub fn stdout(quiet: bool, verbose: bool) -> Self {
        Self::new(Box::new(std::io::stdout()), quiet, verbose)
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn put(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        self.log("INFO", message);
        if !self.quiet {
            self.write_line(message);
        }
    }

    /// Shown only with `--verbose`.
    pub fn debug(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        self.log("DEBUG", message);
        if self.verbose && !self.quiet {
            self.write_line(message);
        }
    }

    pub fn git(&mut self, output: &GitOutput) {
        self.debug(format!("Running command: {}", output.command));
        if !output.text.is_empty() {
            self.debug(&output.text);
        }
    }

    fn write_line(&mut self, message: &str) {
        // a closed stdout must not abort a half-finished workflow
        let _ = writeln!(self.out, "{message}");
        let _ = self.out.flush();
    }

    fn log(&self, level: &str, message: &str) {
        if let Some(logger) = &self.logger {
            let _ = logger.log(level, message);
        }
    }
}
