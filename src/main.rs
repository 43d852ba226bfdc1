use clap::Parser;

use bushy::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();

    match cli::run(cli) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
