//! eqgen CLI
//!
//! Generates deep-equality routines for a named type and everything it
//! reaches.

use std::process::ExitCode;

use eqgenc::{init_tracing, parse_args, run, Command, USAGE};

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(Command::Generate(options)) => options,
        Ok(Command::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(&options, std::io::stdout().lock()) {
        Ok(files) => {
            for file in &files {
                if let Some(diagnostic) = &file.diagnostic {
                    eprintln!(
                        "warning: {} was written unformatted: {diagnostic}",
                        file.path.display()
                    );
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
