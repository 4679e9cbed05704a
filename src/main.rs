use clap::Parser;
use dircleaner::cli::{Options, run};
use dircleaner::output::{ConsoleReporter, LogFileReporter, Reporter};
use std::process::ExitCode;

fn main() -> ExitCode {
    let options = Options::parse();
    let console = ConsoleReporter::new(options.verbose);

    let result = match &options.log {
        Some(log_path) => match LogFileReporter::create(console, log_path) {
            Ok(mut reporter) => run(&options, &mut reporter),
            Err(e) => {
                let mut console = ConsoleReporter::new(options.verbose);
                console.warning(&format!(
                    "Could not create log file {}: {}",
                    log_path.display(),
                    e
                ));
                run(&options, &mut console)
            }
        },
        None => {
            let mut console = console;
            run(&options, &mut console)
        }
    };

    match result {
        Ok(_) => {
            println!("\nDone!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
