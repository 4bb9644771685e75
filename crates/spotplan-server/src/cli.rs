//! Command-line parsing for the `spotplan` binary.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// No arguments: run the HTTP server.
    Serve,
    /// `import <file> [data-dir]`
    Import {
        file: PathBuf,
        data_dir: Option<PathBuf>,
    },
    Help,
    /// `import` without a file.
    MissingImportFile,
    Unknown(String),
}

impl Command {
    /// Parse the full argument list (program name first).
    ///
    /// Needs no configuration, so `help` works even when the environment is broken.
    pub fn parse(args: &[String]) -> Self {
        let Some(command) = args.get(1) else {
            return Command::Serve;
        };
        match command.as_str() {
            "--import" | "import" => match args.get(2) {
                Some(file) => Command::Import {
                    file: PathBuf::from(file),
                    data_dir: args.get(3).map(PathBuf::from),
                },
                None => Command::MissingImportFile,
            },
            "--help" | "-h" | "help" => Command::Help,
            other => Command::Unknown(other.to_string()),
        }
    }
}

pub fn print_help() {
    println!("SpotPlan: spot registry with itinerary generation");
    println!();
    println!("Usage: spotplan [command]");
    println!();
    println!("Commands:");
    println!("  (none)                      Start the server");
    println!("  import <file> [data-dir]    Bulk-create spots from a JSON array");
    println!("  help                        Show this help message");
    println!();
    println!("Environment:");
    println!("  PORT, SPOTPLAN_DATA_DIR, PLAN_WEBHOOK_URL, PLAN_TIMEOUT_SECS");
}
