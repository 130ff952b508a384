use clap::Parser;
use enpassvault::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    enpassvault::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Decrypt { reveal, ref format } => {
            enpassvault::cli::commands::decrypt::execute(&cli, reveal, format.as_deref())
        }
        Commands::Inspect { hex } => enpassvault::cli::commands::inspect::execute(&cli, hex),
        Commands::Key => enpassvault::cli::commands::key::execute(&cli),
        Commands::Version => enpassvault::cli::commands::version::execute(),
        Commands::Completions { shell } => enpassvault::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        enpassvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
