use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueHint};

use pick_the_symbols::commands::{check, drill, forget, report};
use pick_the_symbols::crud::DB;
use pick_the_symbols::telemetry::init_tracing;

#[derive(Parser, Debug)]
#[command(
    name = "pick-the-symbols",
    version,
    about = "Punctuation gap-fill exercises, in your terminal.",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Work through an exercise
    Drill {
        /// Exercise file: JSON options, Markdown or HTML text
        #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
        path: PathBuf,
        /// Symbols to turn into blanks, overriding the file
        #[arg(long, value_name = "SYMBOLS")]
        symbols: Option<String>,
        /// Ignore saved answers and start from empty blanks
        #[arg(long, default_value_t = false)]
        fresh: bool,
    },
    /// Show the blank groups, solutions and saved progress of an exercise
    Check {
        #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
        path: PathBuf,
        #[arg(long, value_name = "SYMBOLS")]
        symbols: Option<String>,
    },
    /// Print the score report of the saved answers as JSON
    Report {
        #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
        path: PathBuf,
        #[arg(long, value_name = "SYMBOLS")]
        symbols: Option<String>,
    },
    /// Delete the saved answers of an exercise
    Forget {
        #[arg(value_name = "PATH", value_hint = ValueHint::FilePath)]
        path: PathBuf,
        #[arg(long, value_name = "SYMBOLS")]
        symbols: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let db = DB::new().await?;

    match cli.command {
        Command::Drill {
            path,
            symbols,
            fresh,
        } => drill::run(&db, &path, symbols, fresh).await?,
        Command::Check { path, symbols } => check::run(&db, &path, symbols).await?,
        Command::Report { path, symbols } => report::run(&db, &path, symbols).await?,
        Command::Forget {
            path,
            symbols,
            yes,
        } => forget::run(&db, &path, symbols, yes).await?,
    }

    Ok(())
}
