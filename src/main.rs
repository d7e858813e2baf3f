use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use layerforge::config::Config;
use layerforge::error::LayerForgeError;
use layerforge::scorer::loader::load_score_table;
use std::process;
use tracing::Level;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Square slot-to-slot score matrix (CSV, no header).
    #[arg(global = true, short, long, default_value = "data/score_table.csv")]
    table: String,

    /// JSON settings used as the base; explicit flags override it.
    #[arg(global = true, short, long)]
    settings: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search for the best layer layouts.
    Search(cmd::search::SearchArgs),
    /// Score existing layouts.
    Score(cmd::score::ScoreArgs),
}

fn exit_with(context: &str, e: LayerForgeError) -> ! {
    eprintln!("\n❌ {}:", context);
    eprintln!("   {}", e);
    process::exit(1);
}

fn main() {
    // 1. Parse raw matches so explicit flags can be told apart from defaults
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // 2. CLI config and the subcommand's own matches
    let (cli_config, sub_matches) = match &cli.command {
        Commands::Search(args) => (&args.config, matches.subcommand_matches("search")),
        Commands::Score(args) => (&args.config, matches.subcommand_matches("score")),
    };

    // 3. Settings file as base, explicit flags on top
    let config = match &cli.settings {
        Some(path) => {
            println!("⚙️  Loading settings from: {}", path);
            let mut base = Config::load_from_file(path)
                .unwrap_or_else(|e| exit_with("Could not load settings", e));
            if let Some(sub) = sub_matches {
                base.merge_from_cli(cli_config, sub);
            }
            base
        }
        None => cli_config.clone(),
    };

    // 4. Score table
    let table = load_score_table(&cli.table)
        .unwrap_or_else(|e| exit_with("Could not load score table", e));

    // 5. Execute
    let result = match &cli.command {
        Commands::Search(args) => cmd::search::run(args, config, table),
        Commands::Score(args) => cmd::score::run(args, config, table),
    };
    if let Err(e) = result {
        exit_with("FATAL ERROR", e);
    }
}
