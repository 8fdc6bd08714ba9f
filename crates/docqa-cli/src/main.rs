//! DocQA CLI - ask questions about local documents.

use clap::Parser;
use docqa_cli::commands;
use docqa_cli::repl;
use docqa_cli::{init_tracing, Cli, Command, Config, Formatter, Session};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> docqa_cli::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::path()?,
    };
    let mut config = Config::load_from(&path)?;
    if !path.exists() {
        config.save()?;
    }

    // Override profile for this invocation only
    if let Some(profile_name) = cli.profile {
        config.switch_profile(profile_name)?;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    // Profile commands never touch the database
    let command = match cli.command {
        Command::Profile(args) => {
            return commands::execute_profile(args, &mut config, &formatter).await;
        }
        other => other,
    };

    let mut session = Session::open(config.get_active_profile()?)?;

    match command {
        Command::Ingest(args) => commands::execute_ingest(args, &mut session, &formatter).await,
        Command::Documents => commands::execute_documents(&session, &formatter).await,
        Command::Show(args) => commands::execute_show(args, &session, &formatter).await,
        Command::Ask(args) => commands::execute_ask(args, &mut session, &formatter).await,
        Command::Summarize(args) => commands::execute_summarize(args, &session, &formatter).await,
        Command::History(args) => commands::execute_history(args, &session, &formatter).await,
        Command::Forget(args) => commands::execute_forget(args, &mut session, &formatter).await,
        Command::Remove(args) => commands::execute_remove(args, &mut session, &formatter).await,
        Command::Chunks(args) => commands::execute_chunks(args, &session, &formatter).await,
        Command::Tables(args) => commands::execute_tables(args, &session, &formatter).await,
        Command::Chat(args) => {
            repl::run_chat(&args.id, &mut session, &formatter, config.settings.history_size).await
        }
        Command::Profile(_) => unreachable!("profile commands return early"),
    }
}
