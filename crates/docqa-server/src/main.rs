//! DocQA server binary
//!
//! Starts the HTTP API for document upload and question answering.

use docqa_server::{config::ServerConfig, start_server, ServerError};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: No config file specified, using default test configuration");
        eprintln!("Usage: docqa-server --config <path-to-config.toml>");
        eprintln!();
        ServerConfig::default_test_config()
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("DocQA Server - Document question answering over HTTP");
    println!();
    println!("USAGE:");
    println!("    docqa-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file may contain:");
    println!("    - bind_address, bind_port: where to listen (default 127.0.0.1:5000)");
    println!("    - database_path: SQLite file (default document_qa.db)");
    println!("    - upload_dir: where uploads are stored (default uploads)");
    println!("    - jwt_secret: secret key for token signing (required)");
    println!("    - token_expiry_secs: token lifetime (default 3600)");
    println!("    - [pipeline.chunking], [pipeline.budget], [inference] sections");
    println!();
    println!("ENVIRONMENT:");
    println!("    DOCQA_API_KEY      Inference API key when not set in the config file");
    println!("    RUST_LOG           Log filter (default info)");
    println!();
}
