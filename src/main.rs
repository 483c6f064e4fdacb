//! Parley - chat with your PostgreSQL database from the terminal.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use db_parley::chat::ChatSession;
use db_parley::cli::Cli;
use db_parley::config::{Config, ConnectionConfig};
use db_parley::error::{ParleyError, Result};
use db_parley::import;
use db_parley::repl::{self, ReplInput};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e.message());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Load configuration file
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    // Build connection config with precedence:
    // 1. CLI arguments (highest)
    // 2. Named connection from config
    // 3. Default connection from config
    // 4. Environment variables
    let connection = resolve_connection(&cli, &config)?;

    let csv_path = cli
        .csv
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.import.path));
    let import_table = cli.table.clone().unwrap_or_else(|| config.import.table.clone());

    let mut session = ChatSession::new();

    println!("Chat with your database. Type \\help for commands.");
    match connection {
        Some(conn) => {
            info!("Connection: {}", conn.display_string());
            match session.connect(&conn).await {
                Ok(()) => println!("Connection successful!"),
                Err(e) => println!("Connection failed: {}", e.message()),
            }
        }
        None => {
            warn!("No database connection configured");
            println!("No connection configured. Use \\connect, or see --help.");
        }
    }

    let stdin = io::stdin();
    loop {
        print!("parley> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        match repl::parse_input(&line) {
            ReplInput::Empty => {}
            ReplInput::Quit => break,
            ReplInput::Help => println!("{}", repl::help_text()),
            ReplInput::Unknown(cmd) => println!("Unknown command: \\{cmd}. Try \\help."),
            ReplInput::History => {
                for entry in session.log().entries() {
                    println!("{}: {}", entry.speaker.label(), entry.text);
                }
            }
            ReplInput::Connect(arg) => handle_connect(&mut session, &config, arg).await,
            ReplInput::Import { path, table } => {
                let path = path.unwrap_or_else(|| csv_path.clone());
                let table = table.unwrap_or_else(|| import_table.clone());
                handle_import(&session, &path, &table).await;
            }
            ReplInput::Question(text) => {
                let response = session.ask(&text).await;
                println!("{response}");
            }
        }
    }

    session.close().await?;
    Ok(())
}

/// Resolves the final connection configuration from CLI args, config file,
/// and environment.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<Option<ConnectionConfig>> {
    // Start with CLI connection config if provided
    let mut connection = cli.to_connection_config()?;

    // If no CLI connection, try named connection from config
    if connection.is_none() {
        if let Some(name) = cli.connection_name() {
            connection = config.get_connection(Some(name)).cloned();
            if connection.is_none() {
                return Err(ParleyError::config(format!(
                    "Connection '{}' not found in config file",
                    name
                )));
            }
        }
    }

    // If still no connection, try default from config
    if connection.is_none() {
        connection = config.get_connection(None).cloned();
    }

    // Apply environment variable defaults and the stock database name
    if let Some(ref mut conn) = connection {
        conn.apply_env_defaults();
        conn.apply_database_fallback();
    }

    Ok(connection)
}

/// Connects from a `\connect` argument: a connection string, a named config
/// entry, or nothing (re-resolve from environment).
async fn handle_connect(session: &mut ChatSession, config: &Config, arg: Option<String>) {
    let resolved = match arg.as_deref() {
        Some(s) if s.starts_with("postgres://") || s.starts_with("postgresql://") => {
            ConnectionConfig::from_connection_string(s)
        }
        Some(name) => config
            .get_connection(Some(name))
            .cloned()
            .ok_or_else(|| ParleyError::config(format!("Connection '{name}' not found in config file"))),
        None => {
            let mut conn = config.get_connection(None).cloned().unwrap_or_default();
            conn.apply_env_defaults();
            Ok(conn)
        }
    };

    let mut conn = match resolved {
        Ok(conn) => conn,
        Err(e) => {
            println!("Connection failed: {}", e.message());
            return;
        }
    };
    conn.apply_database_fallback();

    match session.connect(&conn).await {
        Ok(()) => println!("Connection successful!"),
        Err(e) => println!("Connection failed: {}", e.message()),
    }
}

/// Previews the CSV file and appends its rows into the table.
async fn handle_import(session: &ChatSession, path: &std::path::Path, table: &str) {
    let Some(db) = session.db() else {
        println!("Please connect to a database first.");
        return;
    };

    match import::preview(path) {
        Ok(preview) => {
            println!("Data Preview:");
            print!("{}", preview.render());
        }
        Err(e) => {
            println!("Error loading CSV: {}", e.message());
            return;
        }
    }

    match import::import_csv(db, path, table).await {
        Ok(inserted) => {
            println!("Data inserted into '{table}' table successfully! ({inserted} rows)")
        }
        Err(e) => println!("Error inserting data: {}", e.message()),
    }
}
