use std::path::PathBuf;
use std::sync::Arc;

use bookshare::config::{ClientConfig, Overrides};
use bookshare::error::{ApiError, AuthError, ConfigError};
use bookshare::nav::{GuardDecision, History, Resolution, Router};
use bookshare::net::api::HttpIdentityService;
use bookshare::net::request::ApiClient;
use bookshare::state::{HttpSessionStore, SessionStore};
use bookshare::storage::FileCredentialStore;
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("not logged in; run `bookshare login`")]
    NotLoggedIn,
    #[error("no view matches {0}")]
    NotFound(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "bookshare", about = "BookShare session client")]
struct Cli {
    /// Overrides `BOOKSHARE_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Overrides `BOOKSHARE_TOKEN_PATH`.
    #[arg(long)]
    token_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and persist the session credential.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BOOKSHARE_PASSWORD")]
        password: String,
    },
    /// Create an account and log in as it.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "BOOKSHARE_PASSWORD")]
        password: String,
    },
    /// Forget the persisted credential.
    Logout,
    /// Print the identity behind the persisted credential.
    Whoami,
    /// Navigate to a client view through the navigation guard.
    Open { path: String },
    /// Issue an authorized GET against a backend path, e.g. `/api/books`.
    Get { path: String },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env_with(&Overrides {
        api_url: cli.api_url,
        token_path: cli.token_path,
    })?;

    let api = ApiClient::from_config(&config)?;
    let store = Arc::new(SessionStore::new(
        HttpIdentityService::new(api.clone()),
        FileCredentialStore::new(&config.token_path),
    ));
    store.initialize().await;

    match cli.command {
        Command::Login { email, password } => {
            let user = store.login(&email, &password).await?;
            print_json(&serde_json::to_value(user)?)
        }
        Command::Register { name, email, password } => {
            let user = store
                .register(&name, &email, &password)
                .await?;
            print_json(&serde_json::to_value(user)?)
        }
        Command::Logout => {
            store.logout();
            println!("logged out");
            Ok(())
        }
        Command::Whoami => run_whoami(&store),
        Command::Open { path } => run_open(&store, &path),
        Command::Get { path } => run_get(&store, &api, &path).await,
    }
}

fn run_whoami(store: &HttpSessionStore) -> Result<(), CliError> {
    let user = store.user().ok_or(CliError::NotLoggedIn)?;
    print_json(&serde_json::to_value(user)?)
}

fn run_open(store: &HttpSessionStore, path: &str) -> Result<(), CliError> {
    let history = Arc::new(History::default());
    let router = Router::new(Arc::clone(&history));

    match router.open(path, &store.snapshot()) {
        Resolution::NotFound => return Err(CliError::NotFound(path.to_owned())),
        Resolution::Public(route) => println!("{}", route.title()),
        Resolution::Guarded { route, decision } => match decision {
            GuardDecision::Render => println!("{}", route.title()),
            GuardDecision::Placeholder => println!("Loading..."),
            GuardDecision::Redirect { to, .. } => println!("redirected to {to}"),
        },
    }
    if let Some(current) = history.current() {
        tracing::debug!(%current, "navigation settled");
    }
    Ok(())
}

async fn run_get(store: &HttpSessionStore, api: &ApiClient, path: &str) -> Result<(), CliError> {
    let credential = store
        .require_credential()
        .map_err(|_| CliError::NotLoggedIn)?;
    let json = api.get_json(path, &credential).await?;
    print_json(&json)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
