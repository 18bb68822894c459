//! Command-line front end for the shortener storage core.
//!
//! Every command runs against the backend selected by the environment (see
//! `shortener_store::config`). Deletes go through the background pipeline,
//! which is drained before the process exits.
//!
//! # Usage
//!
//! ```bash
//! # Shorten one or more URLs, optionally on behalf of a user
//! shortener-store shorten https://example.com
//! shortener-store --user 3f2a... shorten https://a.io https://b.io
//!
//! # Resolve an alias
//! shortener-store resolve AbCdEfGh
//!
//! # List or delete a user's links
//! shortener-store --user 3f2a... list
//! shortener-store --user 3f2a... delete AbCdEfGh QwErTyUi
//!
//! # Register or check a user (needs PASSWORD_SECRET)
//! shortener-store user register --login alice
//! shortener-store user login --login alice
//!
//! # Check the backend
//! shortener-store ping
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};

use shortener_store::application::services::BatchItem;
use shortener_store::config::{Config, load_from_env};
use shortener_store::logging::init_logging;
use shortener_store::{AppState, StorageError};

/// CLI for the shortener storage core.
#[derive(Parser)]
#[command(name = "shortener-store")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// External user id to act as (anonymous when omitted)
    #[arg(short, long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shorten one or more URLs
    Shorten {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Print the original URL of an alias
    Resolve { alias: String },

    /// List the links of the user given with --user
    List,

    /// Queue a soft-delete of aliases owned by the user given with --user
    Delete {
        #[arg(required = true)]
        aliases: Vec<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Check that the backend is reachable
    Ping,
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a new user
    Register {
        #[arg(short, long)]
        login: Option<String>,
    },

    /// Check a login and password
    Login {
        #[arg(short, long)]
        login: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = load_from_env().context("Invalid configuration")?;
    init_logging(&config);
    config.print_summary();

    let state = AppState::build(&config)
        .await
        .context("Failed to open storage")?;

    let outcome = tokio::select! {
        result = run(cli, &state, &config) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("{}", "Interrupted".yellow());
            Ok(())
        }
    };

    state
        .shutdown()
        .await
        .context("Failed to close storage")?;

    outcome
}

async fn run(cli: Cli, state: &AppState, config: &Config) -> Result<()> {
    let user = cli.user.as_deref();

    match cli.command {
        Commands::Shorten { urls } => shorten(state, user, urls).await,
        Commands::Resolve { alias } => resolve(state, &alias).await,
        Commands::List => list(state, require_user(user)?).await,
        Commands::Delete { aliases, yes } => {
            delete(state, require_user(user)?, aliases, yes).await
        }
        Commands::User { action } => {
            let secret = config.require_password_secret()?;
            handle_user_action(state, secret, action).await
        }
        Commands::Ping => ping(state).await,
    }
}

fn require_user(user: Option<&str>) -> Result<&str> {
    user.context("--user is required for this command")
}

async fn shorten(state: &AppState, user: Option<&str>, urls: Vec<String>) -> Result<()> {
    let links = &state.links;

    if let [url] = urls.as_slice() {
        let outcome = links
            .shorten(user, url)
            .await
            .with_context(|| format!("Failed to shorten {url}"))?;

        let status = if outcome.created {
            "created".green()
        } else {
            "exists".yellow()
        };
        println!("{}  {}", links.short_url(&outcome.alias).bright_cyan(), status);
        return Ok(());
    }

    let items = urls
        .into_iter()
        .enumerate()
        .map(|(i, original_url)| BatchItem {
            correlation_id: (i + 1).to_string(),
            original_url,
        })
        .collect();

    let results = links
        .shorten_batch(user, items)
        .await
        .context("Failed to shorten batch")?;

    for result in results {
        println!(
            "  {:<4} {}",
            result.correlation_id.bright_black(),
            links.short_url(&result.alias).bright_cyan()
        );
    }

    Ok(())
}

async fn resolve(state: &AppState, alias: &str) -> Result<()> {
    match state.links.resolve(alias).await {
        Ok(url) => {
            println!("{url}");
            Ok(())
        }
        Err(StorageError::Deleted(_)) => {
            println!("{}", format!("Alias '{alias}' has been deleted").red());
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to resolve '{alias}'")),
    }
}

async fn list(state: &AppState, user: &str) -> Result<()> {
    println!("{}", "Links".bright_blue().bold());
    println!();

    let links = state
        .links
        .user_links(user)
        .await
        .context("Failed to list links")?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    let mut rows: Vec<_> = links.into_iter().collect();
    rows.sort();

    println!(
        "  {:<10} {}",
        "Alias".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(60).bright_black());
    for (alias, url) in &rows {
        println!("  {:<10} {}", alias.cyan(), url);
    }
    println!();
    println!("  Total: {}", rows.len().to_string().bright_white().bold());

    Ok(())
}

async fn delete(
    state: &AppState,
    user: &str,
    aliases: Vec<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("  User:    {}", user.cyan());
    println!("  Aliases: {}", aliases.join(", ").cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete these links?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    state
        .links
        .delete_links(user, aliases)
        .await
        .context("Failed to queue delete")?;

    println!("{}", "Delete queued".green().bold());
    Ok(())
}

async fn handle_user_action(state: &AppState, secret: &str, action: UserAction) -> Result<()> {
    let users = state.users(secret);

    match action {
        UserAction::Register { login } => {
            let login = prompt_login(login)?;
            let password = Password::new()
                .with_prompt("Password")
                .with_confirmation("Repeat password", "Passwords do not match")
                .interact()?;

            match users.register(&login, &password).await {
                Ok(user) => {
                    println!("{}", "User registered".green().bold());
                    println!("  Login:   {}", user.login.cyan());
                    println!("  User id: {}", user.user_id.bright_yellow());
                }
                Err(StorageError::DuplicateLogin(login)) => {
                    println!("{}", format!("Login '{login}' is already taken").red());
                }
                Err(e) => return Err(e).context("Failed to register user"),
            }
        }
        UserAction::Login { login } => {
            let login = prompt_login(login)?;
            let password = Password::new().with_prompt("Password").interact()?;

            match users.authenticate(&login, &password).await {
                Ok(user) => {
                    println!("{}", "Credentials OK".green().bold());
                    println!("  User id: {}", user.user_id.bright_yellow());
                }
                Err(StorageError::InvalidCredentials) => {
                    println!("{}", "Invalid login or password".red());
                }
                Err(e) => return Err(e).context("Failed to authenticate"),
            }
        }
    }

    Ok(())
}

fn prompt_login(login: Option<String>) -> Result<String> {
    match login {
        Some(login) => Ok(login),
        None => Ok(Input::<String>::new()
            .with_prompt("Login")
            .interact_text()?),
    }
}

async fn ping(state: &AppState) -> Result<()> {
    println!(
        "{}",
        format!("Checking {} storage...", state.storage.backend_name()).bright_blue()
    );

    state.links.ping().await.context("Storage is unavailable")?;

    println!("{}", "Storage OK".green().bold());
    Ok(())
}
