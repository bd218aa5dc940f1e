//! Operator tool: apply migrations and bootstrap the first owner account.
//!
//! ```text
//! fournil-admin migrate
//! fournil-admin bootstrap --email owner@example.gn --display-name "Aminata" \
//!     --password-file /run/secrets/owner_password --restaurant "Boulangerie du Port"
//! ```
//!
//! Database settings come from the same `FOURNIL_*` variables as the server.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use fournil::domain::{AccountService, Registration, RestaurantService};
use fournil::outbound::password::Argon2PasswordHasher;
use fournil::outbound::persistence::{
    DbPool, DieselRestaurantRepository, DieselUserRepository, PoolConfig, run_migrations,
};
use fournil::settings::AppSettings;

#[derive(Debug, Parser)]
#[command(name = "fournil-admin", about = "Fournil operator commands")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending database migrations.
    Migrate,
    /// Create an owner account and its first restaurant.
    Bootstrap {
        /// Owner's email, used to sign in.
        #[arg(long)]
        email: String,
        /// Name shown to other staff.
        #[arg(long)]
        display_name: String,
        /// File holding the initial password.
        #[arg(long)]
        password_file: PathBuf,
        /// Optional phone number for SMS notifications.
        #[arg(long)]
        phone: Option<String>,
        /// Name of the restaurant to create.
        #[arg(long)]
        restaurant: String,
    },
}

#[derive(Debug, thiserror::Error)]
enum AdminError {
    #[error("configuration: {0}")]
    Settings(String),
    #[error("failed to read password file {path}: {source}")]
    PasswordFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Migration(#[from] fournil::outbound::persistence::MigrationError),
    #[error(transparent)]
    Pool(#[from] fournil::outbound::persistence::PoolError),
    #[error(transparent)]
    Domain(#[from] fournil::domain::Error),
}

fn load_settings() -> Result<AppSettings, AdminError> {
    // Flags belong to this tool; settings only come from the environment and files.
    AppSettings::load_from_iter([OsString::from("fournil-admin")])
        .map_err(|err| AdminError::Settings(err.to_string()))
}

fn read_password(path: PathBuf) -> Result<Zeroizing<String>, AdminError> {
    let raw = std::fs::read_to_string(&path)
        .map(Zeroizing::new)
        .map_err(|source| AdminError::PasswordFile { path, source })?;
    Ok(Zeroizing::new(raw.trim_end_matches(['\r', '\n']).to_owned()))
}

async fn migrate(settings: &AppSettings) -> Result<(), AdminError> {
    let url = settings
        .database_url()
        .map_err(|err| AdminError::Settings(err.to_string()))?;
    let applied = run_migrations(url).await?;
    info!(applied, "migrations applied");
    Ok(())
}

async fn bootstrap(settings: &AppSettings, command: Command) -> Result<(), AdminError> {
    let Command::Bootstrap {
        email,
        display_name,
        password_file,
        phone,
        restaurant,
    } = command
    else {
        return Ok(());
    };
    let password = read_password(password_file)?;
    let registration =
        Registration::try_from_parts(&display_name, &email, &password, phone.as_deref())
            .map_err(|err| AdminError::Invalid(format!("{}: {err}", err.field())))?;

    let url = settings
        .database_url()
        .map_err(|err| AdminError::Settings(err.to_string()))?;
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(2)).await?;
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let restaurants = Arc::new(DieselRestaurantRepository::new(pool));
    let clock = Arc::new(DefaultClock);

    let accounts = AccountService::new(
        users.clone(),
        restaurants.clone(),
        Arc::new(Argon2PasswordHasher::default()),
        clock.clone(),
    );
    let owner = accounts.register(registration).await?;
    let created = RestaurantService::new(restaurants, users, clock)
        .create(owner.id.clone(), &restaurant)
        .await?;
    info!(
        user_id = %owner.id,
        restaurant_id = %created.id,
        "owner and restaurant created"
    );
    Ok(())
}

async fn run(cli: Cli) -> Result<(), AdminError> {
    let settings = load_settings()?;
    match cli.command {
        Command::Migrate => migrate(&settings).await,
        command @ Command::Bootstrap { .. } => bootstrap(&settings, command).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = fmt().with_env_filter(EnvFilter::from_default_env()).try_init();
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "fournil-admin failed");
            eprintln!("fournil-admin: {err}");
            ExitCode::FAILURE
        }
    }
}
