use anyhow::Context;
use clap::Parser;

use desemprego_zero::config::DatabaseConfig;
use desemprego_zero::database::{manager, schema, PgStore};
use desemprego_zero::services::{provision_admin, AuthError};

/// Provision an admin account. Admins cannot sign up over HTTP.
#[derive(Parser)]
#[command(name = "create-admin")]
#[command(version)]
struct Args {
    #[arg(long)]
    username: String,

    #[arg(long)]
    email: String,

    /// Minimum 6 characters
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    if args.password.chars().count() < 6 {
        anyhow::bail!("password must be at least 6 characters");
    }
    let email = args.email.trim().to_lowercase();

    let config = DatabaseConfig::from_env().context("invalid database configuration")?;
    let pool = manager::connect(&config)
        .await
        .context("failed to connect to database")?;
    schema::ensure_schema(&pool).await?;

    let store = PgStore::new(pool);
    match provision_admin(&store, args.username.trim(), &email, &args.password).await {
        Ok(admin) => {
            println!("Created admin {} <{}> (id {})", admin.username, admin.email, admin.id);
            Ok(())
        }
        Err(AuthError::AlreadyExists(constraint)) => {
            eprintln!("Error: admin already exists ({})", constraint);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
