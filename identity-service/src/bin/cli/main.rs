use std::io::BufRead;

use clap::Parser;
use clap::Subcommand;
use identity_service::config::Config;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Operator tool for Linkshelf credentials.
#[derive(Debug, Parser)]
#[command(name = "linkshelf-credentials", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Hash a password read from stdin
    HashPassword,
    /// Check a password read from stdin against an encoded hash
    VerifyPassword { hash: String },
    /// Issue a session token for a user
    IssueToken { user_id: i64, username: String },
    /// Verify a session token and print its claims
    VerifyToken { token: String },
    /// Issue an API key and print the values to store
    IssueApiKey,
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,linkshelf_credentials=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::load().map_err(|e| {
        tracing::error!(error = %e, "Configuration invalid, refusing to start");
        e
    })?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        memory_kib = config.password.memory_kib,
        iterations = config.password.iterations,
        parallelism = config.password.parallelism,
        expiration_hours = config.jwt.expiration_hours,
        "Configuration loaded"
    );

    let authenticator = config.authenticator()?;

    match cli.command {
        Command::HashPassword => {
            let password = read_password()?;
            println!("{}", authenticator.hash_password(&password)?);
        }
        Command::VerifyPassword { hash } => {
            let password = read_password()?;
            let matches = authenticator.verify_password(&password, &hash)?;
            println!("{}", if matches { "match" } else { "no match" });
            if !matches {
                std::process::exit(1);
            }
        }
        Command::IssueToken { user_id, username } => {
            println!("{}", authenticator.generate_token(user_id, &username)?);
        }
        Command::VerifyToken { token } => {
            let claims = authenticator.validate_token(&token)?;
            println!(
                "sub={} username={} iat={} exp={}",
                claims.sub, claims.username, claims.iat, claims.exp
            );
        }
        Command::IssueApiKey => {
            let key = authenticator.issue_api_key()?;
            println!("token={}", key.token());
            println!("short_token={}", key.short_token());
            println!("token_hash={}", key.long_token_hash());
        }
    }

    Ok(())
}

fn read_password() -> Result<String, anyhow::Error> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    let password = line.trim_end_matches(&['\r', '\n'][..]).to_string();
    if password.is_empty() {
        anyhow::bail!("no password given on stdin");
    }

    Ok(password)
}
