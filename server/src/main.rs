use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::seq::SliceRandom;
use skillswap_auth::{AuthError, Registration};
use skillswap_backend_api::{build_router, services, services::ServiceError};
use skillswap_backend_runtime::{jobs, shutdown_signal, telemetry, BackendServices};
use skillswap_config::{load as load_config, AppConfig};
use tokio::net::TcpListener;
use tracing::{info, warn};

const SEED_PASSWORD: &str = "password123";

const FIRST_NAMES: &[&str] = &[
    "Alex", "Jordan", "Taylor", "Casey", "Morgan", "Riley", "Quinn", "Avery", "Blake", "Cameron",
    "Drew", "Emery", "Finley", "Gray", "Harper", "Indigo", "Jamie", "Kendall", "Logan", "Mason",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin",
];

const LOCATIONS: &[&str] = &[
    "New York, NY",
    "Los Angeles, CA",
    "Chicago, IL",
    "Houston, TX",
    "Phoenix, AZ",
    "Philadelphia, PA",
    "San Diego, CA",
    "Austin, TX",
    "Columbus, OH",
    "San Francisco, CA",
    "Seattle, WA",
    "Denver, CO",
    "Washington, DC",
];

const AVATAR_URLS: &[&str] = &[
    "https://images.pexels.com/photos/1680172/pexels-photo-1680172.jpeg?auto=compress&cs=tinysrgb&w=150",
    "https://images.pexels.com/photos/1222271/pexels-photo-1222271.jpeg?auto=compress&cs=tinysrgb&w=150",
    "https://images.pexels.com/photos/774909/pexels-photo-774909.jpeg?auto=compress&cs=tinysrgb&w=150",
    "https://images.pexels.com/photos/1462630/pexels-photo-1462630.jpeg?auto=compress&cs=tinysrgb&w=150",
    "https://images.pexels.com/photos/1516680/pexels-photo-1516680.jpeg?auto=compress&cs=tinysrgb&w=150",
    "https://images.pexels.com/photos/927022/pexels-photo-927022.jpeg?auto=compress&cs=tinysrgb&w=150",
    "https://images.pexels.com/photos/1239291/pexels-photo-1239291.jpeg?auto=compress&cs=tinysrgb&w=150",
    "https://images.pexels.com/photos/1043474/pexels-photo-1043474.jpeg?auto=compress&cs=tinysrgb&w=150",
];

#[derive(Parser, Debug)]
#[command(name = "skillswap-backend", about = "SkillSwap backend server and admin tasks")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Run the HTTP API (default).
    Serve,
    /// Insert random demo users, all with the password `password123`.
    SeedData {
        #[arg(long, default_value_t = 20)]
        count: usize,
    },
    /// Mark overdue exchange sessions as expired and exit.
    ExpireSessions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing()?;

    let cli = Cli::parse();
    let config = load_config().context("failed to load configuration")?;
    let backend = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, &backend).await,
        Command::SeedData { count } => {
            let created = seed_users(&backend, count).await?;
            info!(created, requested = count, "seed data inserted");
            Ok(())
        }
        Command::ExpireSessions => {
            jobs::run_expiry_once(&backend.db_pool).await?;
            Ok(())
        }
    }
}

async fn serve(config: &AppConfig, backend: &BackendServices) -> anyhow::Result<()> {
    info!(environment = %config.http.environment, "starting SkillSwap backend");

    let expiry_job = jobs::spawn_expiry_job(backend.db_pool.clone(), &config.jobs);
    let app = build_router(backend.app_state());

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error");

    if let Some(job) = expiry_job {
        job.abort();
    }

    served?;
    info!("backend shut down");
    Ok(())
}

fn random_registration(index: usize) -> Registration {
    let mut rng = rand::thread_rng();
    let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Alex");
    let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Smith");

    Registration {
        name: format!("{first} {last}"),
        email: format!(
            "{}.{}{index}@example.com",
            first.to_lowercase(),
            last.to_lowercase()
        ),
        password: SEED_PASSWORD.to_string(),
        location: LOCATIONS.choose(&mut rng).map(|value| value.to_string()),
        bio: None,
        avatar: AVATAR_URLS.choose(&mut rng).map(|value| value.to_string()),
    }
}

/// Registers `count` random users, skipping emails that are already taken.
async fn seed_users(backend: &BackendServices, count: usize) -> anyhow::Result<usize> {
    let mut created = 0;
    for index in 0..count {
        let registration = random_registration(index);
        let email = registration.email.clone();
        match services::auth::register(
            &backend.authenticator,
            backend.stream.as_deref(),
            registration,
        )
        .await
        {
            Ok(user) => {
                info!(user = %user.id, %email, "seeded user");
                created += 1;
            }
            Err(ServiceError::Auth(AuthError::UserExists)) => {
                warn!(%email, "seed user already exists, skipping");
            }
            Err(error) => return Err(error).with_context(|| format!("failed to seed {email}")),
        }
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["skillswap-backend"]).unwrap();
        assert_eq!(cli.command, None);

        let cli = Cli::try_parse_from(["skillswap-backend", "seed-data"]).unwrap();
        assert_eq!(cli.command, Some(Command::SeedData { count: 20 }));

        let cli = Cli::try_parse_from(["skillswap-backend", "seed-data", "--count", "3"]).unwrap();
        assert_eq!(cli.command, Some(Command::SeedData { count: 3 }));

        let cli = Cli::try_parse_from(["skillswap-backend", "expire-sessions"]).unwrap();
        assert_eq!(cli.command, Some(Command::ExpireSessions));
    }

    #[test]
    fn random_registrations_use_the_demo_password() {
        let registration = random_registration(7);
        assert_eq!(registration.password, SEED_PASSWORD);
        assert!(registration.email.ends_with("7@example.com"));
        assert!(registration.name.contains(' '));
        assert!(registration
            .location
            .as_deref()
            .is_some_and(|location| LOCATIONS.contains(&location)));
        assert!(registration.avatar.is_some());
    }
}
