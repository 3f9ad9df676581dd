use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::state::AppState;
use crate::{db, routes, services};

#[derive(Debug, Parser)]
#[command(name = "event-media-kit", version, about = "Event records with images and video")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply migrations and serve the HTTP API (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Create a user, prompting for the password
    CreateUser {
        #[arg(long)]
        user_name: String,
        #[arg(long)]
        email: String,
    },
}

pub async fn run(cli: Cli, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(&config.database_url).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            db::migrate(&db).await?;
            tokio::fs::create_dir_all(&config.media_root).await?;

            let app = routes::create_routes(AppState::new(db, config.clone()));
            let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
            tracing::info!("Listening on {}", listener.local_addr()?);
            axum::serve(listener, app).await?;
        }
        Command::Migrate => {
            db::migrate(&db).await?;
        }
        Command::CreateUser { user_name, email } => {
            db::migrate(&db).await?;
            let password = rpassword::prompt_password("Password: ")?;
            let confirm = rpassword::prompt_password("Confirm password: ")?;
            if password != confirm {
                return Err("Passwords do not match".into());
            }
            if password.is_empty() {
                return Err("Password must not be empty".into());
            }
            let user = services::auth::create_user(&db, &user_name, &email, &password).await?;
            println!("User '{}' created with id {}", user.user_name, user.id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_is_the_default_command() {
        let cli = Cli::parse_from(["event-media-kit"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_create_user_takes_name_and_email() {
        let cli = Cli::parse_from([
            "event-media-kit",
            "create-user",
            "--user-name",
            "admin",
            "--email",
            "admin@example.com",
        ]);
        match cli.command {
            Some(Command::CreateUser { user_name, email }) => {
                assert_eq!(user_name, "admin");
                assert_eq!(email, "admin@example.com");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
