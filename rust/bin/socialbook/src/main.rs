//! `socialbook`: command-line client for the socialbook network.
//!
//! Drives the same session and relation core a graphical client would:
//! tokens live in a local redb file, requests go to the GraphQL backend.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use socialbook_client::SignupForm;

use commands::App;
use config::ClientConfig;

/// socialbook CLI.
#[derive(Parser, Debug)]
#[command(name = "socialbook", about = "socialbook CLI client")]
struct Cli {
    /// Path to client config file (default: ~/.socialbook/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Backend base URL (overrides the config file).
    #[arg(long = "api-url", global = true)]
    api_url: Option<String>,

    /// Token storage file (overrides the config file).
    #[arg(long = "storage", global = true)]
    storage: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and store the session token.
    Login {
        /// Username.
        #[arg(long)]
        user: Option<String>,
        /// Password (prompted when omitted).
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account, then log in.
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long = "first-name", default_value = "")]
        first_name: String,
        #[arg(long = "last-name", default_value = "")]
        last_name: String,
        /// Password (prompted twice when omitted).
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the stored session.
    Logout,

    /// Validate the stored session and show who it belongs to.
    Whoami,

    /// Show the home feed and follow suggestions.
    Feed,

    /// Like or unlike a post.
    Like {
        /// Post id.
        post_id: String,
    },

    /// Share a post.
    Post {
        /// Caption text.
        caption: String,
        /// Image reference passed to the backend as-is (URL or encoded data).
        #[arg(long)]
        image: String,
    },

    /// Follow or unfollow a user.
    Follow {
        username: String,
    },

    /// Show version.
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("socialbook cli v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(ClientConfig::default_path);
    let mut config = ClientConfig::load(&config_path)?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(path) = cli.storage {
        config.storage.path = Some(path);
    }

    let app = App::open(&config)?;

    match cli.command {
        Commands::Login { user, password } => {
            let username = match user {
                Some(u) => u,
                None => prompt_line("Username: ")?,
            };
            let password = match password {
                Some(p) => p,
                None => rpassword::prompt_password("Password: ")?,
            };
            commands::account::login(&app, &username, &password).await?;
        }

        Commands::Signup {
            username,
            email,
            first_name,
            last_name,
            password,
        } => {
            let (password, confirm_password) = match password {
                Some(p) => (p.clone(), p),
                None => (
                    rpassword::prompt_password("Password: ")?,
                    rpassword::prompt_password("Confirm password: ")?,
                ),
            };
            let form = SignupForm {
                username,
                email,
                first_name,
                last_name,
                password,
                confirm_password,
            };
            commands::account::signup(&app, form).await?;
        }

        Commands::Logout => commands::account::logout(&app).await?,
        Commands::Whoami => commands::account::whoami(&app).await?,
        Commands::Feed => commands::feed::show(&app).await?,
        Commands::Like { post_id } => commands::social::like(&app, &post_id).await?,
        Commands::Follow { username } => commands::social::follow(&app, &username).await?,
        Commands::Post { caption, image } => {
            commands::social::create(&app, &image, &caption).await?
        }
        Commands::Version => {}
    }

    Ok(())
}

fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    eprint!("{}", prompt);
    let mut s = String::new();
    std::io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}
