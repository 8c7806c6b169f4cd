//! Administration commands: superusers, tokens and OAuth applications.

use anyhow::{anyhow, Result};
use app::app::core_user::CoreUserApp;
use app::app::oauth::OAuthApp;
use app::module::{AppConfigModule, AppModule};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use infra::infra::core_user::rdb::{CoreUserRepository, UseCoreUserRepository};
use model::{ApplicationData, AuthorizationGrantType, ClientType, CoreUser};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an active superuser.
    CreateSuperuser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "Default Organization")]
        organization: String,
    },
    /// Issue a bearer token for an active user.
    IssueToken {
        #[arg(long)]
        username: String,
        /// application id (a refresh token is issued with it)
        #[arg(long)]
        application: Option<i64>,
        #[arg(long, default_value = "read write")]
        scope: String,
    },
    /// Register an OAuth application owned by a user.
    CreateApplication {
        #[arg(long)]
        username: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "confidential")]
        client_type: String,
        #[arg(long, default_value = "password")]
        grant_type: String,
        /// space separated
        #[arg(long, default_value = "")]
        redirect_uris: String,
    },
    /// Delete expired access and refresh tokens.
    ClearTokens,
}

async fn find_user(app_module: &AppModule, username: &str) -> Result<CoreUser> {
    app_module
        .repositories
        .core_user_repository()
        .find_by_username(username)
        .await?
        .ok_or_else(|| anyhow!("user not found: {}", username))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();
    let conf = command_utils::util::tracing::load_tracing_config_from_env().unwrap_or_default();
    command_utils::util::tracing::tracing_init(conf)?;

    let config_module = Arc::new(AppConfigModule::new_by_env()?);
    let app_module = AppModule::new_by_env(config_module).await?;

    match args.command {
        Command::CreateSuperuser {
            username,
            email,
            password,
            organization,
        } => {
            let user = app_module
                .core_user_app
                .create_superuser(&username, &email, &password, &organization)
                .await?;
            println!("created superuser {} (id: {})", user.data.username, user.id);
        }
        Command::IssueToken {
            username,
            application,
            scope,
        } => {
            let user = find_user(&app_module, &username).await?;
            let issued = app_module
                .oauth_app
                .issue_token(user.id, application, &scope)
                .await?;
            println!("access_token: {}", issued.access_token.data.token);
            println!("expires: {}", issued.access_token.data.expires);
            if let Some(refresh) = issued.refresh_token {
                println!("refresh_token: {}", refresh.data.token);
            }
        }
        Command::CreateApplication {
            username,
            name,
            client_type,
            grant_type,
            redirect_uris,
        } => {
            let user = find_user(&app_module, &username).await?;
            let requester = app_module
                .core_user_app
                .find_requester(user.id)
                .await?
                .ok_or_else(|| anyhow!("user not found: {}", username))?;
            let data = ApplicationData {
                client_type: ClientType::from_str(&client_type)?,
                authorization_grant_type: AuthorizationGrantType::from_str(&grant_type)?,
                name,
                redirect_uris,
                ..Default::default()
            };
            let application = app_module
                .oauth_app
                .create_application(&requester, &data)
                .await?;
            println!("application id: {}", application.id);
            println!("client_id: {}", application.data.client_id);
            println!("client_secret: {}", application.data.client_secret);
        }
        Command::ClearTokens => {
            let removed = app_module.oauth_app.clear_expired_tokens().await?;
            println!("removed {} expired tokens", removed);
        }
    }
    Ok(())
}
