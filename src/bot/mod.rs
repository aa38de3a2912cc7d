pub mod commands;
pub mod handlers;
pub mod interactions;

use crate::api::{ApiError, PontoClient};
use crate::config::Config;
use crate::database;
use crate::database::models::LinkedSession;
use crate::utils::punch_guard::PunchGuard;
use crate::utils::time::offset_from_hours;
use anyhow::Result;
use chrono::FixedOffset;
use poise::serenity_prelude as serenity;
use sqlx::SqlitePool;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

#[derive(Clone)]
pub struct Data {
    pub pool: SqlitePool,
    pub config: Config,
    pub api: PontoClient,
    pub offset: FixedOffset,
    pub punch_guard: PunchGuard,
}

impl Data {
    pub async fn linked_session(&self, discord_id: &str) -> Result<Option<LinkedSession>> {
        database::queries::get_session(&self.pool, discord_id).await
    }

    /// User-facing text for a failed backend call. A rejected token drops the
    /// stored session so the next command asks for a new login.
    pub async fn describe_api_error(&self, discord_id: &str, error: &ApiError) -> String {
        match error {
            ApiError::Unauthorized(_) => {
                tracing::info!("Dropping expired session for {}", discord_id);
                if let Err(e) = database::queries::delete_session(&self.pool, discord_id).await {
                    tracing::error!("Failed to delete session for {}: {:?}", discord_id, e);
                }
                "Sua sessão expirou. Use `/login` para entrar novamente.".to_string()
            }
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::Transport(e) => {
                tracing::error!("Backend unreachable: {:?}", e);
                "Não foi possível conectar ao servidor de ponto.".to_string()
            }
            ApiError::InvalidPin => "O PIN deve ter entre 4 e 6 dígitos".to_string(),
        }
    }
}

pub const NOT_LINKED_MESSAGE: &str = "Você não está conectado. Use `/login` ou `/signup` primeiro.";

pub async fn create_bot(config: Config) -> Result<serenity::Client> {
    let pool = database::create_connection(&config.database_url).await?;
    let api = PontoClient::new(&config.api_url, config.request_timeout)?;
    let offset = offset_from_hours(config.utc_offset_hours)?;

    tracing::info!("Using backend at {} (UTC offset {})", config.api_url, offset);

    let data = Data {
        pool,
        config: config.clone(),
        api,
        offset,
        punch_guard: PunchGuard::new(),
    };

    let intents = serenity::GatewayIntents::non_privileged();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::account::login(),
                commands::account::signup(),
                commands::account::logout(),
                commands::account::profile(),
                commands::account::update_profile(),
                commands::account::setpin(),
                commands::account::enroll(),
                commands::attendance::punch(),
                commands::status::today(),
                commands::reports::monthly(),
                commands::reports::export(),
                commands::reports::stats(),
            ],
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    Ok(client)
}
