pub mod account;
pub mod attendance;
pub mod reports;
pub mod status;

use crate::bot::{Context, Error, NOT_LINKED_MESSAGE};
use crate::database::models::LinkedSession;
use crate::utils::format::format_error_message;

pub(crate) async fn reply_ephemeral(ctx: Context<'_>, content: String) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().content(content).ephemeral(true))
        .await?;
    Ok(())
}

/// Loads the caller's linked session, telling them to log in when there is none.
pub(crate) async fn require_session(ctx: Context<'_>) -> Result<Option<LinkedSession>, Error> {
    let discord_id = ctx.author().id.to_string();

    match ctx.data().linked_session(&discord_id).await {
        Ok(Some(linked)) => Ok(Some(linked)),
        Ok(None) => {
            reply_ephemeral(ctx, format_error_message(NOT_LINKED_MESSAGE)).await?;
            Ok(None)
        }
        Err(e) => {
            tracing::error!("Failed to load session for {}: {:?}", discord_id, e);
            reply_ephemeral(ctx, format_error_message("Falha ao carregar sua sessão")).await?;
            Ok(None)
        }
    }
}
