use crate::api::{AuthProof, AuthProofError};
use crate::bot::commands::reply_ephemeral;
use crate::bot::{Context, Data, Error, NOT_LINKED_MESSAGE};
use crate::services::attendance;
use crate::utils::format::{format_error_message, format_punch_outcome, format_success_message};
use crate::utils::validation::validate_pin;

/// What a punch attempt ended in, ready to show to the user.
pub(crate) enum PunchReply {
    Done(String),
    /// No PIN given and no device credential enrolled.
    NeedsPin,
    Failed(String),
}

impl PunchReply {
    pub(crate) fn into_message(self) -> String {
        match self {
            PunchReply::Done(message) => format_success_message(&message),
            PunchReply::NeedsPin => format_error_message(
                "Nenhuma credencial cadastrada. Use `/punch pin:<seu PIN>` ou cadastre uma com `/enroll`.",
            ),
            PunchReply::Failed(message) => format_error_message(&message),
        }
    }
}

/// Registers the next punch for `discord_id`. Shared by `/punch`, the punch
/// button and the PIN modal.
pub(crate) async fn perform_punch(data: &Data, discord_id: &str, pin: Option<&str>) -> PunchReply {
    let Some(_permit) = data.punch_guard.try_acquire(discord_id) else {
        return PunchReply::Failed("Já existe um registro em andamento. Aguarde.".to_string());
    };

    let linked = match data.linked_session(discord_id).await {
        Ok(Some(linked)) => linked,
        Ok(None) => return PunchReply::Failed(NOT_LINKED_MESSAGE.to_string()),
        Err(e) => {
            tracing::error!("Failed to load session for {}: {:?}", discord_id, e);
            return PunchReply::Failed("Falha ao carregar sua sessão".to_string());
        }
    };

    if let Some(pin) = pin.map(str::trim).filter(|pin| !pin.is_empty()) {
        if let Err(e) = validate_pin(pin) {
            return PunchReply::Failed(e.to_string());
        }
    }

    let proof = match AuthProof::select(linked.credential_id.as_deref(), pin) {
        Ok(proof) => proof,
        Err(AuthProofError::PinRequired) => return PunchReply::NeedsPin,
    };

    let now = chrono::Utc::now();
    match attendance::punch(
        &data.api,
        &linked.session(),
        &proof,
        &data.config.device_name,
        now,
    )
    .await
    {
        Ok(outcome) => {
            tracing::info!(
                "Punch for {}: requested {}, stored {:?}",
                discord_id,
                outcome.requested,
                outcome.committed_type()
            );
            PunchReply::Done(format_punch_outcome(&outcome, data.offset))
        }
        Err(e) => PunchReply::Failed(data.describe_api_error(discord_id, &e).await),
    }
}

/// Registra o próximo ponto (entrada ou saída)
#[poise::command(slash_command)]
pub async fn punch(
    ctx: Context<'_>,
    #[description = "PIN (opcional com credencial cadastrada)"] pin: Option<String>,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;
    let discord_id = ctx.author().id.to_string();

    let reply = perform_punch(ctx.data(), &discord_id, pin.as_deref()).await;
    reply_ephemeral(ctx, reply.into_message()).await
}
