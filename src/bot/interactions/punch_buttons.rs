use crate::bot::commands::attendance::perform_punch;
use crate::bot::commands::status::{PUNCH_BUTTON, REFRESH_BUTTON, day_components, load_day};
use crate::bot::{Data, Error, NOT_LINKED_MESSAGE};
use crate::utils::format::{create_day_embed, format_error_message};
use crate::utils::time::current_date;
use poise::serenity_prelude as serenity;

const PIN_MODAL: &str = "punch_pin_modal";

async fn respond_ephemeral(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    content: String,
) -> Result<(), Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

pub async fn handle_punch_interaction(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let (action, owner) = interaction
        .data
        .custom_id
        .split_once(':')
        .unwrap_or((interaction.data.custom_id.as_str(), ""));
    let discord_id = interaction.user.id.to_string();

    if owner != discord_id {
        return respond_ephemeral(
            ctx,
            interaction,
            format_error_message("Estes botões pertencem a outro usuário. Use `/today`."),
        )
        .await;
    }

    match action {
        PUNCH_BUTTON => handle_punch_button(ctx, interaction, data, &discord_id).await,
        REFRESH_BUTTON => handle_refresh(ctx, interaction, data, &discord_id).await,
        _ => {
            respond_ephemeral(ctx, interaction, "Ação desconhecida".to_string()).await
        }
    }
}

async fn handle_punch_button(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
    discord_id: &str,
) -> Result<(), Error> {
    let has_credential = match data.linked_session(discord_id).await {
        Ok(Some(linked)) => linked.credential_id.is_some(),
        Ok(None) => {
            return respond_ephemeral(ctx, interaction, format_error_message(NOT_LINKED_MESSAGE)).await;
        }
        Err(e) => {
            tracing::error!("Failed to load session for {}: {:?}", discord_id, e);
            return respond_ephemeral(
                ctx,
                interaction,
                format_error_message("Falha ao carregar sua sessão"),
            )
            .await;
        }
    };

    if !has_credential {
        return open_pin_modal(ctx, interaction).await;
    }

    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Defer(
                serenity::CreateInteractionResponseMessage::new().ephemeral(true),
            ),
        )
        .await?;

    let message = perform_punch(data, discord_id, None).await.into_message();

    interaction
        .create_followup(
            &ctx.http,
            serenity::CreateInteractionResponseFollowup::new()
                .content(message)
                .ephemeral(true),
        )
        .await?;

    Ok(())
}

async fn open_pin_modal(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
) -> Result<(), Error> {
    let modal = serenity::CreateModal::new(PIN_MODAL, "Registrar ponto")
        .components(vec![serenity::CreateActionRow::InputText(
            serenity::CreateInputText::new(serenity::InputTextStyle::Short, "PIN", "pin")
                .placeholder("4 a 6 dígitos")
                .required(true)
                .min_length(4)
                .max_length(6),
        )]);

    interaction
        .create_response(&ctx.http, serenity::CreateInteractionResponse::Modal(modal))
        .await?;

    Ok(())
}

async fn handle_refresh(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
    discord_id: &str,
) -> Result<(), Error> {
    let linked = match data.linked_session(discord_id).await {
        Ok(Some(linked)) => linked,
        Ok(None) => {
            return respond_ephemeral(ctx, interaction, format_error_message(NOT_LINKED_MESSAGE)).await;
        }
        Err(e) => {
            tracing::error!("Failed to load session for {}: {:?}", discord_id, e);
            return respond_ephemeral(
                ctx,
                interaction,
                format_error_message("Falha ao carregar sua sessão"),
            )
            .await;
        }
    };

    match load_day(data, &linked, current_date(data.offset)).await {
        Ok(view) => {
            let embed = create_day_embed(&interaction.user.name, &view, data.offset);
            interaction
                .create_response(
                    &ctx.http,
                    serenity::CreateInteractionResponse::UpdateMessage(
                        serenity::CreateInteractionResponseMessage::new()
                            .embed(embed)
                            .components(day_components(discord_id)),
                    ),
                )
                .await?;
            Ok(())
        }
        Err(message) => respond_ephemeral(ctx, interaction, format_error_message(&message)).await,
    }
}

pub async fn handle_punch_modal(
    ctx: &serenity::Context,
    interaction: &serenity::ModalInteraction,
    data: &Data,
) -> Result<(), Error> {
    if interaction.data.custom_id != PIN_MODAL {
        interaction
            .create_response(
                &ctx.http,
                serenity::CreateInteractionResponse::Message(
                    serenity::CreateInteractionResponseMessage::new()
                        .content("Formulário desconhecido")
                        .ephemeral(true),
                ),
            )
            .await?;
        return Ok(());
    }

    let pin = interaction
        .data
        .components
        .get(0)
        .and_then(|row| row.components.get(0))
        .and_then(|component| {
            if let serenity::ActionRowComponent::InputText(input) = component {
                input.value.as_deref()
            } else {
                None
            }
        })
        .unwrap_or("")
        .trim()
        .to_string();

    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Defer(
                serenity::CreateInteractionResponseMessage::new().ephemeral(true),
            ),
        )
        .await?;

    let discord_id = interaction.user.id.to_string();
    let message = perform_punch(data, &discord_id, Some(&pin)).await.into_message();

    interaction
        .create_followup(
            &ctx.http,
            serenity::CreateInteractionResponseFollowup::new()
                .content(message)
                .ephemeral(true),
        )
        .await?;

    Ok(())
}
