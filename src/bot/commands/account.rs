use crate::api::Session;
use crate::api::auth::new_credential_id;
use crate::api::models::ProfileUpdate;
use crate::bot::commands::{reply_ephemeral, require_session};
use crate::bot::{Context, Error};
use crate::database::queries;
use crate::utils::format::{create_profile_embed, format_error_message, format_success_message};
use crate::utils::validation::{validate_email, validate_new_password, validate_pin};

/// Conecta sua conta do ponto digital
#[poise::command(slash_command)]
pub async fn login(
    ctx: Context<'_>,
    #[description = "Email da conta"] email: String,
    #[description = "Senha"] password: String,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;
    let discord_id = ctx.author().id.to_string();
    let data = ctx.data();

    let session = match data.api.login(email.trim(), &password).await {
        Ok(response) => Session::from(response),
        Err(e) => {
            let msg = data.describe_api_error(&discord_id, &e).await;
            return reply_ephemeral(ctx, format_error_message(&msg)).await;
        }
    };

    match queries::save_session(&data.pool, &discord_id, &session).await {
        Ok(linked) => {
            tracing::info!("Linked {} to backend user {}", discord_id, linked.user_id);
            reply_ephemeral(
                ctx,
                format_success_message(&format!("Conectado como {}", linked.name)),
            )
            .await
        }
        Err(e) => {
            tracing::error!("Failed to store session for {}: {:?}", discord_id, e);
            reply_ephemeral(ctx, format_error_message("Falha ao salvar a sessão")).await
        }
    }
}

/// Cria uma conta no ponto digital
#[poise::command(slash_command)]
pub async fn signup(
    ctx: Context<'_>,
    #[description = "Nome completo"] name: String,
    #[description = "Email"] email: String,
    #[description = "Senha (mínimo 6 caracteres)"] password: String,
    #[description = "Confirme a senha"] confirm_password: String,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;
    let discord_id = ctx.author().id.to_string();
    let data = ctx.data();

    if name.trim().is_empty() {
        return reply_ephemeral(ctx, format_error_message("Informe seu nome")).await;
    }
    if let Err(e) = validate_email(email.trim())
        .and_then(|_| validate_new_password(&password, &confirm_password))
    {
        return reply_ephemeral(ctx, format_error_message(&e.to_string())).await;
    }

    let session = match data.api.register(name.trim(), email.trim(), &password).await {
        Ok(response) => Session::from(response),
        Err(e) => {
            let msg = data.describe_api_error(&discord_id, &e).await;
            return reply_ephemeral(ctx, format_error_message(&msg)).await;
        }
    };

    match queries::save_session(&data.pool, &discord_id, &session).await {
        Ok(linked) => {
            reply_ephemeral(
                ctx,
                format_success_message(&format!(
                    "Conta criada para {}. Configure um PIN com `/setpin`.",
                    linked.name
                )),
            )
            .await
        }
        Err(e) => {
            tracing::error!("Failed to store session for {}: {:?}", discord_id, e);
            reply_ephemeral(ctx, format_error_message("Falha ao salvar a sessão")).await
        }
    }
}

/// Desconecta sua conta
#[poise::command(slash_command)]
pub async fn logout(ctx: Context<'_>) -> Result<(), Error> {
    let discord_id = ctx.author().id.to_string();

    match queries::delete_session(&ctx.data().pool, &discord_id).await {
        Ok(true) => reply_ephemeral(ctx, format_success_message("Sessão encerrada")).await,
        Ok(false) => reply_ephemeral(ctx, format_error_message("Você não está conectado")).await,
        Err(e) => {
            tracing::error!("Failed to delete session for {}: {:?}", discord_id, e);
            reply_ephemeral(ctx, format_error_message("Falha ao encerrar a sessão")).await
        }
    }
}

/// Mostra seu perfil
#[poise::command(slash_command)]
pub async fn profile(ctx: Context<'_>) -> Result<(), Error> {
    let Some(linked) = require_session(ctx).await? else {
        return Ok(());
    };
    ctx.defer_ephemeral().await?;
    let data = ctx.data();

    match data.api.profile(&linked.session()).await {
        Ok(profile) => {
            if let Err(e) = queries::update_profile(&data.pool, &linked.discord_id, &profile).await {
                tracing::warn!("Failed to refresh cached profile: {:?}", e);
            }
            let embed = create_profile_embed(&profile, linked.credential_id.is_some());
            ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
                .await?;
            Ok(())
        }
        Err(e) => {
            let msg = data.describe_api_error(&linked.discord_id, &e).await;
            reply_ephemeral(ctx, format_error_message(&msg)).await
        }
    }
}

/// Atualiza seu nome ou senha
#[poise::command(slash_command)]
pub async fn update_profile(
    ctx: Context<'_>,
    #[description = "Novo nome"] name: Option<String>,
    #[description = "Senha atual (necessária para trocar a senha)"] current_password: Option<String>,
    #[description = "Nova senha"] new_password: Option<String>,
    #[description = "Confirme a nova senha"] confirm_password: Option<String>,
) -> Result<(), Error> {
    let Some(linked) = require_session(ctx).await? else {
        return Ok(());
    };
    ctx.defer_ephemeral().await?;
    let data = ctx.data();

    let new_password = new_password.filter(|password| !password.is_empty());
    if let Some(password) = &new_password {
        if let Err(e) = validate_new_password(password, confirm_password.as_deref().unwrap_or("")) {
            return reply_ephemeral(ctx, format_error_message(&e.to_string())).await;
        }
        if current_password.as_deref().unwrap_or("").is_empty() {
            return reply_ephemeral(
                ctx,
                format_error_message("Informe a senha atual para trocar a senha"),
            )
            .await;
        }
    }

    let name = name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| linked.name.clone());
    let update = ProfileUpdate {
        name,
        current_password: new_password.as_ref().and(current_password),
        new_password,
    };

    match data.api.update_profile(&linked.session(), &update).await {
        Ok(profile) => {
            if let Err(e) = queries::update_profile(&data.pool, &linked.discord_id, &profile).await {
                tracing::warn!("Failed to refresh cached profile: {:?}", e);
            }
            reply_ephemeral(ctx, format_success_message("Perfil atualizado com sucesso!")).await
        }
        Err(e) => {
            let msg = data.describe_api_error(&linked.discord_id, &e).await;
            reply_ephemeral(ctx, format_error_message(&msg)).await
        }
    }
}

/// Configura o PIN usado para registrar o ponto
#[poise::command(slash_command)]
pub async fn setpin(
    ctx: Context<'_>,
    #[description = "PIN de 4 a 6 dígitos"] pin: String,
) -> Result<(), Error> {
    let Some(linked) = require_session(ctx).await? else {
        return Ok(());
    };

    if let Err(e) = validate_pin(pin.trim()) {
        return reply_ephemeral(ctx, format_error_message(&e.to_string())).await;
    }

    ctx.defer_ephemeral().await?;
    let data = ctx.data();

    match data.api.setup_pin(&linked.session(), pin.trim()).await {
        Ok(message) => {
            let message = message.unwrap_or_else(|| "PIN configurado com sucesso".to_string());
            reply_ephemeral(ctx, format_success_message(&message)).await
        }
        Err(e) => {
            let msg = data.describe_api_error(&linked.discord_id, &e).await;
            reply_ephemeral(ctx, format_error_message(&msg)).await
        }
    }
}

/// Cadastra (ou remove) a credencial biométrica deste dispositivo
#[poise::command(slash_command)]
pub async fn enroll(
    ctx: Context<'_>,
    #[description = "Remover a credencial cadastrada"] remove: Option<bool>,
) -> Result<(), Error> {
    let Some(linked) = require_session(ctx).await? else {
        return Ok(());
    };
    let pool = &ctx.data().pool;

    if remove.unwrap_or(false) {
        return match queries::set_credential(pool, &linked.discord_id, None).await {
            Ok(_) => {
                reply_ephemeral(
                    ctx,
                    format_success_message("Credencial removida. Use `/punch pin:` para registrar."),
                )
                .await
            }
            Err(e) => {
                tracing::error!("Failed to clear credential: {:?}", e);
                reply_ephemeral(ctx, format_error_message("Falha ao remover a credencial")).await
            }
        };
    }

    let credential_id = new_credential_id();
    match queries::set_credential(pool, &linked.discord_id, Some(&credential_id)).await {
        Ok(_) => {
            tracing::info!("Enrolled device credential for {}", linked.discord_id);
            reply_ephemeral(
                ctx,
                format_success_message("Credencial cadastrada. `/punch` e o botão de registro não pedirão mais o PIN."),
            )
            .await
        }
        Err(e) => {
            tracing::error!("Failed to store credential: {:?}", e);
            reply_ephemeral(ctx, format_error_message("Falha ao cadastrar a credencial")).await
        }
    }
}
