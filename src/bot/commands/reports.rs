use crate::bot::commands::{reply_ephemeral, require_session};
use crate::bot::{Context, Data, Error};
use crate::database::models::LinkedSession;
use crate::services::attendance::{self, MonthlyReport};
use crate::utils::format::{
    create_error_embed, create_monthly_embed, create_statistics_embed, format_error_message,
};
use crate::utils::time::current_date;
use crate::utils::validation::validate_year_month;
use chrono::Datelike;
use poise::serenity_prelude as serenity;

fn resolve_month(data: &Data, year: Option<i32>, month: Option<u32>) -> anyhow::Result<(i32, u32)> {
    let today = current_date(data.offset);
    let year = year.unwrap_or(today.year());
    let month = month.unwrap_or(today.month());
    validate_year_month(year, month)?;
    Ok((year, month))
}

async fn load_month(
    data: &Data,
    linked: &LinkedSession,
    year: i32,
    month: u32,
) -> Result<MonthlyReport, String> {
    let now = chrono::Utc::now();

    match attendance::monthly_report(&data.api, &linked.session(), year, month, data.offset, now).await
    {
        Ok(report) => Ok(report),
        Err(e) => Err(data.describe_api_error(&linked.discord_id, &e).await),
    }
}

/// Mostra o relatório mensal de horas
#[poise::command(slash_command)]
pub async fn monthly(
    ctx: Context<'_>,
    #[description = "Ano (padrão: atual)"] year: Option<i32>,
    #[description = "Mês 1-12 (padrão: atual)"] month: Option<u32>,
) -> Result<(), Error> {
    let Some(linked) = require_session(ctx).await? else {
        return Ok(());
    };
    let data = ctx.data();

    let (year, month) = match resolve_month(data, year, month) {
        Ok(period) => period,
        Err(e) => return reply_ephemeral(ctx, format_error_message(&e.to_string())).await,
    };

    ctx.defer().await?;

    match load_month(data, &linked, year, month).await {
        Ok(report) => {
            let embed = create_monthly_embed(&ctx.author().name, &report);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(message) => {
            let embed = create_error_embed("Erro", &message);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
    }

    Ok(())
}

/// Exporta o relatório mensal em CSV
#[poise::command(slash_command)]
pub async fn export(
    ctx: Context<'_>,
    #[description = "Ano (padrão: atual)"] year: Option<i32>,
    #[description = "Mês 1-12 (padrão: atual)"] month: Option<u32>,
) -> Result<(), Error> {
    let Some(linked) = require_session(ctx).await? else {
        return Ok(());
    };
    let data = ctx.data();

    let (year, month) = match resolve_month(data, year, month) {
        Ok(period) => period,
        Err(e) => return reply_ephemeral(ctx, format_error_message(&e.to_string())).await,
    };

    ctx.defer_ephemeral().await?;

    match load_month(data, &linked, year, month).await {
        Ok(report) => {
            let csv = report.csv(data.offset);
            tracing::info!(
                "Exporting {} for {} ({} days)",
                report.file_name(),
                linked.discord_id,
                report.days.len()
            );
            let attachment = serenity::CreateAttachment::bytes(csv.into_bytes(), report.file_name());
            ctx.send(
                poise::CreateReply::default()
                    .content(format!("📎 Total do mês: {}", report.totals.total))
                    .attachment(attachment)
                    .ephemeral(true),
            )
            .await?;
            Ok(())
        }
        Err(message) => reply_ephemeral(ctx, format_error_message(&message)).await,
    }
}

/// Mostra as estatísticas do mês calculadas pelo servidor
#[poise::command(slash_command)]
pub async fn stats(ctx: Context<'_>) -> Result<(), Error> {
    let Some(linked) = require_session(ctx).await? else {
        return Ok(());
    };
    let data = ctx.data();

    ctx.defer().await?;

    match data.api.statistics(&linked.session()).await {
        Ok(stats) => {
            let embed = create_statistics_embed(&ctx.author().name, &stats);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => {
            let message = data.describe_api_error(&linked.discord_id, &e).await;
            let embed = create_error_embed("Erro", &message);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
    }

    Ok(())
}
