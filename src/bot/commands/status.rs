use crate::bot::commands::{reply_ephemeral, require_session};
use crate::bot::{Context, Data, Error};
use crate::database::models::LinkedSession;
use crate::services::attendance::{self, DayView};
use crate::utils::format::{create_day_embed, create_error_embed, format_error_message};
use crate::utils::time::{current_date, parse_date_argument};
use crate::utils::validation::validate_date_not_future;
use chrono::NaiveDate;
use poise::serenity_prelude as serenity;

pub(crate) const PUNCH_BUTTON: &str = "punch";
pub(crate) const REFRESH_BUTTON: &str = "refresh_today";

/// Loads today's view, or a past day's through the monthly endpoint.
pub(crate) async fn load_day(
    data: &Data,
    linked: &LinkedSession,
    date: NaiveDate,
) -> Result<DayView, String> {
    let now = chrono::Utc::now();
    let session = linked.session();

    let result = if date == current_date(data.offset) {
        attendance::today_summary(&data.api, &session, date, data.offset, now).await
    } else {
        attendance::day_summary(&data.api, &session, date, data.offset, now).await
    };

    match result {
        Ok(view) => Ok(view),
        Err(e) => Err(data.describe_api_error(&linked.discord_id, &e).await),
    }
}

/// Buttons carry the owner's Discord id so only they can use them.
pub(crate) fn day_components(discord_id: &str) -> Vec<serenity::CreateActionRow> {
    vec![serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(format!("{}:{}", PUNCH_BUTTON, discord_id))
            .label("🕐 Registrar ponto")
            .style(serenity::ButtonStyle::Success),
        serenity::CreateButton::new(format!("{}:{}", REFRESH_BUTTON, discord_id))
            .label("🔄 Atualizar")
            .style(serenity::ButtonStyle::Secondary),
    ])]
}

/// Mostra os registros de hoje ou de outro dia
#[poise::command(slash_command)]
pub async fn today(
    ctx: Context<'_>,
    #[description = "Data (DD/MM/AAAA), padrão hoje"] date: Option<String>,
) -> Result<(), Error> {
    let Some(linked) = require_session(ctx).await? else {
        return Ok(());
    };
    let data = ctx.data();
    let today = current_date(data.offset);

    let date = match date.as_deref().map(parse_date_argument) {
        None => today,
        Some(Ok(date)) => date,
        Some(Err(e)) => return reply_ephemeral(ctx, format_error_message(&e.to_string())).await,
    };
    if let Err(e) = validate_date_not_future(date, today) {
        return reply_ephemeral(ctx, format_error_message(&e.to_string())).await;
    }

    ctx.defer().await?;

    match load_day(data, &linked, date).await {
        Ok(view) => {
            let embed = create_day_embed(&ctx.author().name, &view, data.offset);
            let mut builder = poise::CreateReply::default().embed(embed);
            if date == today {
                builder = builder.components(day_components(&linked.discord_id));
            }
            ctx.send(builder).await?;
        }
        Err(message) => {
            let embed = create_error_embed("Erro", &message);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
    }

    Ok(())
}
