use crate::api::UserProfile;
use crate::api::models::Statistics;
use crate::domain::models::PunchType;
use crate::services::attendance::{DayView, MonthlyReport, PunchOutcome};
use crate::utils::time::{format_date, format_time, month_name};
use chrono::FixedOffset;
use poise::serenity_prelude as serenity;

fn punch_icon(punch_type: PunchType) -> &'static str {
    match punch_type {
        PunchType::Entrance => "🟢",
        PunchType::Exit => "🔴",
    }
}

fn punch_label(punch_type: PunchType) -> &'static str {
    match punch_type {
        PunchType::Entrance => "Entrada",
        PunchType::Exit => "Saída",
    }
}

pub fn format_day_view(view: &DayView, offset: FixedOffset) -> String {
    if view.summary.is_empty() {
        return "Nenhum registro de ponto neste dia".to_string();
    }

    let mut status = String::new();

    for record in view.summary.records() {
        status.push_str(&format!(
            "{} **{}**: {}{}\n",
            punch_icon(record.punch_type),
            punch_label(record.punch_type),
            format_time(record.timestamp, offset),
            if record.timestamp_recovered { " (horário estimado)" } else { "" }
        ));
    }

    status.push('\n');
    for interval in &view.detail.intervals {
        status.push_str(&format!(
            "⏱️ {} → {}: {}\n",
            format_time(interval.entrance, offset),
            format_time(interval.exit, offset),
            interval.worked
        ));
    }

    let unmatched = view
        .detail
        .orphans
        .iter()
        .filter(|orphan| Some(orphan.timestamp) != view.detail.open_since)
        .count();
    if unmatched > 0 {
        status.push_str(&format!("⚠️ {} registro(s) sem par\n", unmatched));
    }

    if let Some(since) = view.detail.open_since {
        status.push_str(&format!("🕐 **Trabalhando desde** {}\n", format_time(since, offset)));
    }

    if view.invalid > 0 {
        status.push_str(&format!("⚠️ {} registro(s) inválido(s) ignorado(s)\n", view.invalid));
    }

    status.push_str(&format!("\n📊 **Total trabalhado**: {}", view.worked));
    status.push_str(&format!("\n➡️ **Próximo registro**: {}", punch_label(view.next)));

    status
}

pub fn format_monthly_report(report: &MonthlyReport) -> String {
    if report.is_empty() {
        return "Nenhum registro de ponto neste mês".to_string();
    }

    let mut summary = String::new();
    for day in &report.totals.days {
        summary.push_str(&format!(
            "📅 **{}** ({}): {}\n",
            format_date(day.date),
            weekday_abbreviation(day.date),
            day.worked
        ));
    }

    if report.invalid > 0 {
        summary.push_str(&format!(
            "\n⚠️ {} registro(s) inválido(s) ignorado(s)",
            report.invalid
        ));
    }

    summary.push_str(&format!(
        "\n🎯 **Total do mês**: {} em {} dia(s)",
        report.totals.total,
        report.totals.days.len()
    ));

    summary
}

fn weekday_abbreviation(date: chrono::NaiveDate) -> &'static str {
    use chrono::{Datelike, Weekday};

    match date.weekday() {
        Weekday::Mon => "seg",
        Weekday::Tue => "ter",
        Weekday::Wed => "qua",
        Weekday::Thu => "qui",
        Weekday::Fri => "sex",
        Weekday::Sat => "sáb",
        Weekday::Sun => "dom",
    }
}

pub fn format_punch_outcome(outcome: &PunchOutcome, offset: FixedOffset) -> String {
    match &outcome.committed {
        Some(record) => {
            let mut message = format!(
                "{} registrada às {}",
                punch_label(record.punch_type),
                format_time(record.timestamp, offset)
            );
            if record.punch_type != outcome.requested {
                message.push_str(&format!(
                    "\n⚠️ O servidor registrou {} em vez de {}",
                    punch_label(record.punch_type),
                    punch_label(outcome.requested)
                ));
            }
            message
        }
        None => format!(
            "{}. Não foi possível ler o registro retornado pelo servidor.",
            outcome
                .message
                .as_deref()
                .unwrap_or("Ponto enviado")
        ),
    }
}

pub fn format_statistics(stats: &Statistics) -> String {
    format!(
        "🗓️ **Mês**: {}\n⏱️ **Horas trabalhadas**: {:.1}h\n📅 **Dias trabalhados**: {}\n📈 **Média diária**: {:.1}h\n⏰ **Atrasos**: {}",
        stats.current_month,
        stats.total_hours,
        stats.days_worked,
        stats.average_hours_per_day,
        stats.late_days
    )
}

pub fn format_error_message(error: &str) -> String {
    format!("❌ **Erro**: {}", error)
}

pub fn format_success_message(message: &str) -> String {
    format!("✅ {}", message)
}

// Embed utility functions
pub fn create_error_embed(title: &str, description: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(0xff0000) // Red
        .timestamp(chrono::Utc::now())
}

pub fn create_day_embed(username: &str, view: &DayView, offset: FixedOffset) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("📊 Registros do dia")
        .description(format_day_view(view, offset))
        .color(if view.is_working() { 0x00ff00 } else { 0x3498db })
        .author(serenity::CreateEmbedAuthor::new(format!("Ponto de {}", username)))
        .footer(serenity::CreateEmbedFooter::new(format_date(view.summary.date)))
        .timestamp(chrono::Utc::now())
}

pub fn create_monthly_embed(username: &str, report: &MonthlyReport) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(format!("📅 Relatório de {} de {}", month_name(report.month), report.year))
        .description(format_monthly_report(report))
        .color(0x9b59b6) // Purple
        .author(serenity::CreateEmbedAuthor::new(format!("Relatório de {}", username)))
        .timestamp(chrono::Utc::now())
}

pub fn create_statistics_embed(username: &str, stats: &Statistics) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("📈 Estatísticas")
        .description(format_statistics(stats))
        .color(0x9b59b6) // Purple
        .author(serenity::CreateEmbedAuthor::new(username))
        .timestamp(chrono::Utc::now())
}

pub fn create_profile_embed(profile: &UserProfile, credential_enrolled: bool) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("👤 Perfil")
        .field("Nome", &profile.name, true)
        .field("Email", &profile.email, true)
        .field(
            "Biometria",
            if credential_enrolled { "Cadastrada" } else { "Não cadastrada" },
            false,
        )
        .color(0x3498db) // Blue
        .timestamp(chrono::Utc::now())
}

#[cfg(test)]
mod format_tests {
    use super::*;
    use crate::api::{ApiError, AttendanceBackend, PunchReceipt, PunchRequest, RawDayGroup, Session};
    use crate::domain::accumulator::{self, MonthlyTotals};
    use crate::domain::models::{AttendanceRecord, DaySummary, RawRecord};
    use crate::services::attendance;
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use rstest::{fixture, rstest};

    struct TodayOnly(Vec<RawRecord>);

    #[async_trait]
    impl AttendanceBackend for TodayOnly {
        async fn fetch_today(&self, _session: &Session) -> Result<Vec<RawRecord>, ApiError> {
            Ok(self.0.clone())
        }

        async fn fetch_month(
            &self,
            _session: &Session,
            _year: i32,
            _month: u32,
        ) -> Result<Vec<RawDayGroup>, ApiError> {
            Ok(vec![])
        }

        async fn submit_punch(
            &self,
            _session: &Session,
            _request: &PunchRequest,
        ) -> Result<PunchReceipt, ApiError> {
            Ok(PunchReceipt::default())
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, hour, minute, 0).unwrap()
    }

    fn raw(punch_type: PunchType, timestamp: DateTime<Utc>) -> RawRecord {
        RawRecord::from(&AttendanceRecord::new(timestamp, punch_type))
    }

    #[fixture]
    fn offset() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    async fn view(records: Vec<RawRecord>) -> DayView {
        let session = Session {
            token: "t".into(),
            user: UserProfile {
                id: "u".into(),
                name: "Ana".into(),
                email: "ana@example.com".into(),
            },
        };
        let today = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        attendance::today_summary(&TodayOnly(records), &session, today, offset, at(21, 0))
            .await
            .unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_format_a_working_day(offset: FixedOffset) {
        let view = view(vec![
            raw(PunchType::Entrance, at(12, 0)),
            raw(PunchType::Exit, at(15, 0)),
            raw(PunchType::Entrance, at(16, 0)),
        ])
        .await;

        let text = format_day_view(&view, offset);

        assert!(text.contains("🟢 **Entrada**: 09:00"));
        assert!(text.contains("🔴 **Saída**: 12:00"));
        assert!(text.contains("⏱️ 09:00 → 12:00: 03:00"));
        assert!(text.contains("**Trabalhando desde** 13:00"));
        assert!(text.contains("**Total trabalhado**: 03:00"));
        assert!(text.contains("**Próximo registro**: Saída"));
        assert!(!text.contains("sem par"));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_flag_unmatched_exits(offset: FixedOffset) {
        let view = view(vec![raw(PunchType::Exit, at(12, 0))]).await;

        let text = format_day_view(&view, offset);

        assert!(text.contains("1 registro(s) sem par"));
        assert!(text.contains("**Total trabalhado**: 00:00"));
        assert!(text.contains("**Próximo registro**: Entrada"));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_format_an_empty_day(offset: FixedOffset) {
        let view = view(vec![]).await;

        assert_eq!(format_day_view(&view, offset), "Nenhum registro de ponto neste dia");
    }

    #[rstest]
    fn it_should_format_the_monthly_report() {
        let day = DaySummary::new(
            NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            vec![
                AttendanceRecord::new(at(12, 0), PunchType::Entrance),
                AttendanceRecord::new(at(20, 30), PunchType::Exit),
            ],
        );
        let days = vec![day];
        let report = MonthlyReport {
            year: 2024,
            month: 5,
            totals: accumulator::accumulate_month(&days),
            days,
            invalid: 0,
        };

        let text = format_monthly_report(&report);

        assert!(text.contains("📅 **06/05/2024** (seg): 08:30"));
        assert!(text.contains("**Total do mês**: 08:30 em 1 dia(s)"));
    }

    #[rstest]
    fn it_should_format_an_empty_month() {
        let report = MonthlyReport {
            year: 2024,
            month: 5,
            days: vec![],
            totals: MonthlyTotals::default(),
            invalid: 0,
        };

        assert_eq!(format_monthly_report(&report), "Nenhum registro de ponto neste mês");
    }

    #[rstest]
    fn it_should_warn_when_the_backend_stored_another_type(offset: FixedOffset) {
        let outcome = PunchOutcome {
            requested: PunchType::Entrance,
            committed: Some(AttendanceRecord::new(at(12, 0), PunchType::Exit)),
            message: None,
        };

        let text = format_punch_outcome(&outcome, offset);

        assert!(text.starts_with("Saída registrada às 09:00"));
        assert!(text.contains("registrou Saída em vez de Entrada"));
    }

    #[rstest]
    fn it_should_fall_back_to_the_backend_message(offset: FixedOffset) {
        let outcome = PunchOutcome {
            requested: PunchType::Entrance,
            committed: None,
            message: Some("Ponto registrado com sucesso".into()),
        };

        assert!(format_punch_outcome(&outcome, offset).starts_with("Ponto registrado com sucesso."));
    }

    #[rstest]
    fn it_should_format_statistics() {
        let stats = Statistics {
            total_hours: 42.0,
            days_worked: 5,
            late_days: 1,
            average_hours_per_day: 8.45,
            current_month: "maio 2024".into(),
        };

        let text = format_statistics(&stats);

        assert!(text.contains("**Horas trabalhadas**: 42.0h"));
        assert!(text.contains("**Dias trabalhados**: 5"));
        assert!(text.contains("**Atrasos**: 1"));
    }

    #[rstest]
    fn it_should_mark_message_kinds() {
        assert_eq!(format_error_message("falhou"), "❌ **Erro**: falhou");
        assert_eq!(format_success_message("ok"), "✅ ok");
    }
}
