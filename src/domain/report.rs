use crate::domain::models::DaySummary;
use chrono::FixedOffset;

/// Header expected by existing consumers of the monthly report.
pub const CSV_HEADER: &str = "Data,Horas Trabalhadas,Registros";

/// Monthly report, one row per day in ascending date order:
/// `DD/MM/YYYY,HH:MM,"entrada: HH:MM; saída: HH:MM; ..."`.
///
/// The worked column is the same per-day total the monthly totals are built
/// from, so the two never disagree.
pub fn monthly_csv(days: &[DaySummary], offset: FixedOffset) -> String {
    let mut sorted: Vec<&DaySummary> = days.iter().collect();
    sorted.sort_by_key(|day| day.date);

    let mut lines = Vec::with_capacity(sorted.len() + 1);
    lines.push(CSV_HEADER.to_string());
    lines.extend(sorted.into_iter().map(|day| csv_row(day, offset)));
    lines.join("\n")
}

pub fn csv_row(day: &DaySummary, offset: FixedOffset) -> String {
    let punches = day
        .records()
        .iter()
        .map(|record| {
            format!(
                "{}: {}",
                record.punch_type,
                record.timestamp.with_timezone(&offset).format("%H:%M")
            )
        })
        .collect::<Vec<_>>()
        .join("; ");

    format!(
        "{},{},\"{}\"",
        day.date.format("%d/%m/%Y"),
        day.worked(),
        punches.replace('"', "\"\"")
    )
}

pub fn report_file_name(year: i32, month: u32) -> String {
    format!("relatorio_{}_{}.csv", month, year)
}
