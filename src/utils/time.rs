use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Builds the reporting offset from whole hours east of UTC.
pub fn offset_from_hours(hours: i32) -> Result<FixedOffset> {
    if !(-23..=23).contains(&hours) {
        return Err(anyhow::anyhow!(
            "UTC offset must be between -23 and 23 hours, got {}",
            hours
        ));
    }

    FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| anyhow::anyhow!("Invalid UTC offset: {} hours", hours))
}

pub fn current_date(offset: FixedOffset) -> NaiveDate {
    local_date(Utc::now(), offset)
}

pub fn local_date(timestamp: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    timestamp.with_timezone(&offset).date_naive()
}

pub fn format_time(datetime: DateTime<Utc>, offset: FixedOffset) -> String {
    datetime.with_timezone(&offset).format("%H:%M").to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Janeiro",
        2 => "Fevereiro",
        3 => "Março",
        4 => "Abril",
        5 => "Maio",
        6 => "Junho",
        7 => "Julho",
        8 => "Agosto",
        9 => "Setembro",
        10 => "Outubro",
        11 => "Novembro",
        12 => "Dezembro",
        _ => "?",
    }
}

/// Accepts `DD/MM/YYYY` or `YYYY-MM-DD`.
pub fn parse_date_argument(date_str: &str) -> Result<NaiveDate> {
    let date_str = date_str.trim();

    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%d/%m/%Y") {
        return Ok(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Ok(date);
    }

    Err(anyhow::anyhow!("Data inválida. Use DD/MM/AAAA ou AAAA-MM-DD"))
}
