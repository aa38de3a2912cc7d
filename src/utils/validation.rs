use anyhow::Result;
use chrono::NaiveDate;

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn is_valid_pin(pin: &str) -> bool {
    (4..=6).contains(&pin.len()) && pin.chars().all(|c| c.is_ascii_digit())
}

pub fn validate_pin(pin: &str) -> Result<()> {
    if !is_valid_pin(pin) {
        return Err(anyhow::anyhow!("O PIN deve ter entre 4 e 6 dígitos"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<()> {
    let valid = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.ends_with('.'))
        .unwrap_or(false);

    if !valid || email.chars().any(char::is_whitespace) {
        return Err(anyhow::anyhow!("Email inválido"));
    }
    Ok(())
}

pub fn validate_new_password(password: &str, confirmation: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(anyhow::anyhow!(
            "A senha deve ter pelo menos {} caracteres",
            MIN_PASSWORD_LENGTH
        ));
    }

    if password != confirmation {
        return Err(anyhow::anyhow!("As senhas não coincidem"));
    }

    Ok(())
}

pub fn validate_year_month(year: i32, month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(anyhow::anyhow!("Mês inválido: {}", month));
    }

    if !(2000..=2100).contains(&year) {
        return Err(anyhow::anyhow!("Ano inválido: {}", year));
    }

    Ok(())
}

pub fn validate_date_not_future(date: NaiveDate, today: NaiveDate) -> Result<()> {
    if date > today {
        return Err(anyhow::anyhow!("Não é possível consultar datas futuras"));
    }

    Ok(())
}
