// src/common/validation.rs

use rust_decimal::Decimal;
use std::str::FromStr;
use validator::{ValidationError, ValidationErrors};

// ---
// Validações customizadas usadas pelos payloads
// ---
pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("exclusive_min".into(), &0.0);
        err.message = Some("A quantidade deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

/// Erro de um único campo, no mesmo formato que o `validator` produz.
pub fn field_error(field: &'static str, code: &'static str, message: &str) -> ValidationErrors {
    let mut err = ValidationError::new(code);
    err.message = Some(message.to_string().into());
    let mut errors = ValidationErrors::new();
    errors.add(field, err);
    errors
}

// Os formulários HTML mandam tudo como texto. Campo vazio vira `None`.
pub fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, ValidationErrors> {
    Decimal::from_str(raw.trim())
        .map_err(|_| field_error(field, "number", &format!("O campo '{}' deve ser um número.", field)))
}

pub fn parse_optional_decimal(
    field: &'static str,
    raw: &str,
) -> Result<Option<Decimal>, ValidationErrors> {
    match non_empty(raw) {
        Some(value) => parse_decimal(field, &value).map(Some),
        None => Ok(None),
    }
}

pub fn parse_optional_integer(field: &'static str, raw: &str) -> Result<Option<i64>, ValidationErrors> {
    match non_empty(raw) {
        Some(value) => value.parse::<i64>().map(Some).map_err(|_| {
            field_error(field, "number", &format!("O campo '{}' deve ser um número inteiro.", field))
        }),
        None => Ok(None),
    }
}
