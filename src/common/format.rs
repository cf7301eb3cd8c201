// src/common/format.rs

use rust_decimal::{Decimal, RoundingStrategy};

/// Formata um valor em Rupiah: `Rp 1.500.000` (sem casas decimais).
pub fn format_rupiah(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

/// Quantidades aparecem sem zeros à direita: `12.50` -> `12.5`.
pub fn format_quantity(value: Decimal) -> String {
    value.normalize().to_string()
}
