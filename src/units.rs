use crate::{ConfigError, Origin};
use once_cell::sync::Lazy;
use regex::Regex;

/// Splits "   1.5   megabytes " into the number text and the unit text.
static NUMBER_AND_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(.*?)\s*([a-zA-Z]*)\s*$").unwrap()
});

fn split_number_and_unit(text: &str) -> (String, String) {
    match NUMBER_AND_UNIT.captures(text) {
        Some(captures) => (captures[1].to_string(), captures[2].to_string()),
        None => (text.trim().to_string(), String::new()),
    }
}

/// The parsed numeric part of a unit string: integers stay exact, anything
/// fractional goes through a double.
enum UnitNumber {
    Whole(i64),
    Fractional(f64),
}

fn parse_number(text: &str) -> Option<UnitNumber> {
    if text.is_empty() {
        return None;
    }
    if let Ok(whole) = text.parse::<i64>() {
        return Some(UnitNumber::Whole(whole));
    }
    text.parse::<f64>().ok().map(UnitNumber::Fractional)
}

fn apply_multiplier(
    number: UnitNumber,
    multiplier: i64,
    origin: &Origin,
    path: &str,
    what: &str,
) -> Result<i64, ConfigError> {
    match number {
        UnitNumber::Whole(value) => {
            value
                .checked_mul(multiplier)
                .ok_or_else(|| ConfigError::BadValue {
                    origin: origin.clone(),
                    path: path.to_string(),
                    message: format!("{} value is out of range: '{}'", what, value),
                })
        }
        UnitNumber::Fractional(value) => {
            // truncation toward zero after multiplying
            Ok((value * multiplier as f64) as i64)
        }
    }
}

/// Parse a duration string such as `"10s"`, `"250 ms"` or `"1.5 days"` into
/// nanoseconds. No unit means milliseconds. Fractional amounts truncate
/// toward zero after conversion.
pub fn parse_duration(text: &str, origin: &Origin, path: &str) -> Result<i64, ConfigError> {
    let (number_text, unit_text) = split_number_and_unit(text);

    // a long form without its plural "s" means the same thing
    let normalized = if unit_text.len() > 2 && !unit_text.ends_with('s') {
        format!("{}s", unit_text)
    } else {
        unit_text.clone()
    };

    let nanos_per_unit: i64 = match normalized.as_str() {
        "" | "ms" | "milliseconds" => 1_000_000,
        "ns" | "nanoseconds" => 1,
        "us" | "microseconds" => 1_000,
        "s" | "seconds" => 1_000_000_000,
        "m" | "minutes" => 60_000_000_000,
        "h" | "hours" => 3_600_000_000_000,
        "d" | "days" => 86_400_000_000_000,
        _ => {
            return Err(ConfigError::BadValue {
                origin: origin.clone(),
                path: path.to_string(),
                message: format!(
                    "Could not parse time unit '{}' (try ns, us, ms, s, m, h, d)",
                    unit_text
                ),
            });
        }
    };

    let number = parse_number(&number_text).ok_or_else(|| ConfigError::BadValue {
        origin: origin.clone(),
        path: path.to_string(),
        message: format!("Could not parse duration number '{}'", number_text),
    })?;
    apply_multiplier(number, nanos_per_unit, origin, path, "duration")
}

/// Exponents for the power-of-two and power-of-ten suffix families, indexed
/// by the first letter of the unit.
const POWER_LETTERS: [(char, u32); 8] = [
    ('k', 1),
    ('m', 2),
    ('g', 3),
    ('t', 4),
    ('p', 5),
    ('e', 6),
    ('z', 7),
    ('y', 8),
];

const BINARY_NAMES: [&str; 8] = ["kibi", "mebi", "gibi", "tebi", "pebi", "exbi", "zebi", "yobi"];
const DECIMAL_NAMES: [&str; 8] = [
    "kilo", "mega", "giga", "tera", "peta", "exa", "zetta", "yotta",
];

fn letter_exponent(letter: char) -> Option<u32> {
    let lowered = letter.to_ascii_lowercase();
    POWER_LETTERS
        .iter()
        .find(|(l, _)| *l == lowered)
        .map(|(_, e)| *e)
}

/// The byte multiplier a unit suffix denotes, or [None] for an unknown unit.
/// The widest suffixes (zebi, yobi) exceed an i64, so multipliers are i128
/// and range-checked after multiplication.
///
/// A lone letter or an `i`/`iB` suffix or a spelled-out binary prefix (kibi,
/// mebi, ...) denotes powers of 1024; a `B` suffix or a spelled-out decimal
/// prefix (kilo, mega, ...) denotes powers of 1000.
fn bytes_multiplier(unit: &str) -> Option<i128> {
    if unit.is_empty() || matches!(unit, "b" | "B" | "byte" | "bytes") {
        return Some(1);
    }

    let mut chars = unit.chars();
    let first = chars.next()?;
    let rest: String = chars.collect();
    if let Some(exponent) = letter_exponent(first) {
        match rest.as_str() {
            // 1024K, 1m, 1Gi, 1MiB
            "" | "i" | "iB" => return Some(1024_i128.pow(exponent)),
            // 1kB, 1MB
            "B" => return Some(1000_i128.pow(exponent)),
            _ => {}
        }
    }

    // spelled-out forms: kibibyte(s), kilobyte(s), and the bare prefixes
    let singular = unit.strip_suffix('s').unwrap_or(unit);
    let prefix = singular.strip_suffix("byte").unwrap_or(singular);
    if let Some(position) = BINARY_NAMES.iter().position(|n| *n == prefix) {
        return Some(1024_i128.pow(position as u32 + 1));
    }
    if let Some(position) = DECIMAL_NAMES.iter().position(|n| *n == prefix) {
        return Some(1000_i128.pow(position as u32 + 1));
    }
    None
}

/// Parse a size-in-bytes string such as `"128K"`, `"1MB"` or `"1.5 gibibytes"`
/// into a byte count. No unit means bytes.
pub fn parse_bytes(text: &str, origin: &Origin, path: &str) -> Result<i64, ConfigError> {
    let (number_text, unit_text) = split_number_and_unit(text);

    let multiplier = bytes_multiplier(&unit_text).ok_or_else(|| ConfigError::BadValue {
        origin: origin.clone(),
        path: path.to_string(),
        message: format!(
            "Could not parse size-in-bytes unit '{}' (try k, K, kB, KiB, kilobytes, kibibytes)",
            unit_text
        ),
    })?;

    let number = parse_number(&number_text).ok_or_else(|| ConfigError::BadValue {
        origin: origin.clone(),
        path: path.to_string(),
        message: format!("Could not parse size-in-bytes number '{}'", number_text),
    })?;

    let out_of_range = |shown: &str| ConfigError::BadValue {
        origin: origin.clone(),
        path: path.to_string(),
        message: format!(
            "size-in-bytes value is out of range for a 64-bit integer: '{}'",
            shown
        ),
    };
    match number {
        UnitNumber::Whole(value) => {
            let product = value as i128 * multiplier;
            i64::try_from(product).map_err(|_| out_of_range(&value.to_string()))
        }
        UnitNumber::Fractional(value) => {
            // truncation toward zero after multiplying
            let product = value * multiplier as f64;
            if product.is_finite() && product >= i64::MIN as f64 && product <= i64::MAX as f64 {
                Ok(product as i64)
            } else {
                Err(out_of_range(&value.to_string()))
            }
        }
    }
}
