//! Literal rendering per logical type and dialect style.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::core::{
    BooleanLiteral, Behaviors, Capability, CapabilitySet, StringLiteralStyle, TemporalLiteral,
};
use crate::error::{DialectError, Result};
use crate::typemap::LogicalType;

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Render `value` as a SQL literal of type `logical`.
pub(crate) fn format_literal(
    behaviors: &Behaviors,
    flags: &CapabilitySet,
    value: &str,
    logical: LogicalType,
) -> Result<String> {
    match logical {
        LogicalType::String | LogicalType::Object => {
            Ok(quote_string(behaviors.string_literal, value))
        }
        LogicalType::Integer => {
            let v = value.trim();
            v.parse::<i32>()
                .map(|n| n.to_string())
                .map_err(|_| DialectError::invalid_literal(value, logical))
        }
        LogicalType::Long => {
            let v = value.trim();
            v.parse::<i64>()
                .map(|n| n.to_string())
                .map_err(|_| DialectError::invalid_literal(value, logical))
        }
        LogicalType::Numeric | LogicalType::Double => {
            let v = value.trim();
            if !is_decimal_number(v) {
                return Err(DialectError::invalid_literal(value, logical));
            }
            let fractional = v.contains('.') && !v.contains(['e', 'E']);
            if fractional && flags.get(Capability::RequiresExponentLiteral) {
                Ok(format!("{}E0", v))
            } else {
                Ok(v.to_string())
            }
        }
        LogicalType::Boolean => {
            let truth = match value.trim().to_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(DialectError::invalid_literal(value, logical)),
            };
            Ok(match (behaviors.boolean_literal, truth) {
                (BooleanLiteral::Keyword, true) => "TRUE".to_string(),
                (BooleanLiteral::Keyword, false) => "FALSE".to_string(),
                (BooleanLiteral::Numeric, true) => "1".to_string(),
                (BooleanLiteral::Numeric, false) => "0".to_string(),
            })
        }
        LogicalType::Date => {
            let v = value.trim();
            NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .map_err(|_| DialectError::invalid_literal(value, logical))?;
            Ok(temporal(behaviors.temporal_style(logical), "DATE", v))
        }
        LogicalType::Time => {
            let v = value.trim();
            if !TIME_FORMATS
                .iter()
                .any(|f| NaiveTime::parse_from_str(v, f).is_ok())
            {
                return Err(DialectError::invalid_literal(value, logical));
            }
            Ok(temporal(behaviors.temporal_style(logical), "TIME", v))
        }
        LogicalType::Timestamp => {
            let v = value.trim();
            if !TIMESTAMP_FORMATS
                .iter()
                .any(|f| NaiveDateTime::parse_from_str(v, f).is_ok())
            {
                return Err(DialectError::invalid_literal(value, logical));
            }
            Ok(temporal(
                behaviors.temporal_style(logical),
                "TIMESTAMP",
                &v.replacen('T', " ", 1),
            ))
        }
    }
}

fn quote_string(style: StringLiteralStyle, value: &str) -> String {
    let mut escaped = value.replace('\'', "''");
    if style.escape_backslash {
        escaped = escaped.replace('\\', "\\\\");
    }
    format!("{}'{}'", style.prefix, escaped)
}

fn temporal(style: TemporalLiteral, keyword: &str, value: &str) -> String {
    match style {
        TemporalLiteral::Typed => format!("{} '{}'", keyword, value),
        TemporalLiteral::Quoted => format!("'{}'", value),
    }
}

/// `[+-]digits[.digits][(e|E)[+-]digits]`, with at least one mantissa digit.
fn is_decimal_number(s: &str) -> bool {
    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    let digits_ok = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return false;
    }
    if !digits_ok(int_part) || !digits_ok(frac_part) {
        return false;
    }

    match exponent {
        None => true,
        Some(e) => {
            let e = e.strip_prefix(['+', '-']).unwrap_or(e);
            !e.is_empty() && digits_ok(e)
        }
    }
}

/// Integer and fraction digit counts of a validated numeric literal, with
/// any exponent applied: `1.5e3` is `(4, 0)` and `1e-5` is `(0, 5)`.
pub(crate) fn digit_counts(value: &str) -> (usize, usize) {
    let v = value.trim();
    let v = v.strip_prefix(['+', '-']).unwrap_or(v);
    let (mantissa, exponent) = match v.find(['e', 'E']) {
        Some(i) => (&v[..i], v[i + 1..].parse::<i64>().unwrap_or(0)),
        None => (v, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = (int_part.len() + frac_part.len()) as i64;
    let point = int_part.len() as i64 + exponent;
    (point.max(0) as usize, (digits - point).max(0) as usize)
}
