//! System variables.
//!
//! This module implements the built-in generators invoked as `{{$name args}}`:
//! `$guid`, `$randomInt`, `$timestamp`, `$datetime` and `$localDatetime`.
//! Every call produces a fresh value.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, Local, SecondsFormat, TimeZone, Utc};
use rand::Rng;
use std::fmt::Write;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by system variables.
///
/// These never escape placeholder resolution: a failing generator leaves
/// its placeholder untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VarError {
    /// Not a known system variable
    #[error("Unknown system variable: ${0}")]
    UnknownVariable(String),
    /// Missing or malformed arguments
    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),
    /// Offset parsing failed
    #[error("Invalid offset: {0}")]
    InvalidOffset(String),
    /// Unusable datetime format
    #[error("Invalid datetime format: {0}")]
    InvalidFormat(String),
}

/// Resolves a system variable expression such as `$randomInt 1 10`.
///
/// The expression starts with the `$`-prefixed name, followed by
/// whitespace-separated arguments. Arguments may be quoted with `'` or `"`
/// to include spaces.
///
/// # Examples
///
/// ```
/// use httpfile::variables::system::resolve_system_expression;
///
/// let value = resolve_system_expression("$randomInt 5 5").unwrap();
/// assert_eq!(value, "5");
///
/// let timestamp = resolve_system_expression("$timestamp -1 d").unwrap();
/// assert!(timestamp.parse::<i64>().is_ok());
/// ```
pub fn resolve_system_expression(expression: &str) -> Result<String, VarError> {
    let parts = split_args(expression.trim());
    let Some((head, args)) = parts.split_first() else {
        return Err(VarError::InvalidSyntax("Empty system variable".to_string()));
    };

    let Some(name) = head.strip_prefix('$') else {
        return Err(VarError::InvalidSyntax(format!(
            "System variable must start with $: {}",
            head
        )));
    };

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    resolve_system_variable(name, &args)
}

/// Resolves a system variable by name (without `$`) and arguments.
pub fn resolve_system_variable(name: &str, args: &[&str]) -> Result<String, VarError> {
    match name {
        "guid" => Ok(Uuid::new_v4().to_string()),
        "randomInt" => resolve_random_int(args),
        "timestamp" => resolve_timestamp(args),
        "datetime" => resolve_datetime(Utc, args),
        "localDatetime" => resolve_datetime(Local, args),
        _ => Err(VarError::UnknownVariable(name.to_string())),
    }
}

/// Generates a random integer in the inclusive range `[min, max]`.
///
/// Bounds given in the wrong order are swapped.
fn resolve_random_int(args: &[&str]) -> Result<String, VarError> {
    let [min, max, ..] = args else {
        return Err(VarError::InvalidSyntax(
            "randomInt requires min and max arguments".to_string(),
        ));
    };

    let min: i64 = min
        .parse()
        .map_err(|_| VarError::InvalidSyntax(format!("Invalid min value: {}", min)))?;
    let max: i64 = max
        .parse()
        .map_err(|_| VarError::InvalidSyntax(format!("Invalid max value: {}", max)))?;

    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    Ok(rand::thread_rng().gen_range(low..=high).to_string())
}

/// Current Unix timestamp in seconds, with an optional `±N unit` offset.
fn resolve_timestamp(args: &[&str]) -> Result<String, VarError> {
    let now = Utc::now();
    let shifted = if args.is_empty() {
        now
    } else {
        shift(now, args)?
    };
    Ok(shifted.timestamp().to_string())
}

/// Formats the current time.
///
/// The first argument is the format: `iso8601`, `rfc1123`, a pattern with
/// .NET-style tokens (`yyyy-MM-dd HH:mm:ss`), or a chrono `%` pattern. An
/// optional `±N unit` offset follows.
fn resolve_datetime<Tz>(zone: Tz, args: &[&str]) -> Result<String, VarError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let Some((format, offset)) = args.split_first() else {
        return Err(VarError::InvalidSyntax(
            "datetime requires a format argument (rfc1123, iso8601 or a pattern)".to_string(),
        ));
    };

    let now = Utc::now().with_timezone(&zone);
    let datetime = if offset.is_empty() {
        now
    } else {
        shift(now, offset)?
    };

    format_datetime(&datetime, format)
}

fn format_datetime<Tz>(datetime: &DateTime<Tz>, format: &str) -> Result<String, VarError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match format {
        "iso8601" => Ok(datetime.to_rfc3339_opts(SecondsFormat::Millis, true)),
        "rfc1123" => Ok(datetime
            .with_timezone(&Utc)
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string()),
        pattern => {
            let strftime = if pattern.contains('%') {
                pattern.to_string()
            } else {
                dotnet_to_strftime(pattern)
            };

            let items: Vec<Item> = StrftimeItems::new(&strftime).collect();
            if items.iter().any(|item| matches!(item, Item::Error)) {
                return Err(VarError::InvalidFormat(pattern.to_string()));
            }

            let mut out = String::new();
            write!(out, "{}", datetime.format_with_items(items.iter()))
                .map_err(|_| VarError::InvalidFormat(pattern.to_string()))?;
            Ok(out)
        }
    }
}

/// Translates a .NET-style date pattern into a strftime pattern.
///
/// Text inside single quotes is copied literally.
fn dotnet_to_strftime(pattern: &str) -> String {
    const TOKENS: &[(&str, &str)] = &[
        ("yyyy", "%Y"),
        ("yy", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("M", "%-m"),
        ("dddd", "%A"),
        ("ddd", "%a"),
        ("dd", "%d"),
        ("d", "%-d"),
        ("HH", "%H"),
        ("H", "%-H"),
        ("hh", "%I"),
        ("h", "%-I"),
        ("mm", "%M"),
        ("m", "%-M"),
        ("ss", "%S"),
        ("s", "%-S"),
        ("fff", "%3f"),
        ("tt", "%p"),
        ("zzz", "%:z"),
    ];

    let mut out = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;

    'outer: while let Some(ch) = rest.chars().next() {
        if ch == '\'' {
            let literal = &rest[1..];
            let end = literal.find('\'').unwrap_or(literal.len());
            out.push_str(&literal[..end].replace('%', "%%"));
            rest = literal.get(end + 1..).unwrap_or("");
            continue;
        }

        for (token, replacement) in TOKENS {
            if let Some(after) = rest.strip_prefix(token) {
                out.push_str(replacement);
                rest = after;
                continue 'outer;
            }
        }

        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    out
}

/// Parses a `±N unit` offset.
///
/// Units: `ms`, `s`, `m`, `h`, `d`, `w`. The number may carry a sign and
/// may be written apart from it (`- 1 d`).
/// Applies a `±N unit` offset, failing when the result is not a
/// representable date.
fn shift<Tz: TimeZone>(datetime: DateTime<Tz>, args: &[&str]) -> Result<DateTime<Tz>, VarError> {
    let offset = parse_offset(args)?;
    datetime.checked_add_signed(offset).ok_or_else(|| {
        VarError::InvalidOffset(format!("Date out of range after offset: {}", args.join(" ")))
    })
}

fn parse_offset(args: &[&str]) -> Result<Duration, VarError> {
    let (number, unit) = match args {
        [sign @ ("+" | "-"), number, unit, ..] => (format!("{}{}", sign, number), *unit),
        [number, unit, ..] => (number.to_string(), *unit),
        _ => {
            return Err(VarError::InvalidOffset(
                "Offset requires number and unit (e.g., '-1 d' or '+2 h')".to_string(),
            ))
        }
    };

    let number: i64 = number
        .trim_start_matches('+')
        .parse()
        .map_err(|_| VarError::InvalidOffset(format!("Invalid number: {}", number)))?;

    let duration = match unit {
        "ms" => Duration::try_milliseconds(number),
        "s" => Duration::try_seconds(number),
        "m" => Duration::try_minutes(number),
        "h" => Duration::try_hours(number),
        "d" => Duration::try_days(number),
        "w" => Duration::try_weeks(number),
        _ => {
            return Err(VarError::InvalidOffset(format!(
                "Invalid unit: {}. Use 'ms', 's', 'm', 'h', 'd' or 'w'",
                unit
            )))
        }
    };

    duration.ok_or_else(|| VarError::InvalidOffset(format!("Offset out of range: {} {}", number, unit)))
}

/// Splits arguments on whitespace, keeping quoted segments together.
fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_arg = false;

    for ch in input.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_arg = true;
            }
            None if ch.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            None => {
                current.push(ch);
                in_arg = true;
            }
        }
    }

    if in_arg {
        args.push(current);
    }

    args
}
