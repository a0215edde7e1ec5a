//! Text helpers registered for every scaffolding template: case transforms,
//! `split`, `currency` and `date`.

use chrono::{DateTime, FixedOffset};

use super::funcs::{arity, FuncMap, FuncResult};
use super::layout::{parse_date, to_strftime, to_strftime_utc};
use super::Value;
use crate::constants::DATE_LAYOUTS;

/// Builtins plus the scaffolding helpers.
pub fn render_functions() -> FuncMap {
    let mut funcs = FuncMap::new();
    funcs
        .insert("ToUpper", to_upper)
        .insert("ToLower", to_lower)
        .insert("ToTitle", to_title)
        .insert("split", split)
        .insert("currency", currency)
        .insert("date", date);
    funcs
}

fn string_arg(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("wrong type for value; expected string; got {}", value.type_name()))
}

fn to_upper(args: &[Value]) -> FuncResult {
    arity(args, 1)?;
    Ok(Value::Str(string_arg(&args[0])?.to_uppercase()))
}

fn to_lower(args: &[Value]) -> FuncResult {
    arity(args, 1)?;
    Ok(Value::Str(string_arg(&args[0])?.to_lowercase()))
}

fn to_title(args: &[Value]) -> FuncResult {
    arity(args, 1)?;
    Ok(Value::Str(title_case(string_arg(&args[0])?)))
}

/// Upper-cases the first letter of every whitespace-separated word and
/// lower-cases the rest. Punctuation and spacing are kept as they are.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut word_start = true;
    for c in s.chars() {
        if c.is_whitespace() {
            word_start = true;
            out.push(c);
        } else if word_start {
            word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// `split "a,b" ","`; an empty separator splits after each character.
fn split(args: &[Value]) -> FuncResult {
    arity(args, 2)?;
    let (s, sep) = (string_arg(&args[0])?, string_arg(&args[1])?);
    let parts: Vec<Value> = if sep.is_empty() {
        s.chars().map(|c| Value::Str(c.to_string())).collect()
    } else {
        s.split(sep).map(Value::from).collect()
    };
    Ok(Value::List(parts))
}

fn currency(args: &[Value]) -> FuncResult {
    arity(args, 1)?;
    Ok(Value::Str(format_currency(&args[0])))
}

/// Renders a whole number of dollars with thousands separators.
///
/// Strings are parsed as floats first (`"2500.00"` is accepted); fractional
/// parts are truncated. Unparseable strings and other values come back in
/// their string form.
pub fn format_currency(value: &Value) -> String {
    let units = match value {
        Value::Str(s) => match s.parse::<f64>() {
            Ok(f) if f.is_finite() => f.trunc() as i64,
            _ => return s.clone(),
        },
        Value::Float(f) if f.is_finite() => f.trunc() as i64,
        Value::Int(i) => *i,
        other => return other.to_string(),
    };
    format!("${}", group_thousands(units))
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

fn date(args: &[Value]) -> FuncResult {
    arity(args, 2)?;
    let layout = string_arg(&args[0])?;
    Ok(Value::Str(format_date(layout, &args[1])))
}

/// Formats `value` with the reference `layout`.
///
/// Strings are parsed under the accepted input layouts and RFC 3339; a string
/// that matches none of them is returned unchanged. Values that are neither
/// strings nor date-times come back in their string form. Zone elements
/// print `UTC`/`Z` for values at UTC and the numeric offset otherwise.
pub fn format_date(layout: &str, value: &Value) -> String {
    let moment = match value {
        Value::Time(t) => *t,
        Value::Str(s) => match parse_moment(s) {
            Some(t) => t,
            None => return s.clone(),
        },
        other => return other.to_string(),
    };
    let format = if moment.offset().local_minus_utc() == 0 {
        to_strftime_utc(layout)
    } else {
        to_strftime(layout)
    };
    moment.format(&format).to_string()
}

fn parse_moment(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Some(date) = parse_date(s, &DATE_LAYOUTS) {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| DateTime::<FixedOffset>::from(midnight.and_utc()));
    }
    DateTime::parse_from_rfc3339(s).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_variants() {
        assert_eq!(format_currency(&Value::from("2500.00")), "$2,500");
        assert_eq!(format_currency(&Value::Int(1234567)), "$1,234,567");
        assert_eq!(format_currency(&Value::Float(999.99)), "$999");
        assert_eq!(format_currency(&Value::Int(-1000)), "$-1,000");
        assert_eq!(format_currency(&Value::from("abc")), "abc");
        assert_eq!(format_currency(&Value::Bool(true)), "true");
    }

    #[test]
    fn test_date_variants() {
        assert_eq!(format_date("Jan 2, 2006", &Value::from("2024-01-31")), "Jan 31, 2024");
        assert_eq!(format_date("2006-01-02", &Value::from("31/01/2024")), "2024-01-31");
        assert_eq!(format_date("02.01.2006", &Value::from("2024-03-05T10:00:00Z")), "05.03.2024");
        assert_eq!(format_date("2006", &Value::from("someday")), "someday");
        assert_eq!(format_date("2006", &Value::Int(7)), "7");
        assert_eq!(format_date("2006", &Value::from("2024-1-5")), "2024-1-5");
        assert_eq!(format_date("2006", &Value::from("01/31/24")), "01/31/24");
    }

    #[test]
    fn test_date_zones() {
        assert_eq!(format_date("15:04 MST", &Value::from("2024-03-05T10:00:00Z")), "10:00 UTC");
        assert_eq!(format_date("Z07:00", &Value::from("2024-03-05T10:00:00Z")), "Z");
        assert_eq!(format_date("Z07:00", &Value::from("2024-03-05T10:00:00+02:00")), "+02:00");
    }

    #[test]
    fn test_split_and_case() {
        assert_eq!(
            split(&[Value::from("a,b"), Value::from(",")]),
            Ok(Value::from(vec![Value::from("a"), Value::from("b")]))
        );
        assert_eq!(to_upper(&[Value::from("bob")]), Ok(Value::from("BOB")));
        assert_eq!(to_title(&[Value::from("hello world")]), Ok(Value::from("Hello World")));
        assert_eq!(title_case("my-project"), "My-project");
        assert_eq!(title_case("o'brien's app"), "O'brien's App");
        assert_eq!(title_case("hello_world  hELLO"), "Hello_world  Hello");
        assert!(to_lower(&[Value::Int(1)]).is_err());
    }
}
