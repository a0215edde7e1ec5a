//! Reference-date layouts.
//!
//! Layouts describe a format by writing the reference moment
//! `Mon Jan 2 15:04:05 MST 2006` the way the output should look, e.g.
//! `2006-01-02` or `Jan 2, 2006`. They are translated into `chrono` format
//! strings for both formatting and parsing.

use chrono::NaiveDate;

/// Layout elements, longest first within each leading character.
const ELEMENTS: &[(&str, &str)] = &[
    ("January", "%B"),
    ("Jan", "%b"),
    ("Monday", "%A"),
    ("Mon", "%a"),
    ("MST", "%Z"),
    ("2006", "%Y"),
    ("002", "%j"),
    ("01", "%m"),
    ("02", "%d"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("06", "%y"),
    ("15", "%H"),
    ("_2", "%e"),
    ("1", "%-m"),
    ("2", "%-d"),
    ("3", "%-I"),
    ("4", "%-M"),
    ("5", "%-S"),
    ("PM", "%p"),
    ("pm", "%P"),
    ("-07:00:00", "%::z"),
    ("-07:00", "%:z"),
    ("-0700", "%z"),
    ("-07", "%:::z"),
    ("Z07:00", "%:z"),
    ("Z0700", "%z"),
];

/// Translates a reference layout into a `chrono` format string.
pub fn to_strftime(layout: &str) -> String {
    translate(layout, false)
}

/// Like [`to_strftime`], for values at UTC: `MST` renders as `UTC` and the
/// `Z07:00` family as `Z`.
pub fn to_strftime_utc(layout: &str) -> String {
    translate(layout, true)
}

fn translate(layout: &str, utc: bool) -> String {
    let mut out = String::with_capacity(layout.len() * 2);
    let mut rest = layout;
    while let Some(c) = rest.chars().next() {
        if let Some((len, spec)) = fractional_seconds(rest) {
            out.push_str(spec);
            rest = &rest[len..];
            continue;
        }
        if let Some(&(element, spec)) = ELEMENTS.iter().find(|(element, _)| rest.starts_with(element)) {
            out.push_str(match element {
                "MST" if utc => "UTC",
                "Z07:00" | "Z0700" if utc => "Z",
                _ => spec,
            });
            rest = &rest[element.len()..];
            continue;
        }
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// `.000`, `.000000`, `.999999999` and friends.
fn fractional_seconds(rest: &str) -> Option<(usize, &'static str)> {
    let mut chars = rest.chars();
    if !matches!(chars.next(), Some('.' | ',')) {
        return None;
    }
    let digit = chars.next().filter(|d| *d == '0' || *d == '9')?;
    let run = 1 + rest[2..].chars().take_while(|c| *c == digit).count();
    if rest[1 + run..].starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let spec = match (digit, run) {
        ('0', 3) => "%.3f",
        ('0', 6) => "%.6f",
        ('0', 9) => "%.9f",
        _ => "%.f",
    };
    Some((1 + run, spec))
}

/// Parses `value` under the first of `layouts` that accepts it.
///
/// For numeric layouts such as `2006-01-02` the value must have the exact
/// shape of the layout: a digit wherever the layout has one, the same
/// separators, nothing more. `2024-1-5` or `01/31/24` do not match.
pub fn parse_date(value: &str, layouts: &[&str]) -> Option<NaiveDate> {
    layouts
        .iter()
        .filter(|layout| matches_shape(value, layout))
        .find_map(|layout| NaiveDate::parse_from_str(value, &to_strftime(layout)).ok())
}

/// Layouts made of letters (`Jan`, `Monday`) have no fixed width and are
/// left to `chrono`.
fn matches_shape(value: &str, layout: &str) -> bool {
    if layout.chars().any(|c| c.is_alphabetic()) {
        return true;
    }
    value.len() == layout.len()
        && value.chars().zip(layout.chars()).all(|(v, l)| {
            if l.is_ascii_digit() {
                v.is_ascii_digit()
            } else {
                v == l
            }
        })
}
