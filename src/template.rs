// File: src/template.rs
//! Daily-note template rendering.
//!
//! Variables: `{{date}}`, `{{date:FORMAT}}`, `{{day}}`, `{{day:zh}}`, `{{time}}`, `{{title}}`.
//! `FORMAT` uses moment-style tokens (`YYYY-MM-DD`, `dddd`, `HH:mm`, `[literal]`...).
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt::Write;

static DATE_FORMAT_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{date:([^}]+)\}\}").unwrap());

/// Longest tokens first so `MMMM` wins over `MM`.
const MOMENT_TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("DD", "%d"),
    ("D", "%-d"),
    ("dddd", "%A"),
    ("ddd", "%a"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("hh", "%I"),
    ("h", "%-I"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("A", "%p"),
];

pub fn weekday_en(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn weekday_zh(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "星期一",
        Weekday::Tue => "星期二",
        Weekday::Wed => "星期三",
        Weekday::Thu => "星期四",
        Weekday::Fri => "星期五",
        Weekday::Sat => "星期六",
        Weekday::Sun => "星期日",
    }
}

/// Translates a moment-style format string into a chrono `strftime` string.
pub fn moment_to_strftime(format: &str) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut rest = format;

    'outer: while let Some(c) = rest.chars().next() {
        if c == '['
            && let Some(end) = rest.find(']')
        {
            out.push_str(&rest[1..end].replace('%', "%%"));
            rest = &rest[end + 1..];
            continue;
        }
        for (token, strftime) in MOMENT_TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(strftime);
                rest = tail;
                continue 'outer;
            }
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

/// Formats `at` with a moment-style format. `None` if chrono rejects the result.
pub fn format_moment(at: NaiveDateTime, format: &str) -> Option<String> {
    let pattern = moment_to_strftime(format);
    let mut out = String::new();
    write!(out, "{}", at.format(&pattern)).ok()?;
    Some(out)
}

/// Fills in a template for the note of `date`. `now` supplies `{{time}}` and the
/// time-of-day part of `{{date:FORMAT}}`.
pub fn render_template(template: &str, date: NaiveDate, now: NaiveDateTime) -> String {
    let at = date.and_time(now.time());
    let iso = date.format("%Y-%m-%d").to_string();

    let rendered = DATE_FORMAT_VAR.replace_all(template, |caps: &Captures| {
        format_moment(at, &caps[1]).unwrap_or_else(|| caps[0].to_string())
    });

    rendered
        .replace("{{date}}", &iso)
        .replace("{{day}}", weekday_en(date.weekday()))
        .replace("{{day:zh}}", weekday_zh(date.weekday()))
        .replace("{{time}}", &now.format("%H:%M").to_string())
        .replace("{{title}}", &iso)
}

/// Used when no template is configured or the configured one cannot be read.
pub fn default_template(date: NaiveDate) -> String {
    let iso = date.format("%Y-%m-%d");
    format!(
        "---\ndate: {}\nday: {}\n---\n\n# {}\n\n",
        iso,
        weekday_en(date.weekday()),
        iso
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_moment_tokens() {
        assert_eq!(moment_to_strftime("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_strftime("dddd, MMMM D"), "%A, %B %-d");
        assert_eq!(moment_to_strftime("[Week of] YYYY"), "Week of %Y");
        assert_eq!(moment_to_strftime("100%"), "100%%");
    }

    #[test]
    fn test_render_all_variables() {
        let date = day(2026, 10, 15);
        let now = day(2026, 10, 15).and_hms_opt(9, 5, 0).unwrap();
        let out = render_template(
            "# {{title}}\n{{date}} {{day}} {{day:zh}} {{time}} {{date:YYYY/MM/DD}}",
            date,
            now,
        );
        assert_eq!(out, "# 2026-10-15\n2026-10-15 Thursday 星期四 09:05 2026/10/15");
    }

    #[test]
    fn test_day_is_not_confused_with_day_zh() {
        let date = day(2026, 10, 18);
        let out = render_template("{{day:zh}}|{{day}}", date, date.and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(out, "星期日|Sunday");
    }

    #[test]
    fn test_default_template() {
        assert_eq!(
            default_template(day(2026, 10, 14)),
            "---\ndate: 2026-10-14\nday: Wednesday\n---\n\n# 2026-10-14\n\n"
        );
    }
}
