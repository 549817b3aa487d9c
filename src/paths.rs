// File: src/paths.rs
//! Daily-note naming: `{root}/{YYYY}/{MM.Month}/{YYYY-MM-DD}.md`.
use chrono::{Datelike, NaiveDate};

/// Month folder names, locale independent. Index 0 is unused.
const MONTH_FOLDERS: [&str; 13] = [
    "",
    "01.January",
    "02.February",
    "03.March",
    "04.April",
    "05.May",
    "06.June",
    "07.July",
    "08.August",
    "09.September",
    "10.October",
    "11.November",
    "12.December",
];

pub struct DateNamingScheme;

impl DateNamingScheme {
    /// Root folder with surrounding whitespace and slashes removed, so it names the
    /// same folder the vault lists (`/Daily/` and `Daily` are one root).
    pub fn normalize_root(root: &str) -> &str {
        root.trim().trim_matches('/')
    }

    /// An empty root means the daily-note features are disabled.
    pub fn is_configured(root: &str) -> bool {
        !Self::normalize_root(root).is_empty()
    }

    /// Vault-relative path of the daily note for `date`.
    pub fn path_for(date: NaiveDate, root: &str) -> String {
        format!(
            "{}/{}/{}/{}.md",
            Self::normalize_root(root),
            date.format("%Y"),
            MONTH_FOLDERS[date.month() as usize],
            date.format("%Y-%m-%d")
        )
    }

    /// Parses the strict `YYYY-MM-DD` stem of a note path.
    pub fn date_from_note_path(path: &str) -> Option<NaiveDate> {
        let file_name = path.rsplit('/').next()?;
        let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
        parse_strict_iso(stem)
    }

    /// True if `path` lives below the configured root folder.
    pub fn is_under_root(path: &str, root: &str) -> bool {
        if !Self::is_configured(root) {
            return false;
        }
        let root = Self::normalize_root(root);
        path.strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// `YYYY-MM-DD` with exactly that shape (no single-digit month/day).
pub fn parse_strict_iso(s: &str) -> Option<NaiveDate> {
    parse_strict(s, '-')
}

/// Accepts `YYYY-MM-DD` or `YYYY/MM/DD`.
pub fn parse_strict_date(s: &str) -> Option<NaiveDate> {
    parse_strict(s, '-').or_else(|| parse_strict(s, '/'))
}

fn parse_strict(s: &str, sep: char) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != sep as u8 || bytes[7] != sep as u8 {
        return None;
    }
    let fmt = if sep == '/' { "%Y/%m/%d" } else { "%Y-%m-%d" };
    NaiveDate::parse_from_str(s, fmt).ok()
}
