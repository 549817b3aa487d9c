// Text-level matching of checklist lines inside daily notes.
//
// Every check of the form "does this note already contain the recurring task X"
// goes through `line_matches_task`, so the matching strategy can be replaced
// without touching the reconciler or the writer.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker written in front of every materialized recurring task.
pub const RECURRING_GLYPH: &str = "🔄";

static LEADING_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s-]*\[.\]\s*").unwrap());
static TAG_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\S+").unwrap());
static CHECKLIST_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-*+] \[(.)\]\s?(.*)$").unwrap());
static UNCHECKED_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*- \[ \]").unwrap());

/// Which checkbox state a recurring line must have to count as a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Checked,
    Any,
}

impl CheckState {
    fn marker_pattern(&self) -> &'static str {
        match self {
            CheckState::Unchecked => r"\[ \]",
            CheckState::Checked => r"\[x\]",
            CheckState::Any => r"\[.\]",
        }
    }
}

/// Builds the pattern for one recurring task name.
///
/// The name is escaped literally and must be followed by the end of the line, by
/// punctuation (`Pay rent.`), or by whitespace and a non-alphanumeric token
/// (`#tag`, `✅ date`, ...), so that "Water" never matches a "Water plants" line.
pub fn recurring_line_pattern(name: &str, state: CheckState) -> Regex {
    let pattern = format!(
        r"(?i)^[ \t]*- {} {}\s+{}(?:\s*$|[^\p{{L}}\p{{N}}\s]|\s+[^\p{{L}}\p{{N}}\s])",
        state.marker_pattern(),
        RECURRING_GLYPH,
        regex::escape(name.trim()),
    );
    // An escaped literal inside a fixed template always compiles.
    Regex::new(&pattern).unwrap_or_else(|_| Regex::new(r"[^\s\S]").unwrap())
}

/// True if `line` is a recurring-task checklist line for `name` in the given state.
pub fn line_matches_task(line: &str, name: &str, state: CheckState) -> bool {
    recurring_line_pattern(name, state).is_match(line)
}

/// True if any line of `content` matches `name` in the given state.
pub fn note_contains_task(content: &str, name: &str, state: CheckState) -> bool {
    let re = recurring_line_pattern(name, state);
    content.lines().any(|l| re.is_match(l))
}

/// Strips the checklist marker and `#tag` tokens, then truncates to `max_chars`
/// characters (the last three replaced by `...` when truncated).
pub fn clean_task_text(text: &str, max_chars: usize) -> String {
    let without_marker = LEADING_MARKER.replace(text, "");
    let cleaned = TAG_TOKEN.replace_all(&without_marker, "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        return cleaned.to_string();
    }
    let kept: String = cleaned.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Parsed checklist line: `(marker char, text after the marker)`.
pub fn parse_checklist_line(line: &str) -> Option<(char, &str)> {
    let caps = CHECKLIST_LINE.captures(line)?;
    let marker = caps.get(1)?.as_str().chars().next()?;
    let text = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    Some((marker, text))
}

/// True for `- [ ] ...` lines (optionally indented).
pub fn is_unchecked_task_line(line: &str) -> bool {
    UNCHECKED_LINE.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_names_do_not_cross_match() {
        let line = "- [ ] 🔄 Water plants";
        assert!(line_matches_task(line, "Water plants", CheckState::Unchecked));
        assert!(!line_matches_task(line, "Water", CheckState::Unchecked));
        assert!(!line_matches_task("- [ ] 🔄 Waters", "Water", CheckState::Any));
    }

    #[test]
    fn trailing_metadata_still_matches() {
        let line = "- [x] 🔄 Water plants ✅ 2026-10-14";
        assert!(line_matches_task(line, "water PLANTS", CheckState::Checked));
        assert!(line_matches_task("  - [ ] 🔄 Stretch #health", "Stretch", CheckState::Any));
    }

    #[test]
    fn punctuation_after_the_name_still_matches() {
        assert!(line_matches_task("- [x] 🔄 Pay rent.", "Pay rent", CheckState::Checked));
        assert!(line_matches_task("- [ ] 🔄 Pay rent, landlord", "Pay rent", CheckState::Any));
        assert!(!line_matches_task("- [ ] 🔄 Pay rental fee.", "Pay rent", CheckState::Any));
    }

    #[test]
    fn state_is_respected() {
        let line = "- [x] 🔄 Review (weekly) $1";
        assert!(line_matches_task(line, "Review (weekly) $1", CheckState::Checked));
        assert!(!line_matches_task(line, "Review (weekly) $1", CheckState::Unchecked));
        assert!(line_matches_task(line, "Review (weekly) $1", CheckState::Any));
    }

    #[test]
    fn cleaning_strips_markers_and_tags() {
        assert_eq!(clean_task_text("- [ ] Call Bob #meeting #work", 60), "Call Bob");
        assert_eq!(clean_task_text("Plain", 60), "Plain");
    }

    #[test]
    fn cleaning_truncates_long_text() {
        let long = "a".repeat(80);
        let cleaned = clean_task_text(&long, 60);
        assert_eq!(cleaned.chars().count(), 60);
        assert!(cleaned.ends_with("..."));
    }

    #[test]
    fn checklist_lines_are_parsed() {
        assert_eq!(parse_checklist_line("- [ ] buy milk"), Some((' ', "buy milk")));
        assert_eq!(parse_checklist_line("  * [x] done"), Some(('x', "done")));
        assert_eq!(parse_checklist_line("plain text"), None);
        assert!(is_unchecked_task_line("\t- [ ] todo"));
        assert!(!is_unchecked_task_line("- [x] todo"));
    }
}
