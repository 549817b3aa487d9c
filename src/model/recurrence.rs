// File: ./src/model/recurrence.rs
//
// Recurring-task rules, as configured in a markdown table:
//
// | 任务名称      | 类型    | 触发条件      | 模式    |
// |--------------|---------|--------------|---------|
// | Water plants | weekly  | 3            | skip    |
// | Pay rent     | monthly | 1            | skip    |
// | Tax review   | monthly | 1 (3,6,9,12) | replace |
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

const HEADER_NAME: &str = "任务名称";

static MONTHLY_TRIGGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:\s*\(([^)]+)\))?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Periodicity {
    Daily,
    Weekly,
    Monthly,
}

/// Parsed and kept on the rule. Nothing downstream consults it yet, so every
/// mode currently behaves like `Skip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MergeMode {
    Replace,
    Accumulate,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringRule {
    pub name: String,
    pub periodicity: Periodicity,
    pub trigger: String,
    pub merge_mode: MergeMode,
}

impl RecurringRule {
    /// Whether the rule is due on `date`.
    ///
    /// Weekly triggers are ISO weekdays (1 = Monday .. 7 = Sunday). Monthly triggers
    /// are `D` or `D (m1,m2,...)`.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        match self.periodicity {
            Periodicity::Daily => true,
            Periodicity::Weekly => {
                leading_int(&self.trigger) == Some(date.weekday().number_from_monday())
            }
            Periodicity::Monthly => {
                let Some(caps) = MONTHLY_TRIGGER.captures(self.trigger.trim()) else {
                    return false;
                };
                let day = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
                if day != Some(date.day()) {
                    return false;
                }
                match caps.get(2) {
                    Some(months) => months
                        .as_str()
                        .split(',')
                        .filter_map(leading_int)
                        .any(|m| m == date.month()),
                    None => true,
                }
            }
        }
    }
}

/// Parses the leading integer of a trigger, ignoring surrounding whitespace and
/// any trailing text ("3", " 3 ", "3 (Wed)").
fn leading_int(s: &str) -> Option<u32> {
    let digits: String = s
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Extracts every rule row from the markdown `content`. Header rows, separator rows
/// and rows whose periodicity or mode columns do not parse are skipped.
pub fn parse_rule_table(content: &str) -> Vec<RecurringRule> {
    let mut rules = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if !line.starts_with('|') {
            continue;
        }
        let cells: Vec<&str> = line
            .trim_matches('|')
            .split('|')
            .map(|c| c.trim())
            .collect();
        if cells.len() < 4 {
            continue;
        }

        let name = cells[0];
        if name.is_empty() || name == HEADER_NAME || name.contains("---") {
            continue;
        }
        let (Ok(periodicity), Ok(merge_mode)) =
            (Periodicity::from_str(cells[1]), MergeMode::from_str(cells[3]))
        else {
            continue;
        };

        rules.push(RecurringRule {
            name: name.to_string(),
            periodicity,
            trigger: cells[2].to_string(),
            merge_mode,
        });
    }

    rules
}
