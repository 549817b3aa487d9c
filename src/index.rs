// File: src/index.rs
/*! Query capability over the vault's markdown.

`TaskIndex` is what the task sources query: open checklist items below a folder,
and pages (one record per markdown file) selected by a predicate over their tags
and frontmatter. Hosts that already maintain such an index implement the trait
directly; `MarkdownIndex` is the self-contained implementation that scans a
`VaultStore` on every query.
*/

use crate::model::matcher;
use crate::paths::{DateNamingScheme, parse_strict_iso};
use crate::vault::{VaultStore, normalize_folder, parent_folder};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

static INLINE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(#[\p{L}\p{N}_/-]*[\p{L}_/-][\p{L}\p{N}_/-]*)").unwrap());

/// One checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedTask {
    pub path: String,
    /// 0-based line number in `path`.
    pub line: usize,
    /// Text after the checkbox.
    pub text: String,
    pub completed: bool,
    /// Inline tags, `#` included.
    pub tags: Vec<String>,
}

/// A frontmatter value, loosely typed the way note metadata is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// A value the index recognised as a date or timestamp.
    Date(NaiveDateTime),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Equal to `needle`, or a list containing it.
    pub fn equals_or_contains(&self, needle: &str) -> bool {
        match self {
            FieldValue::Text(s) => s == needle,
            FieldValue::List(items) => items.iter().any(|v| v.as_text() == Some(needle)),
            _ => false,
        }
    }

    fn from_yaml(value: &serde_yaml::Value) -> Self {
        use serde_yaml::Value;
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Null),
            Value::String(s) => match parse_date_like(s) {
                Some(dt) => FieldValue::Date(dt),
                None => FieldValue::Text(s.clone()),
            },
            Value::Sequence(items) => FieldValue::List(items.iter().map(Self::from_yaml).collect()),
            Value::Tagged(tagged) => Self::from_yaml(&tagged.value),
            Value::Mapping(_) => FieldValue::Null,
        }
    }
}

/// Recognises `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM` and `YYYY-MM-DDTHH:MM:SS`.
fn parse_date_like(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Some(d) = parse_strict_iso(s) {
        return d.and_hms_opt(0, 0, 0);
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// One markdown file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedPage {
    pub path: String,
    /// File name without extension.
    pub name: String,
    pub folder: String,
    /// Frontmatter and inline tags, `#` included.
    pub tags: Vec<String>,
    pub frontmatter: BTreeMap<String, FieldValue>,
    /// Date implied by the file name, or by a `date` frontmatter field.
    pub day: Option<NaiveDate>,
}

impl IndexedPage {
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.frontmatter.get(key)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

pub type PagePredicate<'a> = &'a (dyn Fn(&IndexedPage) -> bool + Send + Sync);

#[async_trait]
pub trait TaskIndex: Send + Sync {
    /// Not-completed checklist items in every note below `folder`.
    async fn open_tasks(&self, folder: &str) -> Result<Vec<IndexedTask>>;

    /// Pages below `folder` (the whole vault for `None`) accepted by `filter`.
    async fn pages(&self, folder: Option<&str>, filter: PagePredicate<'_>) -> Result<Vec<IndexedPage>>;
}

/// Scans markdown files straight out of a `VaultStore`.
pub struct MarkdownIndex {
    vault: Arc<dyn VaultStore>,
}

impl MarkdownIndex {
    pub fn new(vault: Arc<dyn VaultStore>) -> Self {
        Self { vault }
    }

    async fn markdown_files(&self, folder: &str) -> Result<Vec<String>> {
        let files = self.vault.list_folder(normalize_folder(folder)).await?;
        Ok(files.into_iter().filter(|p| p.ends_with(".md")).collect())
    }
}

#[async_trait]
impl TaskIndex for MarkdownIndex {
    async fn open_tasks(&self, folder: &str) -> Result<Vec<IndexedTask>> {
        let mut tasks = Vec::new();
        for path in self.markdown_files(folder).await? {
            let content = self.vault.read(&path).await?;
            tasks.extend(
                extract_tasks(&path, &content)
                    .into_iter()
                    .filter(|t| !t.completed),
            );
        }
        Ok(tasks)
    }

    async fn pages(&self, folder: Option<&str>, filter: PagePredicate<'_>) -> Result<Vec<IndexedPage>> {
        let mut pages = Vec::new();
        for path in self.markdown_files(folder.unwrap_or("")).await? {
            let content = self.vault.read(&path).await?;
            let page = build_page(&path, &content);
            if filter(&page) {
                pages.push(page);
            }
        }
        Ok(pages)
    }
}

/// All checklist items of one note, completed ones included.
pub fn extract_tasks(path: &str, content: &str) -> Vec<IndexedTask> {
    let (_, body_start) = split_frontmatter(content);
    content
        .lines()
        .enumerate()
        .skip(body_start)
        .filter_map(|(line, raw)| {
            let (marker, text) = matcher::parse_checklist_line(raw)?;
            Some(IndexedTask {
                path: path.to_string(),
                line,
                text: text.to_string(),
                completed: marker != ' ',
                tags: inline_tags(text),
            })
        })
        .collect()
}

pub fn build_page(path: &str, content: &str) -> IndexedPage {
    let (frontmatter, body_start) = split_frontmatter(content);
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let name = file_name.strip_suffix(".md").unwrap_or(file_name).to_string();

    let mut tags = frontmatter_tags(&frontmatter);
    for line in content.lines().skip(body_start) {
        for tag in inline_tags(line) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }

    let day = DateNamingScheme::date_from_note_path(path).or_else(|| match frontmatter.get("date") {
        Some(FieldValue::Date(dt)) => Some(dt.date()),
        _ => None,
    });

    IndexedPage {
        path: path.to_string(),
        name,
        folder: parent_folder(path).to_string(),
        tags,
        frontmatter,
        day,
    }
}

/// Returns the parsed frontmatter and the index of the first body line.
fn split_frontmatter(content: &str) -> (BTreeMap<String, FieldValue>, usize) {
    let mut lines = content.lines();
    if lines.next().map(str::trim_end) != Some("---") {
        return (BTreeMap::new(), 0);
    }
    let Some(end) = lines.position(|l| l.trim_end() == "---") else {
        return (BTreeMap::new(), 0);
    };
    let yaml: Vec<&str> = content.lines().skip(1).take(end).collect();
    let body_start = end + 2;

    let map = match serde_yaml::from_str::<serde_yaml::Value>(&yaml.join("\n")) {
        Ok(serde_yaml::Value::Mapping(map)) => map
            .iter()
            .filter_map(|(k, v)| Some((k.as_str()?.to_string(), FieldValue::from_yaml(v))))
            .collect(),
        Ok(_) => BTreeMap::new(),
        Err(e) => {
            log::debug!("Ignoring unparsable frontmatter: {}", e);
            BTreeMap::new()
        }
    };
    (map, body_start)
}

fn frontmatter_tags(frontmatter: &BTreeMap<String, FieldValue>) -> Vec<String> {
    let mut tags = Vec::new();
    for key in ["tags", "tag"] {
        let raw: Vec<String> = match frontmatter.get(key) {
            Some(FieldValue::Text(s)) => s
                .split([',', ' '])
                .map(str::to_string)
                .collect(),
            Some(FieldValue::List(items)) => items
                .iter()
                .filter_map(|v| v.as_text().map(str::to_string))
                .collect(),
            _ => continue,
        };
        for t in raw {
            let t = t.trim();
            if t.is_empty() {
                continue;
            }
            let tag = if t.starts_with('#') { t.to_string() } else { format!("#{}", t) };
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    tags
}

fn inline_tags(text: &str) -> Vec<String> {
    INLINE_TAG
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}
