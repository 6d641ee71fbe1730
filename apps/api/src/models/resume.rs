//! Résumé record: the persisted shape of one résumé version.
//!
//! Every nested value sits behind an `Arc` so that an edit only copies the
//! containers along the touched path (`Arc::make_mut`); siblings stay shared
//! with the previous snapshot. Strings are `Arc<str>` for the same reason.
//!
//! All fields default when missing from stored JSON, so records written by
//! older builds still load and render.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Shared immutable string used for every text field of a record.
pub type Text = Arc<str>;

/// Ordered, copy-on-write list of shared entries.
pub type Entries<T> = Arc<Vec<Arc<T>>>;

// ────────────────────────────────────────────────────────────────────────────
// Template selector
// ────────────────────────────────────────────────────────────────────────────

/// Visual layout a record is rendered with.
///
/// Stored as its kebab-case name. Unknown names load as `Classic`, the
/// default single-column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Template {
    #[default]
    Classic,
    Modern,
    Compact,
    Creative,
    TwoColumnClassic,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Classic => "classic",
            Template::Modern => "modern",
            Template::Compact => "compact",
            Template::Creative => "creative",
            Template::TwoColumnClassic => "two-column-classic",
        }
    }

    /// Parses a template name, returning `None` for names no layout handles.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" => Some(Template::Classic),
            "modern" => Some(Template::Modern),
            "compact" => Some(Template::Compact),
            "creative" => Some(Template::Creative),
            "two-column-classic" => Some(Template::TwoColumnClassic),
            _ => None,
        }
    }
}

impl From<String> for Template {
    fn from(name: String) -> Self {
        Template::parse(&name).unwrap_or_else(|| {
            tracing::warn!("Unknown template '{name}', falling back to classic");
            Template::Classic
        })
    }
}

impl From<Template> for String {
    fn from(template: Template) -> Self {
        template.as_str().to_string()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub name: Text,
    pub email: Text,
    pub phone: Text,
    pub address: Text,
    pub linkedin: Text,
    pub github: Text,
    pub portfolio: Text,
    pub photo: Option<Text>,
}

/// One position held. When `is_current` is set the end date is never shown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub job_title: Text,
    pub company: Text,
    pub location: Text,
    pub start_date: Text,
    pub end_date: Text,
    pub is_current: bool,
    pub responsibilities: Arc<Vec<Text>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub institution: Text,
    pub degree: Text,
    pub field: Text,
    pub start_date: Text,
    pub end_date: Text,
    pub gpa: Option<Text>,
}

/// Skills are kept exactly as entered, duplicates included.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Skill {
    pub name: Text,
    pub category: Option<Text>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub name: Text,
    /// Multi-line; each line renders as its own bullet.
    pub description: Text,
    pub technologies: Arc<Vec<Text>>,
    pub link: Option<Text>,
    pub start_date: Option<Text>,
    pub end_date: Option<Text>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Language {
    pub name: Text,
    pub proficiency: Option<Text>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomItem {
    pub content: Text,
    pub sub_content: Option<Text>,
    pub date: Option<Text>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomSection {
    pub title: Text,
    pub items: Entries<CustomItem>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Meta {
    pub last_modified: DateTime<Utc>,
    pub job_description: Option<Text>,
    #[serde(deserialize_with = "lenient_score")]
    pub ats_score: Option<u8>,
    pub improvement_suggestions: Option<Arc<Vec<Text>>>,
}

/// Accepts any JSON number and clamps it into `0..=100`.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw
        .filter(|n| n.is_finite())
        .map(|n| n.clamp(0.0, 100.0).round() as u8))
}

/// Body text size class. Unknown names load as `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    /// Base body size in points.
    pub fn base_pt(&self) -> u8 {
        match self {
            FontSize::Small => 10,
            FontSize::Medium => 11,
            FontSize::Large => 12,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FontSize::Small => "small",
            FontSize::Medium => "medium",
            FontSize::Large => "large",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "small" => Some(FontSize::Small),
            "medium" => Some(FontSize::Medium),
            "large" => Some(FontSize::Large),
            _ => None,
        }
    }
}

impl From<String> for FontSize {
    fn from(name: String) -> Self {
        FontSize::parse(&name).unwrap_or_else(|| {
            tracing::warn!("Unknown font size '{name}', falling back to medium");
            FontSize::Medium
        })
    }
}

impl From<FontSize> for String {
    fn from(size: FontSize) -> Self {
        size.as_str().to_string()
    }
}

pub const DEFAULT_FONT_FAMILY: &str = "Inter";
pub const DEFAULT_ACCENT_COLOR: &str = "#1f4e79";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub font_family: Text,
    pub font_size: FontSize,
    pub accent_color: Text,
    pub show_address: bool,
    pub show_github: bool,
    pub show_portfolio: bool,
    pub show_photo: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_family: Text::from(DEFAULT_FONT_FAMILY),
            font_size: FontSize::Medium,
            accent_color: Text::from(DEFAULT_ACCENT_COLOR),
            show_address: true,
            show_github: true,
            show_portfolio: true,
            show_photo: false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Record
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeRecord {
    pub id: Uuid,
    pub version_name: Text,
    pub template: Template,
    pub contact: Arc<Contact>,
    pub summary: Text,
    pub experience: Entries<ExperienceEntry>,
    pub education: Entries<EducationEntry>,
    pub skills: Entries<Skill>,
    pub projects: Entries<ProjectEntry>,
    pub languages: Entries<Language>,
    pub custom_sections: Entries<CustomSection>,
    pub meta: Arc<Meta>,
    pub settings: Arc<Settings>,
}

pub const DEFAULT_VERSION_NAME: &str = "My Resume";
pub const COPY_SUFFIX: &str = " (Copy)";

impl ResumeRecord {
    /// A blank record carrying the given identity. Every collection is empty.
    pub fn blank(id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            version_name: Text::from(DEFAULT_VERSION_NAME),
            meta: Arc::new(Meta {
                last_modified: now,
                ..Meta::default()
            }),
            ..Self::default()
        }
    }

    /// Copies every field under a fresh id, marking the name as a copy.
    /// Nested data stays shared with `self`.
    pub fn duplicated(&self, id: Uuid, now: DateTime<Utc>) -> Self {
        let mut copy = self.clone();
        copy.id = id;
        copy.version_name = Text::from(format!("{}{COPY_SUFFIX}", self.version_name));
        Arc::make_mut(&mut copy.meta).last_modified = now;
        copy
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.meta.last_modified
    }

    /// Stamps `lastModified` with the current time, strictly after the previous stamp.
    pub fn touch(&mut self) {
        let next = next_timestamp(self.meta.last_modified);
        Arc::make_mut(&mut self.meta).last_modified = next;
    }
}

/// Decodes one stored record. Explicit `null`s count as missing, so they take
/// the field's default instead of failing the record.
pub fn decode_stored(mut value: Value) -> Result<ResumeRecord, serde_json::Error> {
    drop_nulls(&mut value);
    serde_json::from_value(value)
}

fn drop_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(drop_nulls);
        }
        Value::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(drop_nulls);
        }
        _ => {}
    }
}

/// Returns `now`, or one millisecond past `previous` if the clock has not moved past it.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::milliseconds(1)
    }
}
