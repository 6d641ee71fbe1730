//! Field paths: dotted addresses into a résumé record such as
//! `"experience.0.responsibilities.1"` or `"contact.name"`.
//!
//! Updates are copy-on-write: only the containers along the path are cloned
//! (`Arc::make_mut`), every sibling stays shared with the previous snapshot.
//! Missing list slots are padded with blank entries and missing optional
//! containers are created, so a form may set a deep field before its parent
//! exists.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::resume::{
    Contact, CustomItem, CustomSection, EducationEntry, Entries, ExperienceEntry, FontSize,
    Language, Meta, ProjectEntry, ResumeRecord, Settings, Skill, Template, Text,
};

/// Upper bound on list indices accepted in a path, so a typo cannot pad a
/// list with millions of blank entries.
pub const MAX_INDEX: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => f.write_str(name),
            Segment::Index(i) => write!(f, "{i}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// Splits on `.`; purely numeric segments become list indices.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        for part in raw.split('.') {
            let part = part.trim();
            if part.is_empty() {
                return Err(PathError::EmptySegment(raw.to_string()));
            }
            let segment = if part.bytes().all(|b| b.is_ascii_digit()) {
                let index: usize = part
                    .parse()
                    .map_err(|_| PathError::IndexOutOfRange(part.to_string()))?;
                if index > MAX_INDEX {
                    return Err(PathError::IndexOutOfRange(part.to_string()));
                }
                Segment::Index(index)
            } else {
                Segment::Field(part.to_string())
            };
            segments.push(segment);
        }
        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&joined.join("."))
    }
}

/// A value written at the end of a path. `Clear` (JSON `null`) empties an
/// optional field or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Number(f64),
    Tags(Vec<String>),
    Clear,
}

impl FieldValue {
    fn kind(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Flag(_) => "flag",
            FieldValue::Number(_) => "number",
            FieldValue::Tags(_) => "tags",
            FieldValue::Clear => "null",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PathError {
    #[error("Path '{0}' has an empty segment")]
    EmptySegment(String),

    #[error("Index '{0}' is out of range")]
    IndexOutOfRange(String),

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Field '{0}' cannot be edited")]
    ReadOnly(&'static str),

    #[error("Expected a field name, found '{0}'")]
    ExpectedField(String),

    #[error("Expected a list index, found '{0}'")]
    ExpectedIndex(String),

    #[error("Path continues past a value at '{0}'")]
    PastLeaf(String),

    #[error("Cannot write a {found} value here, expected {expected}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Anything that can take a write at a relative path.
pub(crate) trait PathTarget {
    fn set_path(&mut self, path: &[Segment], value: FieldValue) -> Result<(), PathError>;
}

/// Applies `value` at `path` on `record`, copying only the touched containers.
pub fn apply(record: &mut ResumeRecord, path: &FieldPath, value: FieldValue) -> Result<(), PathError> {
    record.set_path(path.segments(), value)
}

// ────────────────────────────────────────────────────────────────────────────
// Leaf and container helpers
// ────────────────────────────────────────────────────────────────────────────

fn split_field(path: &[Segment]) -> Result<(&str, &[Segment]), PathError> {
    match path.split_first() {
        Some((Segment::Field(name), rest)) => Ok((name.as_str(), rest)),
        Some((Segment::Index(i), _)) => Err(PathError::ExpectedField(i.to_string())),
        None => Err(PathError::WrongKind {
            expected: "a field path",
            found: "empty path",
        }),
    }
}

fn ensure_leaf(rest: &[Segment]) -> Result<(), PathError> {
    match rest.first() {
        None => Ok(()),
        Some(segment) => Err(PathError::PastLeaf(segment.to_string())),
    }
}

fn wrong_kind(expected: &'static str, value: &FieldValue) -> PathError {
    PathError::WrongKind {
        expected,
        found: value.kind(),
    }
}

fn set_text(slot: &mut Text, rest: &[Segment], value: FieldValue) -> Result<(), PathError> {
    ensure_leaf(rest)?;
    match value {
        FieldValue::Text(text) => {
            *slot = Text::from(text);
            Ok(())
        }
        other => Err(wrong_kind("text", &other)),
    }
}

fn set_optional_text(
    slot: &mut Option<Text>,
    rest: &[Segment],
    value: FieldValue,
) -> Result<(), PathError> {
    ensure_leaf(rest)?;
    match value {
        FieldValue::Text(text) => {
            *slot = Some(Text::from(text));
            Ok(())
        }
        FieldValue::Clear => {
            *slot = None;
            Ok(())
        }
        other => Err(wrong_kind("text or null", &other)),
    }
}

fn set_flag(slot: &mut bool, rest: &[Segment], value: FieldValue) -> Result<(), PathError> {
    ensure_leaf(rest)?;
    match value {
        FieldValue::Flag(flag) => {
            *slot = flag;
            Ok(())
        }
        other => Err(wrong_kind("flag", &other)),
    }
}

fn set_score(slot: &mut Option<u8>, rest: &[Segment], value: FieldValue) -> Result<(), PathError> {
    ensure_leaf(rest)?;
    match value {
        FieldValue::Number(n) if n.fract() == 0.0 && (0.0..=100.0).contains(&n) => {
            *slot = Some(n as u8);
            Ok(())
        }
        FieldValue::Number(n) => Err(PathError::InvalidValue(format!(
            "score must be a whole number from 0 to 100, got {n}"
        ))),
        FieldValue::Clear => {
            *slot = None;
            Ok(())
        }
        other => Err(wrong_kind("number or null", &other)),
    }
}

fn index_of(path: &[Segment]) -> Result<(usize, &[Segment]), PathError> {
    match path.split_first() {
        Some((Segment::Index(i), rest)) => Ok((*i, rest)),
        Some((Segment::Field(name), _)) => Err(PathError::ExpectedIndex(name.clone())),
        None => Err(PathError::ExpectedIndex(String::new())),
    }
}

/// Writes into a list of plain strings: the whole list (`Tags`/`Clear`) or one
/// slot by index, padding with empty strings.
fn set_text_list(
    list: &mut Arc<Vec<Text>>,
    path: &[Segment],
    value: FieldValue,
) -> Result<(), PathError> {
    if path.is_empty() {
        return match value {
            FieldValue::Tags(items) => {
                *list = Arc::new(items.into_iter().map(Text::from).collect());
                Ok(())
            }
            FieldValue::Clear => {
                *list = Arc::default();
                Ok(())
            }
            other => Err(wrong_kind("tags or null", &other)),
        };
    }

    let (index, rest) = index_of(path)?;
    ensure_leaf(rest)?;
    let FieldValue::Text(text) = value else {
        return Err(wrong_kind("text", &value));
    };
    let items = Arc::make_mut(list);
    if items.len() <= index {
        items.resize(index + 1, Text::from(""));
    }
    items[index] = Text::from(text);
    Ok(())
}

/// Writes into a list of shared entries, padding with blank entries and
/// descending into the one addressed by index.
fn set_entries<T>(list: &mut Entries<T>, path: &[Segment], value: FieldValue) -> Result<(), PathError>
where
    T: PathTarget + Clone + Default,
{
    if path.is_empty() {
        return match value {
            FieldValue::Clear => {
                *list = Arc::default();
                Ok(())
            }
            other => Err(wrong_kind("null", &other)),
        };
    }

    let (index, rest) = index_of(path)?;
    let items = Arc::make_mut(list);
    if items.len() <= index {
        items.resize_with(index + 1, Arc::default);
    }
    Arc::make_mut(&mut items[index]).set_path(rest, value)
}

fn set_nested<T>(slot: &mut Arc<T>, path: &[Segment], value: FieldValue) -> Result<(), PathError>
where
    T: PathTarget + Clone,
{
    Arc::make_mut(slot).set_path(path, value)
}

// ────────────────────────────────────────────────────────────────────────────
// Record fields
// ────────────────────────────────────────────────────────────────────────────

impl PathTarget for ResumeRecord {
    fn set_path(&mut self, path: &[Segment], value: FieldValue) -> Result<(), PathError> {
        let (field, rest) = split_field(path)?;
        match field {
            "id" => Err(PathError::ReadOnly("id")),
            "versionName" => set_text(&mut self.version_name, rest, value),
            "template" => {
                ensure_leaf(rest)?;
                match value {
                    FieldValue::Text(name) => {
                        self.template = Template::parse(&name).ok_or_else(|| {
                            PathError::InvalidValue(format!("unknown template '{name}'"))
                        })?;
                        Ok(())
                    }
                    other => Err(wrong_kind("text", &other)),
                }
            }
            "contact" => set_nested(&mut self.contact, rest, value),
            "summary" => set_text(&mut self.summary, rest, value),
            "experience" => set_entries(&mut self.experience, rest, value),
            "education" => set_entries(&mut self.education, rest, value),
            "skills" => set_entries(&mut self.skills, rest, value),
            "projects" => set_entries(&mut self.projects, rest, value),
            "languages" => set_entries(&mut self.languages, rest, value),
            "customSections" => set_entries(&mut self.custom_sections, rest, value),
            "meta" => set_nested(&mut self.meta, rest, value),
            "settings" => set_nested(&mut self.settings, rest, value),
            other => Err(PathError::UnknownField(other.to_string())),
        }
    }
}

impl PathTarget for Contact {
    fn set_path(&mut self, path: &[Segment], value: FieldValue) -> Result<(), PathError> {
        let (field, rest) = split_field(path)?;
        match field {
            "name" => set_text(&mut self.name, rest, value),
            "email" => set_text(&mut self.email, rest, value),
            "phone" => set_text(&mut self.phone, rest, value),
            "address" => set_text(&mut self.address, rest, value),
            "linkedin" => set_text(&mut self.linkedin, rest, value),
            "github" => set_text(&mut self.github, rest, value),
            "portfolio" => set_text(&mut self.portfolio, rest, value),
            "photo" => set_optional_text(&mut self.photo, rest, value),
            other => Err(PathError::UnknownField(format!("contact.{other}"))),
        }
    }
}

impl PathTarget for ExperienceEntry {
    fn set_path(&mut self, path: &[Segment], value: FieldValue) -> Result<(), PathError> {
        let (field, rest) = split_field(path)?;
        match field {
            "jobTitle" => set_text(&mut self.job_title, rest, value),
            "company" => set_text(&mut self.company, rest, value),
            "location" => set_text(&mut self.location, rest, value),
            "startDate" => set_text(&mut self.start_date, rest, value),
            "endDate" => set_text(&mut self.end_date, rest, value),
            "isCurrent" => set_flag(&mut self.is_current, rest, value),
            "responsibilities" => set_text_list(&mut self.responsibilities, rest, value),
            other => Err(PathError::UnknownField(format!("experience.{other}"))),
        }
    }
}

impl PathTarget for EducationEntry {
    fn set_path(&mut self, path: &[Segment], value: FieldValue) -> Result<(), PathError> {
        let (field, rest) = split_field(path)?;
        match field {
            "institution" => set_text(&mut self.institution, rest, value),
            "degree" => set_text(&mut self.degree, rest, value),
            "field" => set_text(&mut self.field, rest, value),
            "startDate" => set_text(&mut self.start_date, rest, value),
            "endDate" => set_text(&mut self.end_date, rest, value),
            "gpa" => set_optional_text(&mut self.gpa, rest, value),
            other => Err(PathError::UnknownField(format!("education.{other}"))),
        }
    }
}

impl PathTarget for Skill {
    fn set_path(&mut self, path: &[Segment], value: FieldValue) -> Result<(), PathError> {
        let (field, rest) = split_field(path)?;
        match field {
            "name" => set_text(&mut self.name, rest, value),
            "category" => set_optional_text(&mut self.category, rest, value),
            other => Err(PathError::UnknownField(format!("skills.{other}"))),
        }
    }
}

impl PathTarget for ProjectEntry {
    fn set_path(&mut self, path: &[Segment], value: FieldValue) -> Result<(), PathError> {
        let (field, rest) = split_field(path)?;
        match field {
            "name" => set_text(&mut self.name, rest, value),
            "description" => set_text(&mut self.description, rest, value),
            "technologies" => set_text_list(&mut self.technologies, rest, value),
            "link" => set_optional_text(&mut self.link, rest, value),
            "startDate" => set_optional_text(&mut self.start_date, rest, value),
            "endDate" => set_optional_text(&mut self.end_date, rest, value),
            other => Err(PathError::UnknownField(format!("projects.{other}"))),
        }
    }
}

impl PathTarget for Language {
    fn set_path(&mut self, path: &[Segment], value: FieldValue) -> Result<(), PathError> {
        let (field, rest) = split_field(path)?;
        match field {
            "name" => set_text(&mut self.name, rest, value),
            "proficiency" => set_optional_text(&mut self.proficiency, rest, value),
            other => Err(PathError::UnknownField(format!("languages.{other}"))),
        }
    }
}

impl PathTarget for CustomSection {
    fn set_path(&mut self, path: &[Segment], value: FieldValue) -> Result<(), PathError> {
        let (field, rest) = split_field(path)?;
        match field {
            "title" => set_text(&mut self.title, rest, value),
            "items" => set_entries(&mut self.items, rest, value),
            other => Err(PathError::UnknownField(format!("customSections.{other}"))),
        }
    }
}

impl PathTarget for CustomItem {
    fn set_path(&mut self, path: &[Segment], value: FieldValue) -> Result<(), PathError> {
        let (field, rest) = split_field(path)?;
        match field {
            "content" => set_text(&mut self.content, rest, value),
            "subContent" => set_optional_text(&mut self.sub_content, rest, value),
            "date" => set_optional_text(&mut self.date, rest, value),
            other => Err(PathError::UnknownField(format!("items.{other}"))),
        }
    }
}

impl PathTarget for Meta {
    fn set_path(&mut self, path: &[Segment], value: FieldValue) -> Result<(), PathError> {
        let (field, rest) = split_field(path)?;
        match field {
            "lastModified" => Err(PathError::ReadOnly("meta.lastModified")),
            "jobDescription" => set_optional_text(&mut self.job_description, rest, value),
            "atsScore" => set_score(&mut self.ats_score, rest, value),
            "improvementSuggestions" => {
                if rest.is_empty() && value == FieldValue::Clear {
                    self.improvement_suggestions = None;
                    return Ok(());
                }
                let list = self.improvement_suggestions.get_or_insert_with(Arc::default);
                set_text_list(list, rest, value)
            }
            other => Err(PathError::UnknownField(format!("meta.{other}"))),
        }
    }
}

impl PathTarget for Settings {
    fn set_path(&mut self, path: &[Segment], value: FieldValue) -> Result<(), PathError> {
        let (field, rest) = split_field(path)?;
        match field {
            "fontFamily" => set_text(&mut self.font_family, rest, value),
            "fontSize" => {
                ensure_leaf(rest)?;
                match value {
                    FieldValue::Text(name) => {
                        self.font_size = FontSize::parse(&name).ok_or_else(|| {
                            PathError::InvalidValue(format!("unknown font size '{name}'"))
                        })?;
                        Ok(())
                    }
                    other => Err(wrong_kind("text", &other)),
                }
            }
            "accentColor" => set_text(&mut self.accent_color, rest, value),
            "showAddress" => set_flag(&mut self.show_address, rest, value),
            "showGithub" => set_flag(&mut self.show_github, rest, value),
            "showPortfolio" => set_flag(&mut self.show_portfolio, rest, value),
            "showPhoto" => set_flag(&mut self.show_photo, rest, value),
            other => Err(PathError::UnknownField(format!("settings.{other}"))),
        }
    }
}
