//! Display document: the renderer's output, handed to the rasterizer.

use serde::Serialize;

use crate::models::resume::Template;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayDocument {
    pub template: Template,
    pub style: Style,
    pub layout: Layout,
}

/// Presentation hints copied from the record's settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub font_family: String,
    pub base_font_pt: u8,
    pub accent_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layout {
    SingleColumn {
        header: Header,
        sections: Vec<Section>,
    },
    Sidebar {
        sidebar: SidebarRegion,
        main: Vec<Section>,
    },
    TwoColumn {
        header: Header,
        left: Vec<Section>,
        right: Vec<Section>,
    },
}

#[cfg(test)]
impl Layout {
    /// All sections in reading order, regardless of region.
    pub fn sections(&self) -> Vec<&Section> {
        match self {
            Layout::SingleColumn { sections, .. } => sections.iter().collect(),
            Layout::Sidebar { sidebar, main } => sidebar.sections.iter().chain(main).collect(),
            Layout::TwoColumn { left, right, .. } => left.iter().chain(right).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub photo: Option<String>,
    pub name: String,
    pub contact: Vec<ContactLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarRegion {
    pub photo: Option<String>,
    pub name: String,
    pub subtitle: Option<String>,
    pub contact: Vec<ContactLine>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Email,
    Phone,
    Address,
    Linkedin,
    Github,
    Portfolio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactLine {
    pub kind: ContactKind,
    pub text: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Summary,
    Experience,
    Projects,
    Education,
    Skills,
    Languages,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub kind: SectionKind,
    pub title: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    Bullets {
        lines: Vec<String>,
    },
    Position {
        title: String,
        organization: String,
        location: Option<String>,
        dates: Option<String>,
        bullets: Vec<String>,
    },
    Project {
        name: String,
        link: Option<String>,
        dates: Option<String>,
        technologies: Vec<String>,
        bullets: Vec<String>,
    },
    Degree {
        institution: String,
        credential: String,
        dates: Option<String>,
        gpa: Option<String>,
    },
    Tag {
        label: String,
        detail: Option<String>,
    },
    Entry {
        content: String,
        sub_content: Option<String>,
        date: Option<String>,
    },
}
