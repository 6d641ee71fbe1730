//! Template renderer: maps a résumé record onto one of the visual layouts.
//!
//! `render` is pure: no storage, no network, no pagination. The output is a
//! single flowing document; the external rasterizer slices it into pages.
//! A section is emitted only when its backing data is non-empty.

pub mod document;
pub mod format;
pub mod html;

use crate::models::resume::{Contact, CustomSection, ResumeRecord, Settings, Template};
use crate::render::document::{
    ContactKind, ContactLine, DisplayDocument, Header, Item, Layout, Section, SectionKind,
    SidebarRegion, Style,
};
use crate::render::format::{bullet_lines, date_range, non_blank, with_scheme};

/// Custom sections whose title contains one of these (case-insensitive) go to
/// the left column of the two-column layout.
pub const LEFT_COLUMN_CATEGORIES: [&str; 6] = [
    "Career Objective",
    "Software",
    "Certifications",
    "Awards",
    "Hobbies",
    "Interests",
];

const CUSTOM_SECTION_FALLBACK_TITLE: &str = "Additional Information";

pub fn render(record: &ResumeRecord) -> DisplayDocument {
    let layout = match record.template {
        Template::Classic | Template::Modern | Template::Compact => single_column(record),
        Template::Creative => sidebar(record),
        Template::TwoColumnClassic => two_column(record),
    };
    DisplayDocument {
        template: record.template,
        style: style(&record.settings),
        layout,
    }
}

fn style(settings: &Settings) -> Style {
    Style {
        font_family: settings.font_family.to_string(),
        base_font_pt: settings.font_size.base_pt(),
        accent_color: settings.accent_color.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layouts
// ────────────────────────────────────────────────────────────────────────────

fn single_column(record: &ResumeRecord) -> Layout {
    let mut sections: Vec<Section> = [
        summary_section(record),
        experience_section(record),
        projects_section(record),
        education_section(record),
        skills_section(record),
        languages_section(record),
    ]
    .into_iter()
    .flatten()
    .collect();
    sections.extend(custom_sections(record.custom_sections.iter().map(|s| &**s)));

    Layout::SingleColumn {
        header: header(record),
        sections,
    }
}

/// Sidebar carries identity, contact, skills and languages; everything else
/// flows in the main region.
fn sidebar(record: &ResumeRecord) -> Layout {
    let photo = visible_photo(record);
    let subtitle = record
        .experience
        .first()
        .and_then(|entry| non_blank(&entry.job_title));

    let sidebar = SidebarRegion {
        photo,
        name: record.contact.name.trim().to_string(),
        subtitle,
        contact: contact_lines(&record.contact, &record.settings),
        sections: [skills_section(record), languages_section(record)]
            .into_iter()
            .flatten()
            .collect(),
    };

    let mut main: Vec<Section> = [
        summary_section(record),
        experience_section(record),
        projects_section(record),
        education_section(record),
    ]
    .into_iter()
    .flatten()
    .collect();
    main.extend(custom_sections(record.custom_sections.iter().map(|s| &**s)));

    Layout::Sidebar { sidebar, main }
}

fn two_column(record: &ResumeRecord) -> Layout {
    let (left_custom, right_custom): (Vec<&CustomSection>, Vec<&CustomSection>) = record
        .custom_sections
        .iter()
        .map(|s| &**s)
        .partition(|section| is_left_column(&section.title));

    let mut left: Vec<Section> = [skills_section(record), languages_section(record)]
        .into_iter()
        .flatten()
        .collect();
    left.extend(custom_sections(left_custom));

    let mut right: Vec<Section> = [
        summary_section(record),
        experience_section(record),
        projects_section(record),
        education_section(record),
    ]
    .into_iter()
    .flatten()
    .collect();
    right.extend(custom_sections(right_custom));

    Layout::TwoColumn {
        header: header(record),
        left,
        right,
    }
}

/// Case-insensitive substring match against the left-column categories.
pub fn is_left_column(title: &str) -> bool {
    let title = title.to_lowercase();
    LEFT_COLUMN_CATEGORIES
        .iter()
        .any(|category| title.contains(&category.to_lowercase()))
}

// ────────────────────────────────────────────────────────────────────────────
// Header
// ────────────────────────────────────────────────────────────────────────────

fn header(record: &ResumeRecord) -> Header {
    Header {
        photo: visible_photo(record),
        name: record.contact.name.trim().to_string(),
        contact: contact_lines(&record.contact, &record.settings),
    }
}

/// The photo reference, when one is set and `showPhoto` is on.
fn visible_photo(record: &ResumeRecord) -> Option<String> {
    if !record.settings.show_photo {
        return None;
    }
    record.contact.photo.as_deref().and_then(non_blank)
}

/// Contact fields in display order. Blank fields are skipped; address,
/// GitHub and portfolio also honour their visibility settings.
fn contact_lines(contact: &Contact, settings: &Settings) -> Vec<ContactLine> {
    let fields = [
        (ContactKind::Email, &contact.email, true),
        (ContactKind::Phone, &contact.phone, true),
        (ContactKind::Address, &contact.address, settings.show_address),
        (ContactKind::Linkedin, &contact.linkedin, true),
        (ContactKind::Github, &contact.github, settings.show_github),
        (ContactKind::Portfolio, &contact.portfolio, settings.show_portfolio),
    ];

    fields
        .into_iter()
        .filter(|(_, _, visible)| *visible)
        .filter_map(|(kind, value, _)| {
            let text = non_blank(value)?;
            let href = match kind {
                ContactKind::Email => Some(format!("mailto:{text}")),
                ContactKind::Phone | ContactKind::Address => None,
                ContactKind::Linkedin | ContactKind::Github | ContactKind::Portfolio => {
                    Some(with_scheme(&text))
                }
            };
            Some(ContactLine { kind, text, href })
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

fn summary_section(record: &ResumeRecord) -> Option<Section> {
    let lines = bullet_lines(&record.summary);
    if lines.is_empty() {
        return None;
    }
    Some(Section {
        kind: SectionKind::Summary,
        title: "Professional Summary".to_string(),
        items: vec![Item::Bullets { lines }],
    })
}

fn experience_section(record: &ResumeRecord) -> Option<Section> {
    if record.experience.is_empty() {
        return None;
    }
    let items = record
        .experience
        .iter()
        .map(|entry| Item::Position {
            title: entry.job_title.trim().to_string(),
            organization: entry.company.trim().to_string(),
            location: non_blank(&entry.location),
            dates: date_range(&entry.start_date, &entry.end_date, entry.is_current),
            bullets: entry
                .responsibilities
                .iter()
                .flat_map(|line| bullet_lines(line))
                .collect(),
        })
        .collect();
    Some(Section {
        kind: SectionKind::Experience,
        title: "Experience".to_string(),
        items,
    })
}

fn projects_section(record: &ResumeRecord) -> Option<Section> {
    if record.projects.is_empty() {
        return None;
    }
    let items = record
        .projects
        .iter()
        .map(|project| Item::Project {
            name: project.name.trim().to_string(),
            link: project.link.as_deref().and_then(non_blank).map(|l| with_scheme(&l)),
            dates: date_range(
                project.start_date.as_deref().unwrap_or_default(),
                project.end_date.as_deref().unwrap_or_default(),
                false,
            ),
            technologies: project
                .technologies
                .iter()
                .filter_map(|t| non_blank(t))
                .collect(),
            bullets: bullet_lines(&project.description),
        })
        .collect();
    Some(Section {
        kind: SectionKind::Projects,
        title: "Projects".to_string(),
        items,
    })
}

fn education_section(record: &ResumeRecord) -> Option<Section> {
    if record.education.is_empty() {
        return None;
    }
    let items = record
        .education
        .iter()
        .map(|entry| {
            let credential = match (non_blank(&entry.degree), non_blank(&entry.field)) {
                (Some(degree), Some(field)) => format!("{degree} in {field}"),
                (Some(only), None) | (None, Some(only)) => only,
                (None, None) => String::new(),
            };
            Item::Degree {
                institution: entry.institution.trim().to_string(),
                credential,
                dates: date_range(&entry.start_date, &entry.end_date, false),
                gpa: entry.gpa.as_deref().and_then(non_blank),
            }
        })
        .collect();
    Some(Section {
        kind: SectionKind::Education,
        title: "Education".to_string(),
        items,
    })
}

fn skills_section(record: &ResumeRecord) -> Option<Section> {
    if record.skills.is_empty() {
        return None;
    }
    let items = record
        .skills
        .iter()
        .map(|skill| Item::Tag {
            label: skill.name.trim().to_string(),
            detail: skill.category.as_deref().and_then(non_blank),
        })
        .collect();
    Some(Section {
        kind: SectionKind::Skills,
        title: "Skills".to_string(),
        items,
    })
}

fn languages_section(record: &ResumeRecord) -> Option<Section> {
    if record.languages.is_empty() {
        return None;
    }
    let items = record
        .languages
        .iter()
        .map(|language| Item::Tag {
            label: language.name.trim().to_string(),
            detail: language.proficiency.as_deref().and_then(non_blank),
        })
        .collect();
    Some(Section {
        kind: SectionKind::Languages,
        title: "Languages".to_string(),
        items,
    })
}

/// One section per custom section that has at least one item, in order.
fn custom_sections<'a>(sections: impl IntoIterator<Item = &'a CustomSection>) -> Vec<Section> {
    sections
        .into_iter()
        .filter(|section| !section.items.is_empty())
        .map(|section| Section {
            kind: SectionKind::Custom,
            title: non_blank(&section.title)
                .unwrap_or_else(|| CUSTOM_SECTION_FALLBACK_TITLE.to_string()),
            items: section
                .items
                .iter()
                .map(|item| Item::Entry {
                    content: item.content.trim().to_string(),
                    sub_content: item.sub_content.as_deref().and_then(non_blank),
                    date: item.date.as_deref().and_then(non_blank),
                })
                .collect(),
        })
        .collect()
}
