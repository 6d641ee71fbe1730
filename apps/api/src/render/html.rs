//! HTML serialization of a display document: one flowing `<article>` the
//! rasterizer can paginate by height.

use std::fmt::Write;

use crate::render::document::{
    ContactLine, DisplayDocument, Header, Item, Layout, Section, SidebarRegion,
};

pub fn to_html(document: &DisplayDocument) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<article class="resume template-{}" style="font-family: {}; font-size: {}pt; --accent: {};">"#,
        document.template,
        escape(&document.style.font_family),
        document.style.base_font_pt,
        escape(&document.style.accent_color),
    );

    match &document.layout {
        Layout::SingleColumn { header, sections } => {
            push_header(&mut out, header);
            push_sections(&mut out, sections);
        }
        Layout::Sidebar { sidebar, main } => {
            out.push_str(r#"<div class="layout sidebar">"#);
            push_sidebar(&mut out, sidebar);
            out.push_str("<main>");
            push_sections(&mut out, main);
            out.push_str("</main></div>");
        }
        Layout::TwoColumn {
            header,
            left,
            right,
        } => {
            push_header(&mut out, header);
            out.push_str(r#"<div class="layout two-column"><div class="column left">"#);
            push_sections(&mut out, left);
            out.push_str(r#"</div><div class="column right">"#);
            push_sections(&mut out, right);
            out.push_str("</div></div>");
        }
    }

    out.push_str("</article>");
    out
}

/// Escapes text for element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn push_header(out: &mut String, header: &Header) {
    out.push_str("<header>");
    if let Some(photo) = &header.photo {
        let _ = write!(out, r#"<img class="photo" src="{}" alt="">"#, escape(photo));
    }
    if !header.name.is_empty() {
        let _ = write!(out, "<h1>{}</h1>", escape(&header.name));
    }
    push_contact(out, &header.contact);
    out.push_str("</header>");
}

fn push_sidebar(out: &mut String, sidebar: &SidebarRegion) {
    out.push_str("<aside>");
    if let Some(photo) = &sidebar.photo {
        let _ = write!(out, r#"<img class="photo" src="{}" alt="">"#, escape(photo));
    }
    if !sidebar.name.is_empty() {
        let _ = write!(out, "<h1>{}</h1>", escape(&sidebar.name));
    }
    if let Some(subtitle) = &sidebar.subtitle {
        let _ = write!(out, r#"<p class="subtitle">{}</p>"#, escape(subtitle));
    }
    push_contact(out, &sidebar.contact);
    push_sections(out, &sidebar.sections);
    out.push_str("</aside>");
}

fn push_contact(out: &mut String, lines: &[ContactLine]) {
    if lines.is_empty() {
        return;
    }
    out.push_str(r#"<ul class="contact">"#);
    for line in lines {
        match &line.href {
            Some(href) => {
                let _ = write!(
                    out,
                    r#"<li><a href="{}">{}</a></li>"#,
                    escape(href),
                    escape(&line.text)
                );
            }
            None => {
                let _ = write!(out, "<li>{}</li>", escape(&line.text));
            }
        }
    }
    out.push_str("</ul>");
}

fn push_sections(out: &mut String, sections: &[Section]) {
    for section in sections {
        let _ = write!(
            out,
            r#"<section class="{:?}"><h2>{}</h2>"#,
            section.kind,
            escape(&section.title)
        );
        for item in &section.items {
            push_item(out, item);
        }
        out.push_str("</section>");
    }
}

fn push_bullets(out: &mut String, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    out.push_str("<ul>");
    for line in lines {
        let _ = write!(out, "<li>{}</li>", escape(line));
    }
    out.push_str("</ul>");
}

fn push_optional(out: &mut String, class: &str, text: &Option<String>) {
    if let Some(text) = text {
        let _ = write!(out, r#"<span class="{class}">{}</span>"#, escape(text));
    }
}

fn push_item(out: &mut String, item: &Item) {
    match item {
        Item::Bullets { lines } => push_bullets(out, lines),
        Item::Position {
            title,
            organization,
            location,
            dates,
            bullets,
        } => {
            let _ = write!(
                out,
                r#"<div class="entry"><h3>{}</h3><span class="org">{}</span>"#,
                escape(title),
                escape(organization)
            );
            push_optional(out, "location", location);
            push_optional(out, "dates", dates);
            push_bullets(out, bullets);
            out.push_str("</div>");
        }
        Item::Project {
            name,
            link,
            dates,
            technologies,
            bullets,
        } => {
            let _ = write!(out, r#"<div class="entry"><h3>{}</h3>"#, escape(name));
            if let Some(link) = link {
                let _ = write!(out, r#"<a href="{0}">{0}</a>"#, escape(link));
            }
            push_optional(out, "dates", dates);
            if !technologies.is_empty() {
                let _ = write!(
                    out,
                    r#"<p class="tech">{}</p>"#,
                    escape(&technologies.join(", "))
                );
            }
            push_bullets(out, bullets);
            out.push_str("</div>");
        }
        Item::Degree {
            institution,
            credential,
            dates,
            gpa,
        } => {
            let _ = write!(
                out,
                r#"<div class="entry"><h3>{}</h3><span class="credential">{}</span>"#,
                escape(institution),
                escape(credential)
            );
            push_optional(out, "dates", dates);
            if let Some(gpa) = gpa {
                let _ = write!(out, r#"<span class="gpa">GPA: {}</span>"#, escape(gpa));
            }
            out.push_str("</div>");
        }
        Item::Tag { label, detail } => {
            let _ = write!(out, r#"<span class="tag">{}"#, escape(label));
            if let Some(detail) = detail {
                let _ = write!(out, " <small>({})</small>", escape(detail));
            }
            out.push_str("</span>");
        }
        Item::Entry {
            content,
            sub_content,
            date,
        } => {
            let _ = write!(out, r#"<div class="entry"><p>{}</p>"#, escape(content));
            push_optional(out, "sub", sub_content);
            push_optional(out, "dates", date);
            out.push_str("</div>");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::resume::{Contact, ResumeRecord, Template, Text};
    use crate::render::render;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"R&D"</b>"#),
            "&lt;b&gt;&quot;R&amp;D&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_html_is_single_article_and_escaped() {
        let mut record = ResumeRecord::blank(Uuid::new_v4(), Utc::now());
        record.contact = Arc::new(Contact {
            name: Text::from("Ada <Byron>"),
            ..Contact::default()
        });
        record.summary = Text::from("Line one\nLine two");

        let html = to_html(&render(&record));
        assert!(html.starts_with(r#"<article class="resume template-classic""#));
        assert!(html.ends_with("</article>"));
        assert_eq!(html.matches("<article").count(), 1);
        assert!(html.contains("<h1>Ada &lt;Byron&gt;</h1>"));
        assert!(html.contains("<li>Line one</li><li>Line two</li>"));
    }

    #[test]
    fn test_html_two_column_regions() {
        let mut record = ResumeRecord::blank(Uuid::new_v4(), Utc::now());
        record.template = Template::TwoColumnClassic;
        let html = to_html(&render(&record));
        assert!(html.contains(r#"<div class="column left">"#));
        assert!(html.contains(r#"<div class="column right">"#));
    }

    #[test]
    fn test_html_header_photo() {
        let mut record = ResumeRecord::blank(Uuid::new_v4(), Utc::now());
        record.contact = Arc::new(Contact {
            name: Text::from("Ada"),
            photo: Some(Text::from("photos/ada.png")),
            ..Contact::default()
        });
        assert!(!to_html(&render(&record)).contains("<img"));

        Arc::make_mut(&mut record.settings).show_photo = true;
        let html = to_html(&render(&record));
        assert!(html.contains(r#"<header><img class="photo" src="photos/ada.png" alt="">"#));
    }
}
