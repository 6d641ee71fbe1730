// Prompt templates for the AI flows. Placeholders in `{braces}` are filled by
// `fill` before sending.

/// Substitutes `{name}` placeholders in one left-to-right pass. Inserted values
/// are never rescanned, so user text containing `{skills}` stays literal.
/// Braces that do not name a known placeholder are copied through.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let found = after.find('}').and_then(|end| {
            let name = &after[..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (end, *value))
        });
        match found {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Replace: {factual_instruction}, {experience_level}, {job_title}, {skills},
///          {experience_summary}
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"{factual_instruction}

Write a professional resume summary of 2 to 4 sentences for this candidate.

Experience level: {experience_level}
Target job title: {job_title}
Skills: {skills}
Experience summary:
{experience_summary}

Return a JSON object:
{
  "summary": "..."
}"#;

/// Replace: {factual_instruction}, {job_title}, {company}, {description}
pub const BULLETS_PROMPT_TEMPLATE: &str = r#"{factual_instruction}

Rewrite the following role description as 3 to 6 resume bullet points.
Each bullet is one sentence, starts with an action verb, and has no leading dash.

Job title: {job_title}
Company: {company}
Description:
{description}

Return a JSON object:
{
  "bullets": ["...", "..."]
}"#;

/// Replace: {factual_instruction}, {company_name}, {job_description}, {resume_json}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"{factual_instruction}

Write a cover letter of 3 to 5 paragraphs for the candidate below, addressed to {company_name}.
Separate paragraphs with a blank line.

JOB DESCRIPTION:
{job_description}

CANDIDATE RESUME (JSON):
{resume_json}

Return a JSON object:
{
  "coverLetter": "..."
}"#;

/// Replace: {job_title}, {existing_skills}
pub const SKILLS_PROMPT_TEMPLATE: &str = r#"Suggest up to 10 skills a strong candidate for the role below would list on a resume.
Do not repeat skills the candidate already lists.

Target job title: {job_title}
Existing skills: {existing_skills}

Return a JSON object:
{
  "skills": ["...", "..."]
}"#;

/// Replace: {job_description}, {resume_json}
pub const ATS_PROMPT_TEMPLATE: &str = r#"Act as an applicant tracking system. Score how well this resume matches the job description
from 0 to 100, then list concrete improvements, most important first.

JOB DESCRIPTION:
{job_description}

RESUME (JSON):
{resume_json}

Return a JSON object:
{
  "score": 0,
  "suggestions": ["...", "..."]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_replaces_known_placeholders() {
        let out = fill("Hi {name}, {missing} {\n \"k\": 1}", &[("name", "Ada")]);
        assert_eq!(out, "Hi Ada, {missing} {\n \"k\": 1}");
    }

    #[test]
    fn test_fill_does_not_rescan_inserted_values() {
        let out = fill(
            "{experience_summary} / {skills}",
            &[("experience_summary", "I write {skills}"), ("skills", "Rust")],
        );
        assert_eq!(out, "I write {skills} / Rust");
    }

    #[test]
    fn test_every_template_keeps_its_json_example() {
        for template in [
            SUMMARY_PROMPT_TEMPLATE,
            BULLETS_PROMPT_TEMPLATE,
            COVER_LETTER_PROMPT_TEMPLATE,
            SKILLS_PROMPT_TEMPLATE,
            ATS_PROMPT_TEMPLATE,
        ] {
            assert!(fill(template, &[]).contains("Return a JSON object:\n{"));
        }
    }
}
