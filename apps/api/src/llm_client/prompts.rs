// Shared prompt fragments. Each flow's own templates live in flows/prompts.rs.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are an expert resume writer and career coach. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every content-producing prompt.
pub const FACTUAL_INSTRUCTION: &str = "\
    Use only facts present in the input. Do NOT invent employers, dates, metrics \
    or credentials. Prefer strong action verbs and concrete outcomes.";
