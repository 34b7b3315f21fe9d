// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to prompts whose input is newsletter text written by the operator.
pub const FIDELITY_INSTRUCTION: &str = "\
    CRITICAL: Work only from the text provided. Do NOT invent facts, names, dates or figures. \
    Preserve the original meaning and tone of the content.";

/// Joins a system prompt with the JSON-only fragment.
pub fn json_system(system: &str) -> String {
    format!("{system}\n\n{JSON_ONLY_SYSTEM}")
}

/// Replaces each `{name}` placeholder in one pass. Inserted values are never
/// rescanned, so text that happens to contain a placeholder stays as written.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match vars.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
