// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Reminds the model that identifiers are opaque and must be echoed verbatim.
pub const ID_ECHO_INSTRUCTION: &str = "\
    CRITICAL: Every item you return must carry the exact `id` string you were given. \
    Do NOT invent, renumber or reformat identifiers. \
    If you cannot evaluate an item, omit it rather than guessing.";
