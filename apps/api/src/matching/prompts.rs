// All LLM prompt constants for the matching module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for batch scoring. Append `JSON_ONLY_SYSTEM` before sending.
pub const MATCH_SYSTEM: &str = "You are an experienced campus recruiter. \
    You compare one candidate against a list of job postings and score how well \
    the candidate fits each posting.";

/// Batch scoring prompt template.
/// Replace `{id_echo_instruction}`, `{candidate_json}` and `{jobs_json}` before sending.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"Score the candidate below against every job in the list.

CANDIDATE:
{candidate_json}

JOBS:
{jobs_json}

Return a JSON object with this EXACT schema (no extra fields):
{
  "matches": [
    {
      "id": "<job id, copied verbatim>",
      "s": 78,
      "r": ["reason the candidate fits"],
      "k": ["risk or mismatch"],
      "t": "one concrete improvement tip"
    }
  ]
}

Rules:
- "s" is an integer from 0 to 100.
- Check cohort / graduation year and education requirements first; a hard mismatch caps "s" at 40.
- Prefer jobs in the candidate's target cities, but do not reject other cities outright.
- Keep each reason and risk under 30 characters; at most 3 of each.
- Write reasons, risks and tips in the same language as the job postings.

{id_echo_instruction}"#;
