//! Instruction text sent to the generation backend.
//!
//! Content is embedded verbatim. Nothing here escapes or validates it, so a
//! caller-supplied string can carry instructions of its own into the prompt.

use crate::models::ResponseMode;

/// Lab summaries only look at the head of the extracted text.
pub const LAB_TEXT_LIMIT: usize = 5000;

pub fn build(mode: ResponseMode, content: &str) -> String {
    match mode {
        ResponseMode::Report => report(content),
        ResponseMode::Chat => chat(content),
    }
}

fn report(content: &str) -> String {
    format!(
        "You are a compassionate medical professional explaining a diagnostic or radiology report.

Report Data:
-------------------------
{content}
-------------------------

Your task:
1. Do NOT begin with any greeting or name (the system adds that already).
2. Explain findings clearly and kindly in layman terms.
3. Say if results appear normal or may require attention.
4. If abnormal, suggest what kind of **specialist** to see.
5. Give 3–5 brief **home-care and lifestyle tips** (rest 😴, hydration 💧, warm compress 🌿, fresh diet 🍎, etc.).
6. Encourage professional consultation for confirmation.
7. Keep it under 10 lines, friendly but professional (💊🩺😊).
"
    )
}

fn chat(content: &str) -> String {
    format!(
        "You are a friendly medical assistant giving conversational wellness guidance.

The patient says:
-------------------------
{content}
-------------------------

Respond with:
- No greeting at the start.
- Simple, clear suggestions (no jargon).
- 2–3 easy home remedies (hydration 💧, rest 😴, herbal tea 🌿).
- Mention which doctor to consult if needed.
- Keep under 6 lines, positive and reassuring.
"
    )
}

pub fn lab_summary(text: &str) -> String {
    let excerpt: String = text.chars().take(LAB_TEXT_LIMIT).collect();
    format!(
        "You are a medical assistant. Summarize key points of this report in simple terms:

{excerpt}
"
    )
}
