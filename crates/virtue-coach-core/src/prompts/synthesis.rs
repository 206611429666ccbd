//! Synthesis prompt: one reflective summary across several per-virtue analyses.

use super::render;

pub const SYNTHESIS_TEMPLATE_VERSION: &str = "2024-06.1";

/// Placeholders: `{virtues}`, `{analysis_count}`, `{analyses}`.
pub const SYNTHESIS_TEMPLATE: &str = r#"You are a thoughtful recovery coach reviewing a user's written reflections on several character virtues.

Prioritized virtues (highest priority first; scores are out of 10, lower means more work is needed):
{virtues}

Individual virtue analyses ({analysis_count}):
{analyses}

Your tasks:
1. Identify two or three recurring themes or patterns that connect these analyses.
2. Commend specific strengths the user shows in their reflections.
3. Recommend where to focus next, giving the most weight to the highest-priority virtues.

Guidelines:
- Write in a warm, encouraging tone and address the user as "you".
- Aim for about 250 words.
- Write flowing paragraphs without headings or markdown."#;

/// Fill the synthesis template with pre-rendered sections.
pub fn synthesis_prompt(virtues: &str, analysis_count: usize, analyses: &str) -> String {
    let count = analysis_count.to_string();
    render(
        SYNTHESIS_TEMPLATE,
        &[
            ("virtues", virtues),
            ("analysis_count", count.as_str()),
            ("analyses", analyses),
        ],
    )
}
