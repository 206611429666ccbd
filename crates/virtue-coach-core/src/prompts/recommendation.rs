//! Single-recommendation prompt: one short, actionable next step for today.

use super::render;

pub const RECOMMENDATION_TEMPLATE_VERSION: &str = "2024-06.1";

/// Placeholders: `{virtues}`, `{progress}`, `{recent_update}`, `{user_note}`.
pub const RECOMMENDATION_TEMPLATE: &str = r#"You are a supportive recovery coach helping someone grow in character virtues. Each virtue is worked through three stages in order: Dismantling (recognizing and letting go of the opposing defect), Building (deliberately developing the virtue), and Practicing (living the virtue consistently).

Prioritized virtues (highest priority first; scores are out of 10, lower means more work is needed):
{virtues}

Stage progress:
{progress}

Recent update from the user:
{recent_update}

{user_note}

Instructions:
1. Write in a warm, encouraging, non-judgmental tone and address the user as "you".
2. Keep the response under 150 words.
3. Focus on the highest-priority virtue, the one with the lowest score.
4. Respect stage order: Building starts only after Dismantling, and Practicing only after Building. Never suggest skipping a stage.
5. Recommend exactly one concrete, achievable action for today.
6. Refer to the recent update if one was provided.
7. Write plain prose without headings, lists, or markdown."#;

pub const FIRST_TIME_NOTE: &str = "This is the user's first session. Welcome them briefly and guide them to begin the Dismantling stage of their highest-priority virtue.";

pub const RETURNING_NOTE: &str = "This is a returning user. Acknowledge their progress so far and build on the stage they are currently working.";

/// Fill the recommendation template with pre-rendered sections.
pub fn recommendation_prompt(
    virtues: &str,
    progress: &str,
    recent_update: &str,
    is_first_time: bool,
) -> String {
    let user_note = if is_first_time {
        FIRST_TIME_NOTE
    } else {
        RETURNING_NOTE
    };
    render(
        RECOMMENDATION_TEMPLATE,
        &[
            ("virtues", virtues),
            ("progress", progress),
            ("recent_update", recent_update),
            ("user_note", user_note),
        ],
    )
}
