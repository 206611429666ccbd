//! Prompt templates for the recommendation and synthesis endpoints.
//!
//! Templates are versioned constants. Instruction wording and order drive generation quality,
//! so bump the version constant whenever a template changes.

pub mod recommendation;
pub mod synthesis;

pub use recommendation::{
    recommendation_prompt, FIRST_TIME_NOTE, RECOMMENDATION_TEMPLATE,
    RECOMMENDATION_TEMPLATE_VERSION, RETURNING_NOTE,
};
pub use synthesis::{synthesis_prompt, SYNTHESIS_TEMPLATE, SYNTHESIS_TEMPLATE_VERSION};

/// Single-pass `{placeholder}` substitution. Substituted values are never re-scanned, so user
/// text containing braces cannot inject into other slots. Unknown placeholders stay verbatim.
pub(crate) fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let hit = after.find('}').and_then(|end| {
            let key = &after[..end];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (end, *v))
        });
        match hit {
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
