//! Fallback Responder: deterministic text used when every model candidate fails.
//!
//! Derived only from the request, never from partial model output.

use crate::request::{RecommendationRequest, SynthesisRequest, VirtueScore};

/// `modelUsed` sentinel for fallback text.
pub const FALLBACK_MODEL: &str = "fallback";

const TOP_VIRTUE_PLACEHOLDER: &str = "your top-priority virtue";
const NEXT_VIRTUE_PLACEHOLDER: &str = "your next virtue";

/// Names the top-priority virtue; wording depends on whether this is the first session.
pub fn recommendation_fallback(request: &RecommendationRequest) -> String {
    let virtue = priority_name(&request.prioritized_virtues, 0).unwrap_or(TOP_VIRTUE_PLACEHOLDER);
    if request.is_first_time {
        format!(
            "Welcome to your journey of growth. Begin with {virtue} in the Dismantling stage: \
             today, notice one moment where the opposite of {virtue} shows up in your life and \
             write it down without judgment. Small, honest observations are the foundation for \
             lasting change."
        )
    } else {
        format!(
            "Keep building on the progress you have made with {virtue}. Take a few minutes today \
             to reflect on where {virtue} showed up, or was missing, in your recent choices, and \
             choose one small, concrete action to practice before the day ends."
        )
    }
}

/// Names the top two priority virtues.
pub fn synthesis_fallback(request: &SynthesisRequest) -> String {
    let first = priority_name(&request.prioritized_virtues, 0).unwrap_or(TOP_VIRTUE_PLACEHOLDER);
    let second = priority_name(&request.prioritized_virtues, 1).unwrap_or(NEXT_VIRTUE_PLACEHOLDER);
    format!(
        "Your reflections show a sincere commitment to growth. Across your analyses, the clearest \
         opportunities lie with {first} and {second}. Keep your attention on these two virtues in \
         the coming days, notice the moments where they are tested, and acknowledge each step \
         forward. Honest self-examination like this is already a real strength."
    )
}

fn priority_name(virtues: &[VirtueScore], index: usize) -> Option<&str> {
    virtues
        .get(index)
        .map(|v| v.virtue.trim())
        .filter(|name| !name.is_empty())
}
