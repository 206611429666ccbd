//! Context Builder: structured request → finalized prompt string.
//!
//! Pure and total. Missing optional data renders as placeholder text so the same request always
//! yields the same prompt.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::prompts::{recommendation_prompt, synthesis_prompt};
use crate::request::{RecommendationRequest, SynthesisRequest, VirtueAnalysis, VirtueScore};

/// Top of the virtue score scale.
pub const MAX_SCALE: f64 = 10.0;

pub const NO_ASSESSMENT: &str = "No assessment data available";
pub const NO_PROGRESS: &str = "No stage progress recorded yet.";
pub const NO_RECENT_UPDATE: &str = "No recent update provided.";
pub const NO_ANALYSES: &str = "No analyses provided.";

/// A finalized prompt. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec(String);

impl PromptSpec {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self(prompt.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PromptSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed three-stage sequence every virtue is worked through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Dismantling = 1,
    Building = 2,
    Practicing = 3,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Dismantling, Stage::Building, Stage::Practicing];

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Stage::Dismantling),
            2 => Some(Stage::Building),
            3 => Some(Stage::Practicing),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Dismantling => "Dismantling",
            Stage::Building => "Building",
            Stage::Practicing => "Practicing",
        }
    }
}

/// `MAX_SCALE - defect_intensity`, one decimal place.
pub fn display_score(defect_intensity: f64) -> String {
    format!("{:.1}", MAX_SCALE - defect_intensity)
}

/// Build the single-recommendation prompt.
pub fn build_recommendation_prompt(request: &RecommendationRequest) -> PromptSpec {
    let virtues = render_virtue_list(&request.prioritized_virtues);
    let progress = render_progress(&request.stage_progress, &request.prioritized_virtues);
    let recent_update = request
        .recent_update
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_RECENT_UPDATE);

    PromptSpec(recommendation_prompt(
        &virtues,
        &progress,
        recent_update,
        request.is_first_time,
    ))
}

/// Build the multi-analysis synthesis prompt.
pub fn build_synthesis_prompt(request: &SynthesisRequest) -> PromptSpec {
    let virtues = render_virtue_list(&request.prioritized_virtues);
    let analyses = render_analyses(&request.analyses);
    PromptSpec(synthesis_prompt(&virtues, request.analyses.len(), &analyses))
}

/// Ranked list in priority order: `1. Honesty: 2.0/10`.
pub fn render_virtue_list(virtues: &[VirtueScore]) -> String {
    if virtues.is_empty() {
        return NO_ASSESSMENT.to_string();
    }
    virtues
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let name = virtue_label(v);
            match v.defect_intensity {
                Some(intensity) if intensity.is_finite() => {
                    format!("{}. {}: {}/10", i + 1, name, display_score(intensity))
                }
                _ => format!("{}. {}: score unavailable", i + 1, name),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Narrative of the sparse `"<virtueId>-<stage>"` progress map, one line per virtue.
pub fn render_progress(progress: &BTreeMap<String, Value>, virtues: &[VirtueScore]) -> String {
    // (priority rank, entity id) -> recorded stages
    let mut grouped: BTreeMap<(usize, String), (String, Vec<(Stage, String)>)> = BTreeMap::new();

    for (key, value) in progress {
        let Some((entity, stage)) = parse_progress_key(key) else {
            tracing::debug!(key = %key, "[COACH] Skipping unrecognized stage progress key");
            continue;
        };
        let Some(status) = status_text(value) else {
            continue;
        };
        let (rank, name) = resolve_entity(entity, virtues);
        grouped
            .entry((rank, entity.to_string()))
            .or_insert_with(|| (name, Vec::new()))
            .1
            .push((stage, status));
    }

    if grouped.is_empty() {
        return NO_PROGRESS.to_string();
    }

    grouped
        .into_values()
        .map(|(name, mut stages)| {
            stages.sort_by_key(|(stage, _)| *stage);
            let recorded = stages
                .iter()
                .map(|(stage, status)| format!("{} ({})", stage.name(), status))
                .collect::<Vec<_>>()
                .join(", ");
            let current = Stage::ALL
                .iter()
                .find(|s| {
                    !stages
                        .iter()
                        .any(|(stage, status)| stage == *s && is_completed(status))
                })
                .map(|s| format!("Current stage: {}.", s.name()))
                .unwrap_or_else(|| "All stages completed.".to_string());
            format!("- {}: {}. {}", name, recorded, current)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_analyses(analyses: &[VirtueAnalysis]) -> String {
    if analyses.is_empty() {
        return NO_ANALYSES.to_string();
    }
    analyses
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let heading = match a.virtue.trim() {
                "" => format!("Analysis {}:", i + 1),
                v => format!("Analysis {} ({}):", i + 1, v),
            };
            let body = match a.analysis.trim() {
                "" => "(no analysis text)",
                text => text,
            };
            format!("{}\n{}", heading, body)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn virtue_label(v: &VirtueScore) -> &str {
    match v.virtue.trim() {
        "" => "Unnamed virtue",
        name => name,
    }
}

/// Split at the last `-` so ids like `self-control` keep their hyphen.
fn parse_progress_key(key: &str) -> Option<(&str, Stage)> {
    let (entity, stage) = key.trim().rsplit_once('-')?;
    if entity.is_empty() {
        return None;
    }
    let stage = Stage::from_number(stage.trim().parse().ok()?)?;
    Some((entity, stage))
}

fn resolve_entity(entity: &str, virtues: &[VirtueScore]) -> (usize, String) {
    virtues
        .iter()
        .position(|v| {
            v.id.as_deref() == Some(entity) || v.virtue.trim().eq_ignore_ascii_case(entity)
        })
        .map(|i| (i, virtue_label(&virtues[i]).to_string()))
        .unwrap_or_else(|| (usize::MAX, entity.to_string()))
}

fn status_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Bool(true) => Some("completed".to_string()),
        Value::Bool(false) => Some("not started".to_string()),
        other => Some(other.to_string()),
    }
}

fn is_completed(status: &str) -> bool {
    matches!(
        status.to_ascii_lowercase().as_str(),
        "completed" | "complete" | "done"
    )
}
