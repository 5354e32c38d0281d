use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStatus {
    Draft,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageTriggerType {
    OnEnter,
    WaitFor,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTriggerBody {
    /// Delay after the previous stage, as a duration string like `"1:00:00"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_for: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTrigger {
    pub trigger_type: StageTriggerType,
    pub trigger_body: Option<StageTriggerBody>,
}

impl StageTrigger {
    pub fn on_enter() -> Self {
        Self {
            trigger_type: StageTriggerType::OnEnter,
            trigger_body: None,
        }
    }

    pub fn wait_for(duration: impl Into<String>) -> Self {
        Self {
            trigger_type: StageTriggerType::WaitFor,
            trigger_body: Some(StageTriggerBody {
                wait_for: Some(duration.into()),
            }),
        }
    }

    pub fn wait_duration(&self) -> Option<&str> {
        self.trigger_body.as_ref()?.wait_for.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageActionType {
    ToggleFeature,
    ToggleFeatureForSegment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageActionBody {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageAction {
    pub id: i64,
    pub action_type: StageActionType,
    pub action_body: StageActionBody,
}

impl StageAction {
    /// The targeted segment, only for segment toggles.
    pub fn segment_id(&self) -> Option<i64> {
        match self.action_type {
            StageActionType::ToggleFeatureForSegment => self.action_body.segment_id,
            StageActionType::ToggleFeature => None,
        }
    }
}

/// One step of a release pipeline, bound to a single environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStage {
    pub id: i64,
    pub name: String,
    pub pipeline: i64,
    pub environment: i64,
    pub order: u32,
    pub trigger: StageTrigger,
    pub actions: Vec<StageAction>,
    pub features: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleasePipeline {
    pub id: i64,
    pub name: String,
    pub project: i64,
    pub description: String,
    pub stages_count: u32,
    pub published_at: Option<DateTime<Utc>>,
    pub published_by: Option<i64>,
    pub features_count: u32,
}

impl ReleasePipeline {
    pub fn status(&self) -> PipelineStatus {
        if self.published_at.is_some() {
            PipelineStatus::Active
        } else {
            PipelineStatus::Draft
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleReleasePipeline {
    #[serde(flatten)]
    pub pipeline: ReleasePipeline,
    pub stages: Vec<PipelineStage>,
    pub completed_features: Vec<i64>,
}

impl SingleReleasePipeline {
    pub fn ordered_stages(&self) -> Vec<&PipelineStage> {
        let mut stages: Vec<_> = self.stages.iter().collect();
        stages.sort_by_key(|stage| stage.order);
        stages
    }

    /// The stage a feature currently sits in, if any.
    pub fn stage_of(&self, feature: i64) -> Option<&PipelineStage> {
        self.stages
            .iter()
            .find(|stage| stage.features.contains(&feature))
    }
}
