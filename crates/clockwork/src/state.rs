use crate::color::Rgb;
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, DefaultOnNull, VecSkipError, serde_as};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClockState {
    #[serde(rename = "danger")]
    Danger(DangerClockState),
    #[serde(rename = "racing")]
    Racing(GroupState),
    #[serde(rename = "linked")]
    Linked(GroupState),
    #[serde(rename = "tug_linear")]
    Tug(LinearTrackState),
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DangerClockState {
    #[serde_as(as = "DefaultOnError")]
    pub title: String,
    #[serde_as(as = "DefaultOnError")]
    pub segments: Option<i64>,
    /// Legacy contiguous fill count.
    #[serde_as(as = "DefaultOnError")]
    pub filled: Option<i64>,
    /// Exact fill pattern; preferred over `filled` when present.
    #[serde_as(as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filled_list: Option<Vec<bool>>,
    #[serde_as(as = "DefaultOnError<Vec<DefaultOnNull>>")]
    pub labels: Vec<String>,
    #[serde_as(as = "DefaultOnError")]
    pub show_labels: bool,
    #[serde_as(as = "DefaultOnError")]
    pub inverted: bool,
    #[serde_as(as = "DefaultOnError")]
    pub fill_color: Option<Rgb>,
    #[serde_as(as = "DefaultOnError")]
    pub notes: String,
    /// Only written for dials inside a linked group.
    #[serde_as(as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_seconds: Option<i64>,
}

impl DangerClockState {
    pub fn segment_count(&self, default: usize) -> usize {
        positive_count(self.segments, default)
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupState {
    #[serde_as(as = "DefaultOnError")]
    pub title: String,
    #[serde_as(as = "DefaultOnError")]
    pub segments: Option<i64>,
    #[serde_as(as = "DefaultOnError")]
    pub inverted: bool,
    #[serde_as(as = "DefaultOnError")]
    pub notes: String,
    #[serde_as(as = "DefaultOnError")]
    pub show_overlay: bool,
    #[serde_as(as = "DefaultOnError")]
    pub beep_on_complete: bool,
    #[serde_as(as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_color: Option<Rgb>,
    #[serde_as(as = "VecSkipError<_>")]
    pub dials: Vec<DangerClockState>,
}

impl GroupState {
    pub fn segment_count(&self, default: usize) -> usize {
        positive_count(self.segments, default)
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamState {
    #[serde_as(as = "DefaultOnError")]
    pub name: String,
    #[serde_as(as = "DefaultOnError")]
    pub color: Option<Rgb>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearTrackState {
    #[serde_as(as = "DefaultOnError")]
    pub title: String,
    #[serde_as(as = "DefaultOnError")]
    pub segments: Option<i64>,
    #[serde_as(as = "DefaultOnError")]
    pub inverted: bool,
    #[serde_as(as = "VecSkipError<_>")]
    pub teams: Vec<TeamState>,
    /// `-1` marks an unclaimed segment. One bad entry discards the whole list.
    #[serde_as(as = "DefaultOnError")]
    pub ownership: Vec<i64>,
    #[serde_as(as = "DefaultOnError<Vec<DefaultOnNull>>")]
    pub labels: Vec<String>,
    #[serde_as(as = "DefaultOnError")]
    pub notes: String,
}

impl LinearTrackState {
    pub fn segment_count(&self, default: usize) -> usize {
        positive_count(self.segments, default)
    }
}

fn positive_count(value: Option<i64>, default: usize) -> usize {
    value
        .map(|v| v.clamp(1, i64::from(u16::MAX)) as usize)
        .unwrap_or(default)
        .max(1)
}
