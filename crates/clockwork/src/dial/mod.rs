pub mod model;
pub mod view;

pub use model::{ClickMode, SegmentedDial};
pub use view::{DialLabel, DialRenderModel, Overlay, Spoke, Wedge};

pub const DEFAULT_SEGMENTS: usize = 4;
/// Segment 0 starts at 12 o'clock.
pub const START_ANGLE: f64 = 90.0;
pub const LABEL_RADIUS_FACTOR: f64 = 0.6;
pub const CENTER_DOT_RADIUS: f64 = 3.0;
pub const BORDER_WIDTH: f64 = 3.0;
pub const WEDGE_OUTLINE_WIDTH: f64 = 2.0;
pub const OVERLAY_SIZE_FACTOR: f64 = 0.28;
pub const OVERLAY_MIN_SIZE: f64 = 12.0;

pub fn segment_span(segment_count: usize) -> f64 {
    360.0 / segment_count.max(1) as f64
}
