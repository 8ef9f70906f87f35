//! Toolkit-independent models for segmented progress clocks.
//!
//! Hosts feed pointer clicks and timer ticks in, and draw the render models that come out.
//! Every type here is single-threaded; a host that shares a [`Session`] across threads must
//! funnel calls through one owner.

pub mod color;
pub mod dial;
pub mod error;
pub mod geometry;
pub mod group;
pub mod input;
pub mod layout;
pub mod session;
pub mod state;
pub mod theme;
pub mod track;

pub use color::Rgb;
pub use dial::{ClickMode, DialRenderModel, SegmentedDial};
pub use error::{ClockError, Result};
pub use geometry::{Point, Rect};
pub use group::{DialGroup, GroupEvent, GroupKind, TICK_MS};
pub use input::MouseButton;
pub use layout::{DialLayout, TrackLayout};
pub use session::{Clock, ClockKind, Session, next_numbered_title};
pub use state::ClockState;
pub use theme::Theme;
pub use track::{LinearTrack, Tally, TrackRenderModel};
