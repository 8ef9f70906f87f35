use crate::color::Rgb;
use crate::dial::{ClickMode, DEFAULT_SEGMENTS, DialRenderModel, SegmentedDial};
use crate::error::{ClockError, Result, check_index};
use crate::geometry::Point;
use crate::input::MouseButton;
use crate::state::{DangerClockState, GroupState};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumString};

pub const MIN_DIALS: usize = 2;
pub const MAX_DIALS: usize = 6;
/// Cadence hosts are expected to call [`DialGroup::tick`] at.
pub const TICK_MS: u64 = 250;
/// Longest countdown a dial accepts, `99:59:59`.
pub const MAX_TIMER_SECS: u64 = 99 * 3600 + 59 * 60 + 59;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Racing,
    Linked,
}

impl GroupKind {
    fn click_mode(&self) -> ClickMode {
        match self {
            Self::Racing => ClickMode::Normal,
            Self::Linked => ClickMode::SerialNext,
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            Self::Racing => "Racing Clock",
            Self::Linked => "Linked Clocks",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupEvent {
    DialCompleted(usize),
    Stopped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialGroup {
    kind: GroupKind,
    title: String,
    notes: String,
    segment_count: usize,
    theme: Theme,
    dials: Vec<SegmentedDial>,
    timer_seconds: Vec<u64>,
    elapsed_ms: Vec<u64>,
    running: bool,
    show_overlay: bool,
    overlay_color: Rgb,
    beep_on_complete: bool,
}

impl DialGroup {
    pub fn new(kind: GroupKind, dial_count: usize) -> Result<Self> {
        if !(MIN_DIALS..=MAX_DIALS).contains(&dial_count) {
            return Err(ClockError::invalid(format!(
                "a group holds {MIN_DIALS} to {MAX_DIALS} dials, got {dial_count}"
            )));
        }
        let theme = Theme::default();
        let mut group = Self {
            kind,
            title: kind.default_title().to_string(),
            notes: String::new(),
            segment_count: DEFAULT_SEGMENTS,
            theme,
            dials: Vec::with_capacity(dial_count),
            timer_seconds: Vec::with_capacity(dial_count),
            elapsed_ms: Vec::with_capacity(dial_count),
            running: false,
            show_overlay: false,
            overlay_color: theme.default_fill(),
            beep_on_complete: false,
        };
        for _ in 0..dial_count {
            group.push_dial();
        }
        Ok(group)
    }

    fn push_dial(&mut self) {
        let title = format!("Clock {}", self.dials.len() + 1);
        let mut dial = SegmentedDial::default().with_title(title);
        self.conform(&mut dial);
        self.dials.push(dial);
        self.timer_seconds.push(0);
        self.elapsed_ms.push(0);
    }

    fn conform(&self, dial: &mut SegmentedDial) {
        // segment_count is never zero
        let _ = dial.set_segment_count(self.segment_count);
        dial.set_theme(self.theme);
        dial.set_click_mode(self.kind.click_mode());
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn dials(&self) -> &[SegmentedDial] {
        &self.dials
    }

    pub fn dial(&self, index: usize) -> Option<&SegmentedDial> {
        self.dials.get(index)
    }

    pub fn len(&self) -> usize {
        self.dials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dials.is_empty()
    }

    pub fn timer_seconds(&self) -> &[u64] {
        &self.timer_seconds
    }

    pub fn elapsed_ms(&self) -> &[u64] {
        &self.elapsed_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn show_overlay(&self) -> bool {
        self.show_overlay
    }

    pub fn overlay_color(&self) -> Rgb {
        self.overlay_color
    }

    pub fn beep_on_complete(&self) -> bool {
        self.beep_on_complete
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn set_show_overlay(&mut self, show: bool) {
        self.show_overlay = show;
    }

    pub fn set_overlay_color(&mut self, color: Rgb) {
        self.overlay_color = color;
    }

    pub fn set_beep_on_complete(&mut self, beep: bool) {
        self.beep_on_complete = beep;
    }

    /// Runs `f` against one dial, then restores the group's segment count and theme on it.
    pub fn update_dial<T>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut SegmentedDial) -> T,
    ) -> Result<T> {
        check_index(index, self.dials.len())?;
        let mut dial = std::mem::take(&mut self.dials[index]);
        let out = f(&mut dial);
        self.conform(&mut dial);
        self.dials[index] = dial;
        Ok(out)
    }

    pub fn add_dial(&mut self) -> bool {
        if self.dials.len() >= MAX_DIALS {
            return false;
        }
        self.push_dial();
        true
    }

    /// Drops the last dial. Returns false when already at the minimum.
    pub fn remove_dial(&mut self) -> bool {
        if self.dials.len() <= MIN_DIALS {
            return false;
        }
        self.dials.pop();
        self.timer_seconds.pop();
        self.elapsed_ms.pop();
        true
    }

    pub fn set_segment_count(&mut self, n: usize) -> Result<()> {
        if n < 1 {
            return Err(ClockError::invalid("a dial needs at least one segment"));
        }
        self.segment_count = n;
        self.dials
            .iter_mut()
            .try_for_each(|dial| dial.set_segment_count(n))
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.overlay_color = theme.adapt_default(self.overlay_color);
        self.dials.iter_mut().for_each(|dial| dial.set_theme(theme));
    }

    pub fn active_dial_index(&self) -> Option<usize> {
        self.dials.iter().position(|dial| !dial.is_complete())
    }

    pub fn all_complete(&self) -> bool {
        self.active_dial_index().is_none()
    }

    /// Sets a dial's countdown. Any change restarts every countdown from zero.
    pub fn configure_timer(&mut self, index: usize, seconds: u64) -> Result<()> {
        check_index(index, self.dials.len())?;
        if seconds > MAX_TIMER_SECS {
            return Err(ClockError::invalid(format!(
                "countdown of {seconds}s is longer than {}",
                format_countdown(MAX_TIMER_SECS)
            )));
        }
        self.timer_seconds[index] = seconds;
        self.elapsed_ms.fill(0);
        Ok(())
    }

    pub fn timers_in_use(&self) -> bool {
        self.timer_seconds.iter().any(|&s| s > 0)
    }

    pub fn validate_timers(&self) -> bool {
        !self.timers_in_use() || self.timer_seconds.iter().all(|&s| s > 0)
    }

    fn missing_timers(&self) -> Vec<usize> {
        self.timer_seconds
            .iter()
            .enumerate()
            .filter_map(|(i, &s)| (s == 0).then_some(i))
            .collect()
    }

    /// Starts (or resumes) the group. Returns `Ok(false)` without starting when every dial is
    /// already complete.
    pub fn start(&mut self) -> Result<bool> {
        if !self.validate_timers() {
            return Err(ClockError::IncompleteTimerConfiguration {
                missing: self.missing_timers(),
            });
        }
        if self.all_complete() {
            return Ok(false);
        }
        self.running = true;
        Ok(true)
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advances the active dial's countdown by `delta_ms`, filling segments in proportion to
    /// elapsed time. Manual-mode groups only use ticks to notice completion.
    pub fn tick(&mut self, delta_ms: u64) -> Vec<GroupEvent> {
        let mut events = Vec::new();
        if !self.running {
            return events;
        }
        let Some(idx) = self.active_dial_index() else {
            self.running = false;
            events.push(GroupEvent::Stopped);
            return events;
        };
        if !self.timers_in_use() {
            return events;
        }
        let total = self.timer_seconds[idx].saturating_mul(1000);
        if total == 0 {
            return events;
        }

        let elapsed = self.elapsed_ms[idx].saturating_add(delta_ms).min(total);
        self.elapsed_ms[idx] = elapsed;
        let segments = self.segment_count;
        let target = (u128::from(elapsed) * segments as u128 / u128::from(total)) as usize;
        self.dials[idx].set_fill_count(target.min(segments));

        if elapsed >= total {
            self.dials[idx].set_fill_count(segments);
            events.push(GroupEvent::DialCompleted(idx));
            if self.all_complete() {
                self.running = false;
                events.push(GroupEvent::Stopped);
            }
        }
        events
    }

    pub fn advance_active(&mut self) -> bool {
        match self.active_dial_index() {
            Some(idx) => self.dials[idx].increase(),
            None => false,
        }
    }

    /// Unfills the highest segment of the active dial, or of the last dial once all are full.
    pub fn retreat_active(&mut self) -> bool {
        let idx = self
            .active_dial_index()
            .unwrap_or(self.dials.len().saturating_sub(1));
        self.dials
            .get_mut(idx)
            .is_some_and(SegmentedDial::decrease)
    }

    pub fn reset_all(&mut self, clear_labels_and_timers: bool) {
        self.running = false;
        for dial in &mut self.dials {
            dial.reset_with_labels(clear_labels_and_timers);
        }
        if clear_labels_and_timers {
            self.timer_seconds.fill(0);
        }
        self.elapsed_ms.fill(0);
    }

    /// Routes a click on dial `index`. Racing dials take any click; linked groups only accept
    /// clicks on the active dial, and right clicks only in manual mode.
    pub fn click(
        &mut self,
        index: usize,
        point: Point,
        center: Point,
        radius: f64,
        button: MouseButton,
    ) -> Result<bool> {
        check_index(index, self.dials.len())?;
        let changed = match self.kind {
            GroupKind::Racing => self.dials[index].click(point, center, radius, button),
            GroupKind::Linked => {
                if self.active_dial_index() != Some(index)
                    || point.distance_squared(center) > radius * radius
                {
                    false
                } else {
                    match button {
                        MouseButton::Left => self.advance_active(),
                        MouseButton::Right if !self.timers_in_use() => self.retreat_active(),
                        MouseButton::Right => false,
                    }
                }
            }
        };
        Ok(changed)
    }

    pub fn remaining_ms(&self, index: usize) -> Option<u64> {
        let total = self.timer_seconds.get(index)?.saturating_mul(1000);
        Some(total.saturating_sub(self.elapsed_ms[index]))
    }

    pub fn overlay_text(&self, index: usize) -> Option<String> {
        if !self.show_overlay || !self.timers_in_use() {
            return None;
        }
        if *self.timer_seconds.get(index)? == 0 {
            return None;
        }
        self.remaining_ms(index)
            .map(|ms| format_countdown(ms / 1000))
    }

    pub fn render_dial(&self, index: usize, center: Point, radius: f64) -> Result<DialRenderModel> {
        check_index(index, self.dials.len())?;
        let model = self.dials[index].render_model(center, radius);
        Ok(match self.overlay_text(index) {
            Some(text) => model.with_overlay(text, self.overlay_color),
            None => model,
        })
    }

    pub fn to_state(&self) -> GroupState {
        let dials = self
            .dials
            .iter()
            .zip(&self.timer_seconds)
            .map(|(dial, &secs)| DangerClockState {
                timer_seconds: (self.kind == GroupKind::Linked).then_some(secs as i64),
                ..dial.to_state()
            })
            .collect();
        GroupState {
            title: self.title.clone(),
            segments: Some(self.segment_count as i64),
            inverted: self.theme.is_inverted(),
            notes: self.notes.clone(),
            show_overlay: self.show_overlay,
            beep_on_complete: self.beep_on_complete,
            overlay_color: Some(self.overlay_color),
            dials,
        }
    }

    /// Rebuilds a group. The group's segment count and theme win over per-dial values, the
    /// dial count is clamped into range, and countdowns restart from zero.
    pub fn from_state(kind: GroupKind, state: &GroupState) -> Self {
        let count = state.dials.len().clamp(MIN_DIALS, MAX_DIALS);
        let theme = Theme::from_inverted(state.inverted);
        let mut group = Self {
            kind,
            title: state.title.clone(),
            notes: state.notes.clone(),
            segment_count: state.segment_count(DEFAULT_SEGMENTS),
            theme,
            dials: Vec::with_capacity(count),
            timer_seconds: Vec::with_capacity(count),
            elapsed_ms: Vec::with_capacity(count),
            running: false,
            show_overlay: state.show_overlay,
            overlay_color: state
                .overlay_color
                .unwrap_or_else(|| theme.default_fill()),
            beep_on_complete: state.beep_on_complete,
        };
        for _ in 0..count {
            group.push_dial();
        }
        for (i, dial_state) in state.dials.iter().take(count).enumerate() {
            let mut dial = SegmentedDial::from_state(&DangerClockState {
                segments: Some(group.segment_count as i64),
                inverted: state.inverted,
                ..dial_state.clone()
            });
            group.conform(&mut dial);
            group.dials[i] = dial;
            if kind == GroupKind::Linked {
                group.timer_seconds[i] =
                    dial_state.timer_seconds.unwrap_or(0).clamp(0, MAX_TIMER_SECS as i64) as u64;
            }
        }
        group
    }
}

pub fn format_countdown(total_secs: u64) -> String {
    let (h, rem) = (total_secs / 3600, total_secs % 3600);
    format!("{:02}:{:02}:{:02}", h, rem / 60, rem % 60)
}

/// Parses `SS`, `MM:SS` or `HH:MM:SS` (extra leading fields are ignored). Blank means zero.
pub fn parse_countdown(text: &str) -> Result<u64> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }
    let parts = text
        .split(':')
        .map(|p| p.trim().parse::<u64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| ClockError::invalid(format!("bad countdown '{text}', expected HH:MM:SS")))?;
    let (h, m, s) = match parts.as_slice() {
        [s] => (0, 0, *s),
        [m, s] => (0, *m, *s),
        [.., h, m, s] => (*h, *m, *s),
        [] => (0, 0, 0),
    };
    h.checked_mul(3600)
        .zip(m.checked_mul(60))
        .and_then(|(h, m)| h.checked_add(m)?.checked_add(s))
        .ok_or_else(|| ClockError::invalid(format!("countdown '{text}' is too long")))
}
