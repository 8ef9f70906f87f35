use super::{DEFAULT_SEGMENTS, segment_span};
use crate::color::Rgb;
use crate::error::{ClockError, Result, check_index};
use crate::geometry::{Point, clockwise_from_top};
use crate::input::MouseButton;
use crate::state::DangerClockState;
use crate::theme::Theme;

/// How pointer clicks on the dial face are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickMode {
    /// Left fills the clicked wedge, right unfills it.
    #[default]
    Normal,
    /// Any left click fills the next segment.
    SerialNext,
    Disabled,
}

/// A circular clock of equal wedges, each filled or not.
///
/// `filled` and `labels` always have exactly `segment_count()` entries. Fill patterns may
/// contain holes: wedges can be addressed directly, while [`increase`](Self::increase) and
/// [`decrease`](Self::decrease) work from the lowest unfilled / highest filled wedge.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedDial {
    filled: Vec<bool>,
    labels: Vec<String>,
    show_labels: bool,
    fill_color: Rgb,
    theme: Theme,
    title: String,
    notes: String,
    click_mode: ClickMode,
}

impl Default for SegmentedDial {
    fn default() -> Self {
        Self::blank(DEFAULT_SEGMENTS, Theme::default())
    }
}

impl SegmentedDial {
    pub fn new(segment_count: usize, initial_filled: usize) -> Result<Self> {
        if segment_count < 1 {
            return Err(ClockError::invalid("a dial needs at least one segment"));
        }
        let mut dial = Self::blank(segment_count, Theme::default());
        dial.set_fill_count(initial_filled);
        Ok(dial)
    }

    fn blank(segment_count: usize, theme: Theme) -> Self {
        Self {
            filled: vec![false; segment_count],
            labels: vec![String::new(); segment_count],
            show_labels: false,
            fill_color: theme.default_fill(),
            theme,
            title: "Danger Clock".to_string(),
            notes: String::new(),
            click_mode: ClickMode::Normal,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.set_theme(theme);
        self
    }

    pub fn segment_count(&self) -> usize {
        self.filled.len()
    }

    pub fn filled(&self) -> &[bool] {
        &self.filled
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn show_labels(&self) -> bool {
        self.show_labels
    }

    pub fn fill_color(&self) -> Rgb {
        self.fill_color
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn click_mode(&self) -> ClickMode {
        self.click_mode
    }

    pub fn filled_count(&self) -> usize {
        self.filled.iter().filter(|&&f| f).count()
    }

    pub fn last_filled_index(&self) -> Option<usize> {
        self.filled.iter().rposition(|&f| f)
    }

    pub fn is_complete(&self) -> bool {
        self.filled.iter().all(|&f| f)
    }

    /// Resizes fill and label state, keeping values at surviving indices.
    pub fn set_segment_count(&mut self, n: usize) -> Result<()> {
        if n < 1 {
            return Err(ClockError::invalid("a dial needs at least one segment"));
        }
        self.filled.resize(n, false);
        self.labels.resize(n, String::new());
        Ok(())
    }

    pub fn fill_segment(&mut self, index: usize) -> Result<()> {
        self.set_segment(index, true)
    }

    pub fn unfill_segment(&mut self, index: usize) -> Result<()> {
        self.set_segment(index, false)
    }

    fn set_segment(&mut self, index: usize, value: bool) -> Result<()> {
        check_index(index, self.segment_count())?;
        self.filled[index] = value;
        Ok(())
    }

    /// Fills the lowest unfilled wedge. Returns false when already complete.
    pub fn increase(&mut self) -> bool {
        match self.filled.iter().position(|&f| !f) {
            Some(i) => {
                self.filled[i] = true;
                true
            }
            None => false,
        }
    }

    /// Unfills the highest filled wedge. Returns false when already empty.
    pub fn decrease(&mut self) -> bool {
        match self.last_filled_index() {
            Some(i) => {
                self.filled[i] = false;
                true
            }
            None => false,
        }
    }

    /// Replaces the pattern with `n` filled wedges from segment 0 onwards.
    pub fn set_fill_count(&mut self, n: usize) {
        let n = n.min(self.segment_count());
        self.filled
            .iter_mut()
            .enumerate()
            .for_each(|(i, f)| *f = i < n);
    }

    pub fn reset(&mut self) {
        self.filled.fill(false);
    }

    pub fn reset_with_labels(&mut self, clear_labels: bool) {
        if clear_labels {
            self.clear_labels();
        }
        self.reset();
    }

    pub fn set_label(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        check_index(index, self.segment_count())?;
        self.labels[index] = text.into();
        Ok(())
    }

    pub fn clear_labels(&mut self) {
        self.labels.iter_mut().for_each(String::clear);
    }

    pub fn set_show_labels(&mut self, show: bool) {
        self.show_labels = show;
    }

    pub fn set_fill_color(&mut self, color: Rgb) {
        self.fill_color = color;
    }

    /// Switching theme also swaps a fill that is still the previous theme's default.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.fill_color = theme.adapt_default(self.fill_color);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn set_click_mode(&mut self, mode: ClickMode) {
        self.click_mode = mode;
    }

    /// Maps a point to the wedge under it, or `None` outside the circle.
    pub fn hit_test(&self, point: Point, center: Point, radius: f64) -> Option<usize> {
        if point.distance_squared(center) > radius * radius {
            return None;
        }
        let count = self.segment_count();
        let idx = (clockwise_from_top(center, point) / segment_span(count)).floor() as usize;
        Some(idx.min(count - 1))
    }

    /// Applies a pointer click according to the click mode. Returns whether anything changed.
    pub fn click(
        &mut self,
        point: Point,
        center: Point,
        radius: f64,
        button: MouseButton,
    ) -> bool {
        match (self.click_mode, button) {
            (ClickMode::Normal, _) => {
                let Some(idx) = self.hit_test(point, center, radius) else {
                    return false;
                };
                let value = button == MouseButton::Left;
                let changed = self.filled[idx] != value;
                self.filled[idx] = value;
                changed
            }
            (ClickMode::SerialNext, MouseButton::Left) => self.increase(),
            _ => false,
        }
    }

    pub fn to_state(&self) -> DangerClockState {
        DangerClockState {
            title: self.title.clone(),
            segments: Some(self.segment_count() as i64),
            filled: Some(self.filled_count() as i64),
            filled_list: Some(self.filled.clone()),
            labels: self.labels.clone(),
            show_labels: self.show_labels,
            inverted: self.theme.is_inverted(),
            fill_color: Some(self.fill_color),
            notes: self.notes.clone(),
            timer_seconds: None,
        }
    }

    /// Restores a dial, clamping and padding whatever the snapshot got wrong.
    pub fn from_state(state: &DangerClockState) -> Self {
        let segments = state.segment_count(DEFAULT_SEGMENTS);
        let theme = Theme::from_inverted(state.inverted);
        let mut dial = Self::blank(segments, theme);
        dial.title = state.title.clone();
        dial.notes = state.notes.clone();
        dial.show_labels = state.show_labels;
        dial.fill_color = state.fill_color.unwrap_or_else(|| theme.default_fill());

        match &state.filled_list {
            Some(pattern) if !pattern.is_empty() => {
                dial.filled
                    .iter_mut()
                    .zip(pattern)
                    .for_each(|(slot, &v)| *slot = v);
            }
            _ => {
                let count = state.filled.unwrap_or(0).max(0) as usize;
                dial.set_fill_count(count);
            }
        }

        dial.labels
            .iter_mut()
            .zip(&state.labels)
            .for_each(|(slot, text)| slot.clone_from(text));
        dial
    }
}
