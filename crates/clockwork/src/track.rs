use crate::color::Rgb;
use crate::error::{ClockError, Result, check_index};
use crate::geometry::{Point, Rect};
use crate::input::MouseButton;
use crate::state::{LinearTrackState, TeamState};
use crate::theme::Theme;
use serde::Serialize;

pub const MIN_TEAMS: usize = 2;
pub const MAX_TEAMS: usize = 4;
pub const DEFAULT_TRACK_SEGMENTS: usize = 6;
pub const DEFAULT_TEAM_COLORS: [Rgb; 4] = [
    Rgb::new(0x2E, 0x86, 0xDE),
    Rgb::new(0xE7, 0x4C, 0x3C),
    Rgb::new(0x27, 0xAE, 0x60),
    Rgb::new(0xF1, 0xC4, 0x0F),
];

const DIVIDER_GUTTER_WIDTH: f64 = 8.0;
const DIVIDER_WIDTH: f64 = 2.0;
const BORDER_WIDTH: f64 = 3.0;
const LEGEND_OFFSET: f64 = 36.0;
const LEGEND_SWATCH: f64 = 18.0;

pub fn default_label(index: usize) -> String {
    format!("Objective {}", index + 1)
}

pub fn default_team_name(index: usize) -> String {
    format!("Team {}", index + 1)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub name: String,
    pub color: Rgb,
}

impl Team {
    pub fn default_for(index: usize) -> Self {
        Self {
            name: default_team_name(index),
            color: DEFAULT_TEAM_COLORS[index % DEFAULT_TEAM_COLORS.len()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TallyEntry {
    pub team: usize,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tally(pub Vec<TallyEntry>);

impl Tally {
    pub fn count(&self, team: usize) -> usize {
        self.0.get(team).map_or(0, |e| e.count)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearTrack {
    title: String,
    notes: String,
    theme: Theme,
    teams: Vec<Team>,
    /// `None` is unclaimed.
    ownership: Vec<Option<usize>>,
    labels: Vec<String>,
    tally_shown: bool,
}

impl Default for LinearTrack {
    fn default() -> Self {
        Self::blank(DEFAULT_TRACK_SEGMENTS, MIN_TEAMS)
    }
}

impl LinearTrack {
    pub fn new(segment_count: usize, team_count: usize) -> Result<Self> {
        if segment_count < 1 {
            return Err(ClockError::invalid("a track needs at least one segment"));
        }
        check_team_count(team_count)?;
        Ok(Self::blank(segment_count, team_count))
    }

    fn blank(segment_count: usize, team_count: usize) -> Self {
        Self {
            title: "Tug-of-War Clock".to_string(),
            notes: String::new(),
            theme: Theme::default(),
            teams: (0..team_count).map(Team::default_for).collect(),
            ownership: vec![None; segment_count],
            labels: (0..segment_count).map(default_label).collect(),
            tally_shown: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn ownership(&self) -> &[Option<usize>] {
        &self.ownership
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn segment_count(&self) -> usize {
        self.ownership.len()
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Keeps ownership and labels at surviving indices; new segments are unclaimed with
    /// positional labels.
    pub fn set_segment_count(&mut self, n: usize) -> Result<()> {
        if n < 1 {
            return Err(ClockError::invalid("a track needs at least one segment"));
        }
        self.ownership.resize(n, None);
        let len = self.labels.len();
        if n < len {
            self.labels.truncate(n);
        } else {
            self.labels.extend((len..n).map(default_label));
        }
        self.refresh_latch();
        Ok(())
    }

    /// Appends default teams or truncates; segments held by dropped teams become unclaimed.
    pub fn set_team_count(&mut self, n: usize) -> Result<()> {
        check_team_count(n)?;
        let len = self.teams.len();
        if n < len {
            self.teams.truncate(n);
        } else {
            self.teams.extend((len..n).map(Team::default_for));
        }
        for owner in &mut self.ownership {
            if owner.is_some_and(|t| t >= n) {
                *owner = None;
            }
        }
        self.refresh_latch();
        Ok(())
    }

    pub fn set_label(&mut self, index: usize, text: &str) -> Result<()> {
        check_index(index, self.segment_count())?;
        let text = text.trim();
        self.labels[index] = if text.is_empty() {
            default_label(index)
        } else {
            text.to_string()
        };
        Ok(())
    }

    /// Blank name restores `Team N`; `None` keeps the current color.
    pub fn set_team(&mut self, index: usize, name: &str, color: Option<Rgb>) -> Result<()> {
        check_index(index, self.team_count())?;
        let name = name.trim();
        let team = &mut self.teams[index];
        team.name = if name.is_empty() {
            default_team_name(index)
        } else {
            name.to_string()
        };
        if let Some(color) = color {
            team.color = color;
        }
        Ok(())
    }

    pub fn owner(&self, index: usize) -> Result<Option<usize>> {
        check_index(index, self.segment_count())?;
        Ok(self.ownership[index])
    }

    /// Unclaimed -> team 0 -> ... -> last team -> unclaimed.
    pub fn cycle_owner(&mut self, index: usize) -> Result<Option<usize>> {
        check_index(index, self.segment_count())?;
        let teams = self.team_count();
        let next = match self.ownership[index] {
            None => Some(0),
            Some(t) if t + 1 < teams => Some(t + 1),
            Some(_) => None,
        };
        self.ownership[index] = next;
        self.refresh_latch();
        Ok(next)
    }

    pub fn clear_owner(&mut self, index: usize) -> Result<()> {
        check_index(index, self.segment_count())?;
        self.ownership[index] = None;
        self.tally_shown = false;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.ownership.fill(None);
        self.tally_shown = false;
    }

    pub fn all_owned(&self) -> bool {
        self.ownership.iter().all(Option::is_some)
    }

    pub fn winner(&self) -> Option<usize> {
        let first = (*self.ownership.first()?)?;
        self.ownership
            .iter()
            .all(|&o| o == Some(first))
            .then_some(first)
    }

    pub fn tally(&self) -> Tally {
        let entries = self
            .teams
            .iter()
            .enumerate()
            .map(|(i, team)| TallyEntry {
                team: i,
                name: team.name.clone(),
                count: self.ownership.iter().filter(|&&o| o == Some(i)).count(),
            })
            .collect();
        Tally(entries)
    }

    /// Returns the tally once per continuous all-owned interval.
    pub fn take_tally(&mut self) -> Option<Tally> {
        if !self.all_owned() || self.tally_shown {
            return None;
        }
        self.tally_shown = true;
        Some(self.tally())
    }

    pub fn tally_shown(&self) -> bool {
        self.tally_shown
    }

    fn refresh_latch(&mut self) {
        if !self.all_owned() {
            self.tally_shown = false;
        }
    }

    pub fn hit_test(&self, point: Point, rect: Rect) -> Option<usize> {
        if !rect.contains(point) {
            return None;
        }
        let count = self.segment_count();
        let width = rect.width() / count as f64;
        if width <= 0.0 {
            return Some(0);
        }
        let idx = ((point.x - rect.left) / width).floor().max(0.0) as usize;
        Some(idx.min(count - 1))
    }

    pub fn click(&mut self, point: Point, rect: Rect, button: MouseButton) -> bool {
        let Some(idx) = self.hit_test(point, rect) else {
            return false;
        };
        match button {
            MouseButton::Left => self.cycle_owner(idx).is_ok(),
            MouseButton::Right => {
                let changed = self.ownership[idx].is_some();
                self.ownership[idx] = None;
                self.tally_shown = false;
                changed
            }
        }
    }

    /// Only owned segments with a custom label show their text.
    pub fn label_visible(&self, index: usize) -> bool {
        let (Some(owner), Some(label)) = (self.ownership.get(index), self.labels.get(index)) else {
            return false;
        };
        let label = label.trim();
        owner.is_some() && !label.is_empty() && label != default_label(index)
    }

    pub fn to_state(&self) -> LinearTrackState {
        LinearTrackState {
            title: self.title.clone(),
            segments: Some(self.segment_count() as i64),
            inverted: self.theme.is_inverted(),
            teams: self
                .teams
                .iter()
                .map(|t| TeamState {
                    name: t.name.clone(),
                    color: Some(t.color),
                })
                .collect(),
            ownership: self
                .ownership
                .iter()
                .map(|o| o.map_or(-1, |t| t as i64))
                .collect(),
            labels: self.labels.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Restores a track; owners that name no team become unclaimed and missing teams,
    /// labels or colors fall back to defaults.
    pub fn from_state(state: &LinearTrackState) -> Self {
        let segments = state.segment_count(DEFAULT_TRACK_SEGMENTS);
        let team_count = state.teams.len().clamp(MIN_TEAMS, MAX_TEAMS);
        let mut track = Self::blank(segments, team_count);
        track.title = state.title.clone();
        track.notes = state.notes.clone();
        track.theme = Theme::from_inverted(state.inverted);

        for (i, (team, saved)) in track.teams.iter_mut().zip(&state.teams).enumerate() {
            let name = saved.name.trim();
            team.name = if name.is_empty() {
                default_team_name(i)
            } else {
                name.to_string()
            };
            if let Some(color) = saved.color {
                team.color = color;
            }
        }
        for (slot, &owner) in track.ownership.iter_mut().zip(&state.ownership) {
            *slot = usize::try_from(owner).ok().filter(|&t| t < team_count);
        }
        for (i, (slot, text)) in track.labels.iter_mut().zip(&state.labels).enumerate() {
            let text = text.trim();
            if !text.is_empty() {
                *slot = text.to_string();
            } else {
                *slot = default_label(i);
            }
        }
        if state.ownership.len() > segments {
            log::debug!(
                "track '{}': dropped {} ownership entries beyond {} segments",
                track.title,
                state.ownership.len() - segments,
                segments
            );
        }
        track
    }

    pub fn render_model(&self, rect: Rect) -> TrackRenderModel {
        let colors = self.theme.colors();
        let count = self.segment_count();
        let width = rect.width() / count as f64;
        let x_at = |i: usize| rect.left + i as f64 * width;

        let segments = self
            .ownership
            .iter()
            .enumerate()
            .map(|(i, owner)| {
                let color = owner
                    .and_then(|t| self.teams.get(t))
                    .map_or(colors.background, |t| t.color);
                TrackSegment {
                    index: i,
                    rect: Rect::new(x_at(i), rect.top, x_at(i + 1), rect.bottom),
                    owner: *owner,
                    color,
                }
            })
            .collect::<Vec<_>>();

        let labels = segments
            .iter()
            .filter(|seg| self.label_visible(seg.index))
            .map(|seg| TrackLabel {
                index: seg.index,
                position: seg.rect.center(),
                text: self.labels[seg.index].clone(),
                color: seg.color.contrast_text(),
            })
            .collect();

        let dividers = (1..count)
            .map(|i| Divider {
                x: x_at(i),
                top: rect.top,
                bottom: rect.bottom,
                gutter_color: colors.background,
                gutter_width: DIVIDER_GUTTER_WIDTH,
                color: colors.foreground,
                width: DIVIDER_WIDTH,
            })
            .collect();

        let legend_y = rect.bottom + LEGEND_OFFSET;
        let mut x = 10.0;
        let legend = self
            .teams
            .iter()
            .map(|team| {
                let entry = LegendEntry {
                    swatch: Rect::new(x, legend_y - 10.0, x + LEGEND_SWATCH, legend_y + 10.0),
                    text_position: Point::new(x + LEGEND_SWATCH + 6.0, legend_y),
                    name: team.name.clone(),
                    color: team.color,
                };
                x += LEGEND_SWATCH + 6.0 + team.name.chars().count() as f64 * 8.0 + 12.0;
                entry
            })
            .collect();

        let banner = self.winner().and_then(|t| self.teams.get(t)).map(|team| Banner {
            position: rect.center(),
            text: format!("{} wins!", team.name),
            color: colors.foreground,
        });

        TrackRenderModel {
            title: self.title.clone(),
            background: colors.background,
            foreground: colors.foreground,
            track: rect,
            segments,
            dividers,
            border_width: BORDER_WIDTH,
            labels,
            legend,
            banner,
        }
    }
}

fn check_team_count(n: usize) -> Result<()> {
    if (MIN_TEAMS..=MAX_TEAMS).contains(&n) {
        Ok(())
    } else {
        Err(ClockError::invalid(format!(
            "a track has {MIN_TEAMS} to {MAX_TEAMS} teams, got {n}"
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSegment {
    pub index: usize,
    pub rect: Rect,
    pub owner: Option<usize>,
    pub color: Rgb,
}

/// A two-stroke separator: a wide background gutter under a thin foreground line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Divider {
    pub x: f64,
    pub top: f64,
    pub bottom: f64,
    pub gutter_color: Rgb,
    pub gutter_width: f64,
    pub color: Rgb,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackLabel {
    pub index: usize,
    pub position: Point,
    pub text: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub swatch: Rect,
    pub text_position: Point,
    pub name: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banner {
    pub position: Point,
    pub text: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRenderModel {
    pub title: String,
    pub background: Rgb,
    pub foreground: Rgb,
    pub track: Rect,
    pub segments: Vec<TrackSegment>,
    pub dividers: Vec<Divider>,
    pub border_width: f64,
    pub labels: Vec<TrackLabel>,
    pub legend: Vec<LegendEntry>,
    pub banner: Option<Banner>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect::new(0.0, 0.0, 400.0, 100.0)
    }

    #[test]
    fn test_new_defaults() {
        let track = LinearTrack::new(3, 4).unwrap();
        assert_eq!(track.labels(), &["Objective 1", "Objective 2", "Objective 3"]);
        assert_eq!(track.ownership(), &[None, None, None]);
        assert_eq!(track.teams()[3].name, "Team 4");
        assert_eq!(track.teams()[3].color.to_string(), "#F1C40F");
        assert!(LinearTrack::new(3, 1).is_err());
        assert!(LinearTrack::new(3, 5).is_err());
        assert!(LinearTrack::new(0, 2).is_err());
    }

    #[test]
    fn test_cycle_wraps_through_unclaimed() {
        let mut track = LinearTrack::new(1, 3).unwrap();
        let seq: Vec<_> = (0..5).map(|_| track.cycle_owner(0).unwrap()).collect();
        assert_eq!(seq, vec![Some(0), Some(1), Some(2), None, Some(0)]);
        assert!(track.cycle_owner(1).is_err());
    }

    #[test]
    fn test_winner_needs_single_owner() {
        let mut track = LinearTrack::new(2, 2).unwrap();
        assert_eq!(track.winner(), None);
        track.cycle_owner(0).unwrap();
        assert_eq!(track.winner(), None);
        track.cycle_owner(1).unwrap();
        assert_eq!(track.winner(), Some(0));
        track.cycle_owner(1).unwrap();
        assert_eq!(track.winner(), None);
        assert!(track.all_owned());
        let tally = track.tally();
        assert_eq!((tally.count(0), tally.count(1)), (1, 1));
    }

    #[test]
    fn test_tally_latch() {
        let mut track = LinearTrack::new(2, 2).unwrap();
        track.cycle_owner(0).unwrap();
        assert!(track.take_tally().is_none());
        track.cycle_owner(1).unwrap();
        let tally = track.take_tally().unwrap();
        assert_eq!(tally.count(0), 2);
        assert!(track.take_tally().is_none());

        // cycling 1 -> unclaimed leaves the all-owned interval
        track.cycle_owner(1).unwrap();
        track.cycle_owner(1).unwrap();
        assert!(track.take_tally().is_none());
        track.cycle_owner(1).unwrap();
        assert!(track.take_tally().is_some());
    }

    #[test]
    fn test_team_count_drops_owners() {
        let mut track = LinearTrack::new(3, 4).unwrap();
        for _ in 0..4 {
            track.cycle_owner(0).unwrap();
        }
        track.cycle_owner(1).unwrap();
        track.set_team_count(2).unwrap();
        assert_eq!(track.ownership(), &[None, Some(0), None]);
        track.set_team_count(3).unwrap();
        assert_eq!(track.teams()[2].name, "Team 3");
        assert!(track.set_team_count(5).is_err());
    }

    #[test]
    fn test_resize_pads_with_defaults() {
        let mut track = LinearTrack::new(2, 2).unwrap();
        track.set_label(1, "Bridge").unwrap();
        track.cycle_owner(1).unwrap();
        track.set_segment_count(1).unwrap();
        track.set_segment_count(3).unwrap();
        assert_eq!(track.labels(), &["Objective 1", "Objective 2", "Objective 3"]);
        assert_eq!(track.ownership(), &[None, None, None]);
    }

    #[test]
    fn test_shrinking_into_all_owned_allows_tally() {
        let mut track = LinearTrack::new(2, 2).unwrap();
        track.cycle_owner(0).unwrap();
        track.set_segment_count(1).unwrap();
        assert!(track.take_tally().is_some());
        track.set_segment_count(2).unwrap();
        assert!(!track.tally_shown());
    }

    #[test]
    fn test_blank_label_and_team_restore_defaults() {
        let mut track = LinearTrack::new(2, 2).unwrap();
        track.set_label(0, "  Gate ").unwrap();
        assert_eq!(track.labels()[0], "Gate");
        track.set_label(0, "   ").unwrap();
        assert_eq!(track.labels()[0], "Objective 1");
        track.set_team(1, "Ravens", Some(Rgb::black())).unwrap();
        assert_eq!(track.teams()[1].name, "Ravens");
        track.set_team(1, "", None).unwrap();
        assert_eq!(track.teams()[1].name, "Team 2");
        assert_eq!(track.teams()[1].color, Rgb::black());
        assert!(track.set_team(2, "x", None).is_err());
    }

    #[test]
    fn test_hit_test_linear() {
        let track = LinearTrack::new(4, 2).unwrap();
        assert_eq!(track.hit_test(Point::new(0.0, 50.0), rect()), Some(0));
        assert_eq!(track.hit_test(Point::new(150.0, 50.0), rect()), Some(1));
        assert_eq!(track.hit_test(Point::new(400.0, 50.0), rect()), Some(3));
        assert_eq!(track.hit_test(Point::new(401.0, 50.0), rect()), None);
        assert_eq!(track.hit_test(Point::new(50.0, -1.0), rect()), None);
    }

    #[test]
    fn test_click_buttons() {
        let mut track = LinearTrack::new(2, 2).unwrap();
        let p = Point::new(10.0, 10.0);
        assert!(track.click(p, rect(), MouseButton::Left));
        assert_eq!(track.owner(0).unwrap(), Some(0));
        assert!(track.click(p, rect(), MouseButton::Right));
        assert!(!track.click(p, rect(), MouseButton::Right));
        assert!(!track.click(Point::new(-5.0, 10.0), rect(), MouseButton::Left));
    }

    #[test]
    fn test_render_model() {
        let mut track = LinearTrack::new(2, 2).unwrap();
        track.set_label(0, "Gate").unwrap();
        track.cycle_owner(0).unwrap();
        let model = track.render_model(rect());
        assert_eq!(model.segments[0].color, DEFAULT_TEAM_COLORS[0]);
        assert_eq!(model.segments[1].color, Rgb::white());
        assert_eq!(model.segments[1].rect.left, 200.0);
        assert_eq!(model.dividers.len(), 1);
        assert_eq!(model.labels.len(), 1);
        assert_eq!(model.labels[0].text, "Gate");
        assert_eq!(model.legend.len(), 2);
        assert!(model.banner.is_none());

        track.cycle_owner(1).unwrap();
        let model = track.render_model(rect());
        assert_eq!(model.banner.unwrap().text, "Team 1 wins!");
    }

    #[test]
    fn test_state_restore_clamps() {
        let state = LinearTrackState {
            title: "Siege".into(),
            segments: Some(3),
            teams: vec![TeamState {
                name: "  ".into(),
                color: None,
            }],
            ownership: vec![0, 7, -1, 1],
            labels: vec!["Wall".into(), "".into()],
            ..Default::default()
        };
        let track = LinearTrack::from_state(&state);
        assert_eq!(track.team_count(), 2);
        assert_eq!(track.teams()[0].name, "Team 1");
        assert_eq!(track.ownership(), &[Some(0), None, None]);
        assert_eq!(track.labels(), &["Wall", "Objective 2", "Objective 3"]);
        assert_eq!(LinearTrack::from_state(&track.to_state()), track);
    }
}
