//! Text commands shared by the control socket and the offline `apply` CLI.

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};
use clockwork::group::parse_countdown;
use clockwork::layout::group_cells;
use clockwork::{
    Clock, ClockError, ClockKind, DialGroup, DialLayout, GroupEvent, LinearTrack,
    MouseButton, Point, Rgb, SegmentedDial, Session, Tally, Theme, TrackLayout,
};
use serde_json::json;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Could not split command line: {0}")]
    Split(#[from] shell_words::ParseError),
    #[error("{0}")]
    Usage(#[from] clap::Error),
    #[error("Item {item} is a {kind} clock; '{command}' needs {expected}")]
    WrongKind {
        item: usize,
        kind: ClockKind,
        command: &'static str,
        expected: &'static str,
    },
    #[error("Item {item} is a group; pass --dial to pick one of its dials")]
    DialRequired { item: usize },
    #[error("Canvas {width}x{height} is too small to place a track")]
    NoRoom { width: f64, height: f64 },
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error("Render error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "progress-clocks", no_binary_name = true, disable_help_subcommand = true)]
struct CommandLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Add a clock (danger, racing, linked or tug).
    Add {
        kind: ClockKind,
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Remove a clock.
    Remove { item: usize },
    /// List clocks with their indices.
    List,
    /// Fill one segment.
    Fill {
        item: usize,
        segment: usize,
        #[arg(short, long)]
        dial: Option<usize>,
    },
    /// Unfill one segment.
    Unfill {
        item: usize,
        segment: usize,
        #[arg(short, long)]
        dial: Option<usize>,
    },
    /// Fill the next segment. Linked groups advance their active dial when no dial is given.
    Inc {
        item: usize,
        #[arg(short, long)]
        dial: Option<usize>,
    },
    /// Unfill the last filled segment.
    Dec {
        item: usize,
        #[arg(short, long)]
        dial: Option<usize>,
    },
    /// Clear fills (and countdowns), optionally labels too.
    Reset {
        item: usize,
        #[arg(long)]
        labels: bool,
    },
    /// Change the segment count.
    Segments { item: usize, count: usize },
    /// Switch between light and dark.
    Theme { item: usize, theme: Theme },
    /// Set a dial's fill color; without --dial a group recolors every dial.
    Color {
        item: usize,
        color: Rgb,
        #[arg(short, long)]
        dial: Option<usize>,
    },
    /// Set a segment label. Empty text clears it.
    Label {
        item: usize,
        segment: usize,
        #[arg(short, long)]
        dial: Option<usize>,
        #[arg(allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Show or hide dial labels.
    ShowLabels {
        item: usize,
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        show: bool,
        #[arg(short, long)]
        dial: Option<usize>,
    },
    Title {
        item: usize,
        #[arg(allow_hyphen_values = true)]
        text: Vec<String>,
    },
    Notes {
        item: usize,
        #[arg(allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Append a dial to a group.
    AddDial { item: usize },
    /// Drop a group's last dial.
    RemoveDial { item: usize },
    /// Set a linked dial's countdown (SS, MM:SS or HH:MM:SS; 0 clears it).
    Timer {
        item: usize,
        dial: usize,
        duration: String,
    },
    /// Show or hide the remaining-time overlay.
    Overlay {
        item: usize,
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        show: bool,
        #[arg(long)]
        color: Option<Rgb>,
    },
    /// Ring the bell when a timed dial completes.
    Beep {
        item: usize,
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        on: bool,
    },
    Start { item: usize },
    Stop { item: usize },
    /// Fill one segment of the active dial.
    Advance { item: usize },
    /// Pass a track segment to the next team.
    Cycle { item: usize, segment: usize },
    /// Unclaim a track segment.
    Clear { item: usize, segment: usize },
    /// Set the number of teams (2 to 4).
    Teams { item: usize, count: usize },
    /// Rename or recolor a team.
    Team {
        item: usize,
        index: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<Rgb>,
    },
    /// Click at canvas coordinates.
    Click {
        item: usize,
        x: f64,
        y: f64,
        #[arg(short, long, default_value = "left")]
        button: MouseButton,
    },
    /// Print the render model as JSON.
    Render {
        item: usize,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
    },
    /// Write the session file, remembering a new path for autosave.
    Save { path: Option<PathBuf> },
}

impl Command {
    pub fn from_words<I, T>(words: I) -> Result<Self, CommandError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(CommandLine::try_parse_from(words)?.command)
    }

    pub fn from_line(line: &str) -> Result<Self, CommandError> {
        let words = shell_words::split(line)?;
        if words.is_empty() {
            return Err(CommandError::Empty);
        }
        Self::from_words(words)
    }
}

/// Something the user should hear about.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    DialCompleted {
        item: usize,
        dial: usize,
        title: String,
        beep: bool,
    },
    GroupStopped {
        item: usize,
        title: String,
    },
    Tally {
        item: usize,
        title: String,
        tally: Tally,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DialCompleted {
                item, dial, title, ..
            } => write!(f, "[{item}] {title}: dial {} complete", dial + 1),
            Self::GroupStopped { item, title } => write!(f, "[{item}] {title}: all dials complete"),
            Self::Tally { item, title, tally } => {
                let counts = tally
                    .0
                    .iter()
                    .map(|e| format!("{}: {}", e.name, e.count))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{item}] {title}: all objectives owned ({counts})")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outcome {
    pub message: String,
    pub notices: Vec<Notice>,
}

impl Outcome {
    fn say(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            notices: Vec::new(),
        }
    }
}

/// A session plus everything commands need around it.
#[derive(Debug)]
pub struct Workspace {
    pub session: Session,
    pub session_path: PathBuf,
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Unsaved changes since the last load or save.
    pub dirty: bool,
}

impl Workspace {
    pub fn new(session: Session, session_path: PathBuf) -> Self {
        Self {
            session,
            session_path,
            canvas_width: 900.0,
            canvas_height: 650.0,
            dirty: false,
        }
    }

    pub fn with_canvas(mut self, width: f64, height: f64) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    pub fn execute(&mut self, line: &str) -> Result<Outcome, CommandError> {
        let command = Command::from_line(line)?;
        self.apply(command)
    }

    pub fn apply(&mut self, command: Command) -> Result<Outcome, CommandError> {
        let mutates = !matches!(
            command,
            Command::List | Command::Render { .. } | Command::Save { .. }
        );
        let outcome = self.dispatch(command)?;
        if mutates {
            self.dirty = true;
        }
        Ok(outcome)
    }

    fn dispatch(&mut self, command: Command) -> Result<Outcome, CommandError> {
        match command {
            Command::Add { kind, title } => {
                let idx = self.session.add(kind, title.as_deref());
                Ok(Outcome::say(format!(
                    "added {idx}: {}",
                    self.session.get(idx)?.title()
                )))
            }
            Command::Remove { item } => {
                let clock = self.session.remove(item)?;
                Ok(Outcome::say(format!("removed {item}: {}", clock.title())))
            }
            Command::List => Ok(Outcome::say(self.listing())),
            Command::Fill { item, segment, dial } => {
                self.with_dial(item, dial, "fill", |d| d.fill_segment(segment))?;
                Ok(Outcome::say(format!("filled segment {segment}")))
            }
            Command::Unfill { item, segment, dial } => {
                self.with_dial(item, dial, "unfill", |d| d.unfill_segment(segment))?;
                Ok(Outcome::say(format!("unfilled segment {segment}")))
            }
            Command::Inc { item, dial } => {
                let changed = if dial.is_none() && self.is_linked(item)? {
                    self.group(item, "inc")?.advance_active()
                } else {
                    self.with_dial(item, dial, "inc", |d| Ok(d.increase()))?
                };
                Ok(Outcome::say(if changed { "filled" } else { "already full" }))
            }
            Command::Dec { item, dial } => {
                let changed = if dial.is_none() && self.is_linked(item)? {
                    self.group(item, "dec")?.retreat_active()
                } else {
                    self.with_dial(item, dial, "dec", |d| Ok(d.decrease()))?
                };
                Ok(Outcome::say(if changed { "unfilled" } else { "already empty" }))
            }
            Command::Reset { item, labels } => {
                match self.session.get_mut(item)? {
                    Clock::Dial(d) => d.reset_with_labels(labels),
                    Clock::Group(g) => g.reset_all(labels),
                    Clock::Track(t) => {
                        t.reset();
                        if labels {
                            for i in 0..t.segment_count() {
                                t.set_label(i, "")?;
                            }
                        }
                    }
                }
                Ok(Outcome::say("reset"))
            }
            Command::Segments { item, count } => {
                self.session.get_mut(item)?.set_segment_count(count)?;
                let mut outcome = Outcome::say(format!("{count} segments"));
                self.collect_tally(item, &mut outcome);
                Ok(outcome)
            }
            Command::Theme { item, theme } => {
                self.session.get_mut(item)?.set_theme(theme);
                Ok(Outcome::say(format!("theme {theme}")))
            }
            Command::Color { item, color, dial } => {
                self.with_dials(item, dial, "color", |d| {
                    d.set_fill_color(color);
                    Ok(())
                })?;
                Ok(Outcome::say(format!("fill color {color}")))
            }
            Command::Label {
                item,
                segment,
                dial,
                text,
            } => {
                let text = text.join(" ");
                if self.session.get(item)?.kind() == ClockKind::Tug {
                    self.track(item, "label")?.set_label(segment, &text)?;
                } else {
                    self.with_dial(item, dial, "label", |d| d.set_label(segment, text.trim()))?;
                }
                Ok(Outcome::say(format!("labelled segment {segment}")))
            }
            Command::ShowLabels { item, show, dial } => {
                self.with_dials(item, dial, "show-labels", |d| {
                    d.set_show_labels(show);
                    Ok(())
                })?;
                Ok(Outcome::say(if show { "labels shown" } else { "labels hidden" }))
            }
            Command::Title { item, text } => {
                let title = text.join(" ");
                self.session.get_mut(item)?.set_title(title.trim());
                Ok(Outcome::say(format!("title '{}'", title.trim())))
            }
            Command::Notes { item, text } => {
                self.session.get_mut(item)?.set_notes(text.join(" "));
                Ok(Outcome::say("notes updated"))
            }
            Command::AddDial { item } => {
                let added = self.group(item, "add-dial")?.add_dial();
                Ok(Outcome::say(if added {
                    "dial added"
                } else {
                    "group is full"
                }))
            }
            Command::RemoveDial { item } => {
                let removed = self.group(item, "remove-dial")?.remove_dial();
                Ok(Outcome::say(if removed {
                    "dial removed"
                } else {
                    "group is at its minimum"
                }))
            }
            Command::Timer {
                item,
                dial,
                duration,
            } => {
                let secs = parse_countdown(&duration)?;
                let kind = self.session.get(item)?.kind();
                if kind != ClockKind::Linked {
                    return Err(wrong_kind(item, kind, "timer", "a linked group"));
                }
                self.group(item, "timer")?.configure_timer(dial, secs)?;
                Ok(Outcome::say(format!(
                    "dial {dial} countdown {}",
                    clockwork::group::format_countdown(secs)
                )))
            }
            Command::Overlay { item, show, color } => {
                let group = self.group(item, "overlay")?;
                group.set_show_overlay(show);
                if let Some(color) = color {
                    group.set_overlay_color(color);
                }
                Ok(Outcome::say(if show {
                    "overlay shown"
                } else {
                    "overlay hidden"
                }))
            }
            Command::Beep { item, on } => {
                self.group(item, "beep")?.set_beep_on_complete(on);
                Ok(Outcome::say(if on { "beep on" } else { "beep off" }))
            }
            Command::Start { item } => {
                let started = self.group(item, "start")?.start()?;
                Ok(Outcome::say(if started {
                    "started"
                } else {
                    "every dial is already complete"
                }))
            }
            Command::Stop { item } => {
                self.group(item, "stop")?.stop();
                Ok(Outcome::say("stopped"))
            }
            Command::Advance { item } => {
                let changed = self.group(item, "advance")?.advance_active();
                Ok(Outcome::say(if changed {
                    "advanced"
                } else {
                    "every dial is already complete"
                }))
            }
            Command::Cycle { item, segment } => {
                let track = self.track(item, "cycle")?;
                let owner = track.cycle_owner(segment)?;
                let name = owner_name(track, owner);
                let mut outcome = Outcome::say(format!("segment {segment}: {name}"));
                self.collect_tally(item, &mut outcome);
                Ok(outcome)
            }
            Command::Clear { item, segment } => {
                self.track(item, "clear")?.clear_owner(segment)?;
                Ok(Outcome::say(format!("segment {segment}: unclaimed")))
            }
            Command::Teams { item, count } => {
                self.track(item, "teams")?.set_team_count(count)?;
                let mut outcome = Outcome::say(format!("{count} teams"));
                self.collect_tally(item, &mut outcome);
                Ok(outcome)
            }
            Command::Team {
                item,
                index,
                name,
                color,
            } => {
                let track = self.track(item, "team")?;
                let current = track
                    .teams()
                    .get(index)
                    .map(|t| t.name.clone())
                    .unwrap_or_default();
                track.set_team(index, name.as_deref().unwrap_or(&current), color)?;
                Ok(Outcome::say(format!("team {index} updated")))
            }
            Command::Click { item, x, y, button } => self.click(item, Point::new(x, y), button),
            Command::Render {
                item,
                width,
                height,
            } => {
                let width = width.unwrap_or(self.canvas_width);
                let height = height.unwrap_or(self.canvas_height);
                Ok(Outcome::say(self.render(item, width, height)?))
            }
            Command::Save { path } => {
                if let Some(path) = path {
                    self.session_path = path;
                }
                let written = self.save()?;
                Ok(Outcome::say(if written {
                    format!("saved to {}", self.session_path.display())
                } else {
                    "nothing to save".to_string()
                }))
            }
        }
    }

    /// Writes the session to `session_path`. Returns whether anything was written.
    pub fn save(&mut self) -> Result<bool, CommandError> {
        let written = self.session.save(&self.session_path)?;
        self.dirty = false;
        Ok(written)
    }

    /// Advances running groups and turns their events into notices.
    pub fn tick(&mut self, delta_ms: u64) -> Vec<Notice> {
        if !self.session.any_running() {
            return Vec::new();
        }
        self.dirty = true;
        self.session
            .tick(delta_ms)
            .into_iter()
            .filter_map(|(item, event)| {
                let Ok(Clock::Group(group)) = self.session.get(item) else {
                    return None;
                };
                let title = group.title().to_string();
                Some(match event {
                    GroupEvent::DialCompleted(dial) => Notice::DialCompleted {
                        item,
                        dial,
                        title,
                        beep: group.beep_on_complete(),
                    },
                    GroupEvent::Stopped => Notice::GroupStopped { item, title },
                })
            })
            .collect()
    }

    fn collect_tally(&mut self, item: usize, outcome: &mut Outcome) {
        if let Ok(Clock::Track(track)) = self.session.get_mut(item)
            && let Some(tally) = track.take_tally()
        {
            outcome.notices.push(Notice::Tally {
                item,
                title: track.title().to_string(),
                tally,
            });
        }
    }

    fn is_linked(&self, item: usize) -> Result<bool, CommandError> {
        Ok(self.session.get(item)?.kind() == ClockKind::Linked)
    }

    fn group(&mut self, item: usize, command: &'static str) -> Result<&mut DialGroup, CommandError> {
        let kind = self.session.get(item)?.kind();
        match self.session.get_mut(item)? {
            Clock::Group(g) => Ok(g),
            _ => Err(wrong_kind(item, kind, command, "a racing or linked group")),
        }
    }

    fn track(&mut self, item: usize, command: &'static str) -> Result<&mut LinearTrack, CommandError> {
        let kind = self.session.get(item)?.kind();
        match self.session.get_mut(item)? {
            Clock::Track(t) => Ok(t),
            _ => Err(wrong_kind(item, kind, command, "a tug-of-war track")),
        }
    }

    /// Runs `f` on a standalone dial, or on dial `dial` of a group.
    fn with_dial<T>(
        &mut self,
        item: usize,
        dial: Option<usize>,
        command: &'static str,
        f: impl FnOnce(&mut SegmentedDial) -> clockwork::Result<T>,
    ) -> Result<T, CommandError> {
        let kind = self.session.get(item)?.kind();
        match (self.session.get_mut(item)?, dial) {
            (Clock::Dial(d), _) => Ok(f(d)?),
            (Clock::Group(g), Some(i)) => Ok(g.update_dial(i, f)??),
            (Clock::Group(_), None) => Err(CommandError::DialRequired { item }),
            (Clock::Track(_), _) => Err(wrong_kind(item, kind, command, "a dial or group")),
        }
    }

    /// Like [`with_dial`](Self::with_dial), but a group without `--dial` applies `f` to every dial.
    fn with_dials(
        &mut self,
        item: usize,
        dial: Option<usize>,
        command: &'static str,
        f: impl Fn(&mut SegmentedDial) -> clockwork::Result<()>,
    ) -> Result<(), CommandError> {
        if dial.is_none()
            && let Clock::Group(g) = self.session.get_mut(item)?
        {
            for i in 0..g.len() {
                g.update_dial(i, &f)??;
            }
            return Ok(());
        }
        self.with_dial(item, dial, command, f)
    }

    fn click(&mut self, item: usize, point: Point, button: MouseButton) -> Result<Outcome, CommandError> {
        let (width, height) = (self.canvas_width, self.canvas_height);
        let changed = match self.session.get_mut(item)? {
            Clock::Dial(d) => {
                let layout = DialLayout::fit(width, height);
                d.click(point, layout.center, layout.radius, button)
            }
            Clock::Group(g) => {
                let cells = group_cells(g.kind(), g.len(), width, height);
                match cells.iter().position(|c| c.contains(point)) {
                    Some(i) => {
                        let layout = DialLayout::fit_rect(cells[i]);
                        g.click(i, point, layout.center, layout.radius, button)?
                    }
                    None => false,
                }
            }
            Clock::Track(t) => {
                let rect = TrackLayout::fit(width, height)
                    .ok_or(CommandError::NoRoom { width, height })?;
                t.click(point, rect, button)
            }
        };
        let mut outcome = Outcome::say(if changed { "changed" } else { "no change" });
        self.collect_tally(item, &mut outcome);
        Ok(outcome)
    }

    fn render(&self, item: usize, width: f64, height: f64) -> Result<String, CommandError> {
        let clock = self.session.get(item)?;
        let value = match clock {
            Clock::Dial(d) => {
                let layout = DialLayout::fit(width, height);
                json!({
                    "kind": ClockKind::Danger.to_string(),
                    "layout": layout,
                    "dial": d.render_model(layout.center, layout.radius),
                })
            }
            Clock::Group(g) => {
                let dials = group_cells(g.kind(), g.len(), width, height)
                    .into_iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        let layout = DialLayout::fit_rect(cell);
                        let model = g.render_dial(i, layout.center, layout.radius)?;
                        Ok(json!({ "cell": cell, "layout": layout, "dial": model }))
                    })
                    .collect::<Result<Vec<_>, ClockError>>()?;
                json!({
                    "kind": clock.kind().to_string(),
                    "title": g.title(),
                    "running": g.is_running(),
                    "active": g.active_dial_index(),
                    "dials": dials,
                })
            }
            Clock::Track(t) => {
                let rect = TrackLayout::fit(width, height)
                    .ok_or(CommandError::NoRoom { width, height })?;
                json!({
                    "kind": ClockKind::Tug.to_string(),
                    "track": t.render_model(rect),
                })
            }
        };
        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn listing(&self) -> String {
        if self.session.is_empty() {
            return "no clocks".to_string();
        }
        self.session
            .items
            .iter()
            .enumerate()
            .map(|(i, clock)| format!("{i}: [{}] {} ({})", clock.kind(), clock.title(), summary(clock)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn wrong_kind(
    item: usize,
    kind: ClockKind,
    command: &'static str,
    expected: &'static str,
) -> CommandError {
    CommandError::WrongKind {
        item,
        kind,
        command,
        expected,
    }
}

fn owner_name(track: &LinearTrack, owner: Option<usize>) -> String {
    owner
        .and_then(|t| track.teams().get(t))
        .map_or_else(|| "unclaimed".to_string(), |t| t.name.clone())
}

fn summary(clock: &Clock) -> String {
    match clock {
        Clock::Dial(d) => format!("{}/{} filled", d.filled_count(), d.segment_count()),
        Clock::Group(g) => {
            let filled = g
                .dials()
                .iter()
                .map(|d| format!("{}/{}", d.filled_count(), d.segment_count()))
                .collect::<Vec<_>>()
                .join(" ");
            let state = if g.is_running() { "running" } else { "stopped" };
            format!("{filled}, {state}")
        }
        Clock::Track(t) => {
            let owned = t.ownership().iter().filter(|o| o.is_some()).count();
            match t.winner() {
                Some(w) => format!(
                    "{owned}/{} owned, {} wins",
                    t.segment_count(),
                    owner_name(t, Some(w))
                ),
                None => format!("{owned}/{} owned", t.segment_count()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> Workspace {
        Workspace::new(Session::new(), std::env::temp_dir().join("unused-session.json"))
    }

    #[test]
    fn test_parse_lines() {
        let cases = [
            (
                "add danger --title 'Night Watch'",
                Command::Add {
                    kind: ClockKind::Danger,
                    title: Some("Night Watch".into()),
                },
            ),
            (
                "show-labels 2 on",
                Command::ShowLabels {
                    item: 2,
                    show: true,
                    dial: None,
                },
            ),
            (
                "click 0 10 20 --button right",
                Command::Click {
                    item: 0,
                    x: 10.0,
                    y: 20.0,
                    button: MouseButton::Right,
                },
            ),
            (
                "color 1 '#ff0000' --dial 2",
                Command::Color {
                    item: 1,
                    color: Rgb::new(255, 0, 0),
                    dial: Some(2),
                },
            ),
        ];
        for (line, expected) in cases {
            assert_eq!(Command::from_line(line).unwrap(), expected, "{line}");
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Command::from_line("   "), Err(CommandError::Empty)));
        assert!(matches!(
            Command::from_line("title 0 'unterminated"),
            Err(CommandError::Split(_))
        ));
        assert!(matches!(
            Command::from_line("teleport 3"),
            Err(CommandError::Usage(_))
        ));
        assert!(matches!(
            Command::from_line("add sundial"),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn test_dial_commands() {
        let mut ws = workspace();
        ws.execute("add danger").unwrap();
        ws.execute("fill 0 2").unwrap();
        ws.execute("inc 0").unwrap();
        ws.execute("label 0 1 Guards arrive").unwrap();
        let Clock::Dial(d) = ws.session.get(0).unwrap() else {
            panic!("expected dial");
        };
        assert_eq!(d.filled(), &[true, false, true, false]);
        assert_eq!(d.labels()[1], "Guards arrive");
        assert!(ws.dirty);
        assert!(matches!(
            ws.execute("fill 0 9"),
            Err(CommandError::Clock(ClockError::IndexOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_group_needs_dial_index() {
        let mut ws = workspace();
        ws.execute("add racing").unwrap();
        assert!(matches!(
            ws.execute("fill 0 1"),
            Err(CommandError::DialRequired { item: 0 })
        ));
        ws.execute("fill 0 1 --dial 1").unwrap();
        ws.execute("color 0 white").unwrap();
        let Clock::Group(g) = ws.session.get(0).unwrap() else {
            panic!("expected group");
        };
        assert_eq!(g.dial(1).unwrap().filled_count(), 1);
        assert!(g.dials().iter().all(|d| d.fill_color() == Rgb::white()));
    }

    #[test]
    fn test_wrong_kind() {
        let mut ws = workspace();
        ws.execute("add tug").unwrap();
        let err = ws.execute("start 0").unwrap_err();
        assert!(matches!(
            err,
            CommandError::WrongKind {
                kind: ClockKind::Tug,
                ..
            }
        ));
        ws.execute("add racing").unwrap();
        assert!(matches!(
            ws.execute("timer 1 0 10"),
            Err(CommandError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_linked_timer_flow() {
        let mut ws = workspace();
        ws.execute("add linked").unwrap();
        ws.execute("beep 0 on").unwrap();
        ws.execute("timer 0 0 1").unwrap();
        let err = ws.execute("start 0").unwrap_err();
        assert!(matches!(
            err,
            CommandError::Clock(ClockError::IncompleteTimerConfiguration { .. })
        ));
        ws.execute("timer 0 1 00:01").unwrap();
        ws.execute("start 0").unwrap();

        let notices = ws.tick(1000);
        assert_eq!(notices.len(), 1);
        assert!(matches!(
            notices[0],
            Notice::DialCompleted {
                dial: 0,
                beep: true,
                ..
            }
        ));
        let notices = ws.tick(1000);
        assert!(matches!(notices[1], Notice::GroupStopped { item: 0, .. }));
        assert!(ws.tick(1000).is_empty());
    }

    #[test]
    fn test_oversized_timer_is_rejected() {
        let mut ws = workspace();
        ws.execute("add linked").unwrap();
        for line in ["timer 0 0 9999999999999999:00:00", "timer 0 1 9223372036854775808"] {
            assert!(matches!(
                ws.execute(line),
                Err(CommandError::Clock(ClockError::InvalidArgument(_)))
            ));
        }
        ws.execute("timer 0 0 99:59:59").unwrap();
    }

    #[test]
    fn test_track_tally_notice() {
        let mut ws = workspace();
        ws.execute("add tug").unwrap();
        ws.execute("segments 0 2").unwrap();
        let first = ws.execute("cycle 0 0").unwrap();
        assert!(first.notices.is_empty());
        let second = ws.execute("cycle 0 1").unwrap();
        assert_eq!(second.message, "segment 1: Team 1");
        assert!(matches!(second.notices[0], Notice::Tally { .. }));
        assert!(second.notices[0].to_string().contains("Team 1: 2"));
        ws.execute("team 0 1 --name Ravens").unwrap();
        assert_eq!(ws.execute("cycle 0 1").unwrap().message, "segment 1: Ravens");
    }

    #[test]
    fn test_click_uses_canvas_layout() {
        let mut ws = workspace();
        ws.execute("add danger").unwrap();
        // default canvas: center (450, 353), radius 281; upper right quadrant
        ws.execute("click 0 550 250").unwrap();
        ws.execute("add tug").unwrap();
        ws.execute("click 1 20 100").unwrap();
        let Clock::Dial(d) = ws.session.get(0).unwrap() else {
            panic!("expected dial");
        };
        assert_eq!(d.filled(), &[true, false, false, false]);
        let Clock::Track(t) = ws.session.get(1).unwrap() else {
            panic!("expected track");
        };
        assert_eq!(t.ownership()[0], Some(0));
    }

    #[test]
    fn test_render_and_list() {
        let mut ws = workspace();
        ws.execute("add linked").unwrap();
        ws.execute("add tug").unwrap();
        let out = ws.execute("render 0").unwrap().message;
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["kind"], "linked");
        assert_eq!(value["dials"].as_array().unwrap().len(), 2);
        assert_eq!(value["active"], 0);
        assert!(matches!(
            ws.execute("render 1 --height 100"),
            Err(CommandError::NoRoom { .. })
        ));

        let listing = ws.execute("list").unwrap().message;
        assert_eq!(
            listing,
            "0: [linked] Linked Clocks 1 (0/4 0/4, stopped)\n1: [tug] Tug-of-War Clock 1 (0/6 owned)"
        );
    }

    #[test]
    fn test_save_remembers_path() {
        let dir = std::env::temp_dir().join(format!("progress-clocks-cmd-{}", std::process::id()));
        let path = dir.join("saved.json");
        let mut ws = workspace();
        assert_eq!(ws.execute("save").unwrap().message, "nothing to save");
        ws.execute("add danger").unwrap();
        let line = format!("save {}", shell_words::quote(&path.to_string_lossy()));
        ws.execute(&line).unwrap();
        assert_eq!(ws.session_path, path);
        assert!(!ws.dirty);
        assert_eq!(Session::load(&path).unwrap().len(), 1);
        let _ = std::fs::remove_dir_all(dir);
    }
}
