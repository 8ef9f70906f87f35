use crate::dial::SegmentedDial;
use crate::error::{ClockError, Result, check_index};
use crate::group::{DialGroup, GroupEvent, GroupKind};
use crate::state::{ClockState, GroupState};
use crate::theme::Theme;
use crate::track::LinearTrack;
use fs_err as fs;
use log::{debug, warn};
use serde_json::{Value, json};
use std::path::Path;
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum ClockKind {
    Danger,
    Racing,
    Linked,
    #[strum(to_string = "tug", serialize = "tug_linear", serialize = "tug-of-war")]
    Tug,
}

impl ClockKind {
    pub fn base_title(&self) -> &'static str {
        match self {
            Self::Danger => "Danger Clock",
            Self::Racing => GroupKind::Racing.default_title(),
            Self::Linked => GroupKind::Linked.default_title(),
            Self::Tug => "Tug-of-War Clock",
        }
    }

    /// Tag used in session files.
    pub fn state_tag(&self) -> &'static str {
        match self {
            Self::Danger => "danger",
            Self::Racing => "racing",
            Self::Linked => "linked",
            Self::Tug => "tug_linear",
        }
    }

    fn from_state_tag(tag: &str) -> Option<Self> {
        Self::iter().find(|kind| kind.state_tag() == tag)
    }
}

/// Any clock a session can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Clock {
    Dial(SegmentedDial),
    Group(DialGroup),
    Track(LinearTrack),
}

impl Clock {
    /// A fresh clock with default settings.
    pub fn new(kind: ClockKind) -> Self {
        match kind {
            ClockKind::Danger => Self::Dial(SegmentedDial::default()),
            ClockKind::Racing => Self::Group(default_group(GroupKind::Racing)),
            ClockKind::Linked => Self::Group(default_group(GroupKind::Linked)),
            ClockKind::Tug => Self::Track(LinearTrack::default()),
        }
    }

    pub fn kind(&self) -> ClockKind {
        match self {
            Self::Dial(_) => ClockKind::Danger,
            Self::Group(g) => match g.kind() {
                GroupKind::Racing => ClockKind::Racing,
                GroupKind::Linked => ClockKind::Linked,
            },
            Self::Track(_) => ClockKind::Tug,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Dial(d) => d.title(),
            Self::Group(g) => g.title(),
            Self::Track(t) => t.title(),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        match self {
            Self::Dial(d) => d.set_title(title),
            Self::Group(g) => g.set_title(title),
            Self::Track(t) => t.set_title(title),
        }
    }

    pub fn notes(&self) -> &str {
        match self {
            Self::Dial(d) => d.notes(),
            Self::Group(g) => g.notes(),
            Self::Track(t) => t.notes(),
        }
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        match self {
            Self::Dial(d) => d.set_notes(notes),
            Self::Group(g) => g.set_notes(notes),
            Self::Track(t) => t.set_notes(notes),
        }
    }

    pub fn theme(&self) -> Theme {
        match self {
            Self::Dial(d) => d.theme(),
            Self::Group(g) => g.theme(),
            Self::Track(t) => t.theme(),
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        match self {
            Self::Dial(d) => d.set_theme(theme),
            Self::Group(g) => g.set_theme(theme),
            Self::Track(t) => t.set_theme(theme),
        }
    }

    pub fn segment_count(&self) -> usize {
        match self {
            Self::Dial(d) => d.segment_count(),
            Self::Group(g) => g.segment_count(),
            Self::Track(t) => t.segment_count(),
        }
    }

    pub fn set_segment_count(&mut self, n: usize) -> Result<()> {
        match self {
            Self::Dial(d) => d.set_segment_count(n),
            Self::Group(g) => g.set_segment_count(n),
            Self::Track(t) => t.set_segment_count(n),
        }
    }

    pub fn to_state(&self) -> ClockState {
        match self {
            Self::Dial(d) => ClockState::Danger(d.to_state()),
            Self::Group(g) => match g.kind() {
                GroupKind::Racing => ClockState::Racing(g.to_state()),
                GroupKind::Linked => ClockState::Linked(g.to_state()),
            },
            Self::Track(t) => ClockState::Tug(t.to_state()),
        }
    }

    pub fn from_state(state: &ClockState) -> Self {
        match state {
            ClockState::Danger(s) => Self::Dial(SegmentedDial::from_state(s)),
            ClockState::Racing(s) => Self::Group(DialGroup::from_state(GroupKind::Racing, s)),
            ClockState::Linked(s) => Self::Group(DialGroup::from_state(GroupKind::Linked, s)),
            ClockState::Tug(s) => Self::Track(LinearTrack::from_state(s)),
        }
    }
}

fn default_group(kind: GroupKind) -> DialGroup {
    let mut group = DialGroup::from_state(kind, &GroupState::default());
    group.set_title(kind.default_title());
    group
}

/// The ordered set of open clocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub items: Vec<Clock>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Clock> {
        check_index(index, self.items.len())?;
        Ok(&self.items[index])
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Clock> {
        check_index(index, self.items.len())?;
        Ok(&mut self.items[index])
    }

    /// Adds a default clock, auto-numbering its title unless one is given. Returns its index.
    pub fn add(&mut self, kind: ClockKind, title: Option<&str>) -> usize {
        let mut clock = Clock::new(kind);
        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() && t != kind.base_title() => t.to_string(),
            _ => {
                let existing = self
                    .items
                    .iter()
                    .filter(|c| c.kind() == kind)
                    .map(Clock::title);
                next_numbered_title(existing, kind.base_title())
            }
        };
        clock.set_title(title);
        self.items.push(clock);
        self.items.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Result<Clock> {
        check_index(index, self.items.len())?;
        Ok(self.items.remove(index))
    }

    /// Advances every running group; events carry the item index.
    pub fn tick(&mut self, delta_ms: u64) -> Vec<(usize, GroupEvent)> {
        self.items
            .iter_mut()
            .enumerate()
            .filter_map(|(i, clock)| match clock {
                Clock::Group(g) if g.is_running() => Some((i, g.tick(delta_ms))),
                _ => None,
            })
            .flat_map(|(i, events)| events.into_iter().map(move |e| (i, e)))
            .collect()
    }

    pub fn any_running(&self) -> bool {
        self.items
            .iter()
            .any(|c| matches!(c, Clock::Group(g) if g.is_running()))
    }

    /// Parses `{"items": [...]}`, skipping items that cannot be understood.
    pub fn from_json(text: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(text)?;
        let Value::Object(mut doc) = doc else {
            return Err(ClockError::malformed("session must be a JSON object"));
        };
        let items = match doc.remove("items") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(ClockError::malformed("'items' must be a list")),
        };

        let mut session = Self::new();
        for (i, item) in items.into_iter().enumerate() {
            let tag = item.get("type").and_then(Value::as_str).map(str::to_owned);
            match tag.as_deref().and_then(ClockKind::from_state_tag) {
                None => {
                    warn!("Skipping session item {}: unknown type {:?}", i, tag);
                    continue;
                }
                Some(kind) => debug!("Restoring session item {} as {}", i, kind),
            }
            match serde_json::from_value::<ClockState>(item) {
                Ok(state) => session.items.push(Clock::from_state(&state)),
                Err(e) => warn!("Skipping session item {}: {}", i, e),
            }
        }
        Ok(session)
    }

    pub fn to_json(&self) -> Result<String> {
        let items = self
            .items
            .iter()
            .map(|c| serde_json::to_value(c.to_state()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(serde_json::to_string_pretty(&json!({ "items": items }))?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path.as_ref())?)
    }

    /// Writes the session unless it is empty. Returns whether a file was written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<bool> {
        if self.is_empty() {
            return Ok(false);
        }
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(true)
    }
}

/// `"{base} {n}"` with the smallest `n` not taken; a bare `base` counts as 1.
pub fn next_numbered_title<'a>(existing: impl IntoIterator<Item = &'a str>, base: &str) -> String {
    let used: Vec<u64> = existing
        .into_iter()
        .filter_map(|t| {
            let t = t.trim();
            if t == base {
                return Some(1);
            }
            t.strip_prefix(base)?
                .strip_prefix(' ')?
                .trim()
                .parse::<u64>()
                .ok()
        })
        .collect();
    let n = (1..).find(|n| !used.contains(n)).unwrap_or(1);
    format!("{base} {n}")
}
