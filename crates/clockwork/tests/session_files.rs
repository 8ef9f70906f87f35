use clockwork::{Clock, ClockKind, LinearTrack, Session, Theme};
use std::path::PathBuf;

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("clockwork-test-{}", std::process::id()))
        .join(name)
}

#[test]
fn save_and_load_mixed_session() {
    let mut session = Session::new();
    let dial = session.add(ClockKind::Danger, None);
    let track = session.add(ClockKind::Tug, None);
    session.add(ClockKind::Racing, Some("Heist"));

    session.get_mut(dial).unwrap().set_theme(Theme::Dark);
    if let Clock::Track(t) = session.get_mut(track).unwrap() {
        t.set_team_count(3).unwrap();
        t.cycle_owner(2).unwrap();
    }

    let path = scratch_path("mixed/session.json");
    assert!(session.save(&path).unwrap());
    let loaded = Session::load(&path).unwrap();
    assert_eq!(loaded, session);
    assert_eq!(loaded.get(2).unwrap().title(), "Heist");

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn empty_session_is_not_written() {
    let path = scratch_path("empty/session.json");
    assert!(!Session::new().save(&path).unwrap());
    assert!(!path.exists());
}

#[test]
fn missing_file_is_io_error() {
    let err = Session::load(scratch_path("nope/session.json")).unwrap_err();
    assert!(matches!(err, clockwork::ClockError::Io(_)));
}

#[test]
fn legacy_session_restores_with_defaults() {
    let json = r##"{
      "items": [
        {"type": "danger", "title": "Old", "segments": 8, "filled": 3, "inverted": true},
        {"type": "linked", "title": "Chain", "segments": 4,
         "dials": [{"title": "a", "timer_seconds": 30}, {"title": "b", "timer_seconds": 30}]},
        {"type": "tug_linear", "title": "Rope", "segments": 2,
         "teams": [{"name": "Red", "color": "#E74C3C"}, {"name": "Blue"}],
         "ownership": [1, -1]}
      ]
    }"##;
    let session = Session::from_json(json).unwrap();
    assert_eq!(session.len(), 3);

    let Clock::Dial(dial) = session.get(0).unwrap() else {
        panic!("expected dial");
    };
    assert_eq!(dial.filled_count(), 3);
    assert_eq!(dial.fill_color().to_string(), "#FFFFFF");

    let Clock::Group(group) = session.get(1).unwrap() else {
        panic!("expected group");
    };
    assert_eq!(group.timer_seconds(), &[30, 30]);
    assert!(group.validate_timers());

    let Clock::Track(track) = session.get(2).unwrap() else {
        panic!("expected track");
    };
    assert_eq!(track.ownership(), &[Some(1), None]);
    assert_eq!(track.teams()[1].color, LinearTrack::default().teams()[1].color);
}
