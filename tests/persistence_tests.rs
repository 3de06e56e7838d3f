//! Saving and loading transcripts through the session

mod common;

use common::{temp_path, turn, Behavior, Rig};
use murmur::messages::{persistence, Speaker};
use murmur::session::{NullSurface, SessionState, VoiceSettings};
use murmur::MurmurError;
use std::fs;

#[test]
fn test_save_then_load_preserves_turns() {
    let path = temp_path("round-trip");
    let mut rig = Rig::new();
    rig.session.append_status("Voice Chatbot Started!");
    rig.orchestrator.submit_text("hello").unwrap();
    rig.set_model(Behavior::reply("line one\nline two"));
    rig.orchestrator.submit_text("tell me more").unwrap();
    let before = rig.turns();

    rig.session.save_transcript(&path).unwrap();

    let mut restored = SessionState::new(VoiceSettings::default(), Box::new(NullSurface));
    let count = restored.load_transcript(&path).unwrap();

    let after = restored.transcript().turns();
    assert_eq!(count, before.len());
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(
        after[before.len()],
        turn(
            Speaker::System,
            &format!("Chat history loaded from: {}", path.display())
        )
    );
    assert_eq!(after[4], turn(Speaker::Assistant, "line one\nline two"));

    let _ = fs::remove_file(&path);
}

#[test]
fn test_saved_log_is_one_line_per_message() {
    let path = temp_path("format");
    let mut rig = Rig::new();
    rig.set_model(Behavior::reply("first\nsecond"));
    rig.orchestrator.submit_text("hello").unwrap();
    rig.session.poll_events();

    rig.session.save_transcript(&path).unwrap();

    let log = fs::read_to_string(&path).unwrap();
    assert_eq!(log, "You: hello\nChatbot: first\\nsecond\n");

    let _ = fs::remove_file(&path);
}

#[test]
fn test_save_reports_location() {
    let path = temp_path("status");
    let mut rig = Rig::new();
    rig.orchestrator.submit_text("hello").unwrap();

    rig.session.save_transcript(&path).unwrap();

    assert_eq!(
        rig.turns().last().cloned(),
        Some(turn(
            Speaker::System,
            &format!("Chat history saved to: {}", path.display())
        ))
    );

    let _ = fs::remove_file(&path);
}

#[test]
fn test_load_missing_file_keeps_transcript() {
    let path = temp_path("missing");
    let mut rig = Rig::new();
    rig.orchestrator.submit_text("hello").unwrap();
    let before = rig.turns();

    let result = rig.session.load_transcript(&path);

    assert!(matches!(result, Err(MurmurError::PersistenceError(_))));
    let after = rig.turns();
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(after.len(), before.len() + 1);
    let (speaker, text) = &after[before.len()];
    assert_eq!(*speaker, Speaker::System);
    assert!(text.starts_with("Error loading chat history: "));
}

#[test]
fn test_save_into_unwritable_location_reports_error() {
    let blocker = temp_path("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let path = blocker.join("chat_history.txt");
    let mut rig = Rig::new();
    rig.orchestrator.submit_text("hello").unwrap();

    let result = rig.session.save_transcript(&path);

    assert!(result.is_err());
    let (speaker, text) = rig.turns().last().cloned().unwrap();
    assert_eq!(speaker, Speaker::System);
    assert!(text.starts_with("Error saving chat history: "));

    let _ = fs::remove_file(&blocker);
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = std::env::temp_dir().join(format!("murmur-nested-{}", uuid::Uuid::new_v4()));
    let path = dir.join("logs").join("chat_history.txt");

    persistence::save(&path, &[]).unwrap();

    assert!(path.exists());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_load_tolerates_foreign_lines() {
    let path = temp_path("foreign");
    fs::write(
        &path,
        "You: hi\n\nsomething odd\nChatbot:hello\nSystem: Chat history cleared.\n",
    )
    .unwrap();

    let messages = persistence::load(&path).unwrap();
    let turns: Vec<_> = messages
        .iter()
        .map(|m| (m.speaker, m.text.clone()))
        .collect();

    assert_eq!(
        turns,
        vec![
            turn(Speaker::User, "hi"),
            turn(Speaker::System, "something odd"),
            turn(Speaker::Assistant, "hello"),
            turn(Speaker::System, "Chat history cleared."),
        ]
    );

    let _ = fs::remove_file(&path);
}
