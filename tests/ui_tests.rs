//! UI automation tests using egui_kittest and AccessKit
//!
//! The window is driven through its accessibility tree against a session
//! wired to fake providers.

mod common;

use common::{temp_path, turn, Behavior, Rig};
use egui_kittest::kittest::Queryable;
use egui_kittest::Harness;
use murmur::messages::Speaker;
use murmur::speech::VoiceInfo;
use murmur::ui::{MurmurApp, UiState};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// App wired to fakes; returns the rig's providers for inspection
fn test_app(rig: Rig, transcript_path: PathBuf) -> (MurmurApp, common::FakeHandles) {
    let Rig {
        session,
        orchestrator,
        audio,
        transcriber,
        model,
        synthesizer,
    } = rig;
    let voices = vec![
        VoiceInfo::new("alloy", "Alloy"),
        VoiceInfo::new("nova", "Nova"),
    ];
    let state = UiState::new(session, orchestrator, voices, transcript_path);
    let handles = common::FakeHandles {
        audio,
        transcriber,
        model,
        synthesizer,
    };
    (MurmurApp::from_state(state), handles)
}

fn harness(app: MurmurApp) -> Harness<'static, MurmurApp> {
    Harness::builder()
        .with_size(egui::Vec2::new(720.0, 560.0))
        .build_state(|ctx, app: &mut MurmurApp| app.show(ctx), app)
}

fn turns(harness: &Harness<'_, MurmurApp>) -> Vec<(Speaker, String)> {
    harness.state().state().session.transcript().turns()
}

#[test]
fn test_controls_are_accessible() {
    let (app, _fakes) = test_app(Rig::new(), temp_path("ui-controls"));
    let mut harness = harness(app);
    harness.run();

    let _input = harness.get_by_label("Message input");
    let _send = harness.get_by_label("Send message");
    let _voice = harness.get_by_label("Voice input");
    let _mute = harness.get_by_label("Mute speech");
    let _clear = harness.get_by_label("Clear chat");
    let _save = harness.get_by_label("Save chat");
    let _load = harness.get_by_label("Load chat");
    let _path = harness.get_by_label("Transcript path");
}

#[test]
fn test_greeting_is_shown() {
    let (mut app, _fakes) = test_app(Rig::new(), temp_path("ui-greeting"));
    app.state_mut().greet();
    let mut harness = harness(app);
    harness.run();

    let _started = harness.get_by_label("Status: Voice Chatbot Started!");
    let _prompt = harness.get_by_label("Status: How can I help you today?");
}

#[test]
fn test_typed_message_gets_reply() {
    let (app, fakes) = test_app(Rig::new(), temp_path("ui-typed"));
    let mut harness = harness(app);
    harness.run();

    harness.get_by_label("Message input").focus();
    harness.run();
    harness.get_by_label("Message input").type_text("hello");
    harness.run();
    assert_eq!(harness.state().state().input_text, "hello");

    harness.get_by_label("Send message").click();
    harness.run();

    assert_eq!(
        turns(&harness),
        vec![turn(Speaker::User, "hello"), turn(Speaker::Assistant, "hi there")]
    );
    assert!(harness.state().state().input_text.is_empty());
    assert_eq!(fakes.synthesizer.calls(), 1);

    let _user = harness.get_by_label("User message: hello");
    let _reply = harness.get_by_label("Assistant response: hi there");
}

#[test]
fn test_cannot_send_empty_message() {
    let (app, fakes) = test_app(Rig::new(), temp_path("ui-empty"));
    let mut harness = harness(app);
    harness.run();

    harness.get_by_label("Send message").click();
    harness.run();

    assert!(turns(&harness).is_empty());
    assert_eq!(fakes.model.calls(), 0);
}

#[test]
fn test_model_failure_shows_apology() {
    let rig = Rig::new();
    rig.set_model(Behavior::Fail(murmur::MurmurError::ModelError(
        "connection refused".into(),
    )));
    let (mut app, _fakes) = test_app(rig, temp_path("ui-apology"));
    app.state_mut().input_text = "hello".into();
    let mut harness = harness(app);
    harness.run();

    harness.get_by_label("Send message").click();
    harness.run();

    let _apology = harness.get_by_label("Assistant response: Sorry, I had trouble responding.");
}

#[test]
fn test_mute_button_toggles() {
    let (mut app, fakes) = test_app(Rig::new(), temp_path("ui-mute"));
    app.state_mut().input_text = "hello".into();
    let mut harness = harness(app);
    harness.run();

    harness.get_by_label("Mute speech").click();
    harness.run();
    assert!(harness.state().state().session.voice_settings().muted);
    let _unmute = harness.get_by_label("Unmute speech");

    harness.get_by_label("Send message").click();
    harness.run();
    assert_eq!(fakes.synthesizer.calls(), 0);
    assert_eq!(turns(&harness).len(), 2);

    harness.get_by_label("Unmute speech").click();
    harness.run();
    assert!(!harness.state().state().session.voice_settings().muted);
}

#[test]
fn test_clear_button_empties_transcript() {
    let (mut app, _fakes) = test_app(Rig::new(), temp_path("ui-clear"));
    app.state_mut().input_text = "hello".into();
    let mut harness = harness(app);
    harness.run();

    harness.get_by_label("Send message").click();
    harness.run();
    assert_eq!(turns(&harness).len(), 2);

    harness.get_by_label("Clear chat").click();
    harness.run();

    assert_eq!(
        turns(&harness),
        vec![turn(Speaker::System, "Chat history cleared.")]
    );
    let _status = harness.get_by_label("Status: Chat history cleared.");
}

#[test]
fn test_save_then_load_through_buttons() {
    let path = temp_path("ui-save");
    let (mut app, _fakes) = test_app(Rig::new(), path.clone());
    app.state_mut().input_text = "remember this".into();
    let mut harness = harness(app);
    harness.run();

    harness.get_by_label("Send message").click();
    harness.run();
    harness.get_by_label("Save chat").click();
    harness.run();
    assert!(path.exists());

    harness.get_by_label("Clear chat").click();
    harness.run();
    harness.get_by_label("Load chat").click();
    harness.run();

    let turns = turns(&harness);
    assert_eq!(turns[0], turn(Speaker::User, "remember this"));
    assert_eq!(turns[1], turn(Speaker::Assistant, "hi there"));
    assert_eq!(
        turns.last().map(|(_, text)| text.clone()),
        Some(format!("Chat history loaded from: {}", path.display()))
    );

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_voice_button_runs_round_trip() {
    let (app, fakes) = test_app(Rig::new(), temp_path("ui-voice"));
    let mut harness = harness(app);
    harness.run();

    harness.get_by_label("Voice input").click();
    harness.run();

    let started = std::time::Instant::now();
    while harness.state().state().is_busy() && started.elapsed().as_secs() < 5 {
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    harness.run();

    assert_eq!(
        turns(&harness),
        vec![
            turn(Speaker::User, "hello from voice"),
            turn(Speaker::Assistant, "hi there")
        ]
    );
    assert_eq!(fakes.audio.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_finished_voice_round_trip_wakes_idle_window() {
    let (app, _fakes) = test_app(Rig::new(), temp_path("ui-wake"));
    let mut harness = harness(app);
    harness.run();
    for _ in 0..10 {
        if !harness.ctx.has_requested_repaint() {
            break;
        }
        harness.step();
    }
    assert!(!harness.ctx.has_requested_repaint(), "window should be idle");

    let wakes = Arc::new(AtomicUsize::new(0));
    let counter = wakes.clone();
    harness.ctx.set_request_repaint_callback(move |info| {
        if info.delay == Duration::ZERO {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    // Round-trip runs entirely while no frame is drawn
    let worker = harness
        .state_mut()
        .state_mut()
        .orchestrator
        .trigger_voice()
        .unwrap();
    worker.join().unwrap();

    assert!(wakes.load(Ordering::SeqCst) > 0);
    assert!(harness.ctx.has_requested_repaint());

    // The single frame the wake-up asked for shows the reply
    harness.step();
    assert_eq!(
        turns(&harness),
        vec![
            turn(Speaker::User, "hello from voice"),
            turn(Speaker::Assistant, "hi there")
        ]
    );
    let _reply = harness.get_by_label("Assistant response: hi there");
}

#[test]
fn test_clear_and_load_ignored_while_busy() {
    let path = temp_path("ui-busy-load");
    let rig = Rig::new();
    rig.set_model(Behavior::Sleep(Duration::from_millis(400), "slow reply".into()));
    let (app, _fakes) = test_app(rig, path.clone());
    let mut harness = harness(app);
    harness.run();

    let worker = harness
        .state_mut()
        .state_mut()
        .orchestrator
        .trigger_voice()
        .unwrap();
    harness.run();
    assert!(harness.state().state().is_busy());

    harness.get_by_label("Clear chat").click();
    harness.run();
    harness.get_by_label("Load chat").click();
    harness.run();
    harness.state_mut().state_mut().clear();
    harness.state_mut().state_mut().load();

    worker.join().unwrap();
    harness.run();

    assert_eq!(
        turns(&harness),
        vec![
            turn(Speaker::User, "hello from voice"),
            turn(Speaker::Assistant, "slow reply")
        ]
    );
    assert!(!path.exists());
}
