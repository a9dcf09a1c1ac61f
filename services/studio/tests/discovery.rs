//! End-to-end runs of the discovery driver against the in-memory store.

use chrono::{TimeZone, Utc};
use futures::stream;
use std::sync::Arc;
use studio_lib::adapters::InMemoryStore;
use studio_lib::config::Config;
use studio_lib::driver::{run_discovery, AppState, ClientMessage, DiscoveryOutcome, ServerMessage};
use style_discovery_core::clock::ManualClock;
use style_discovery_core::domain::{
    Confidence, Image, RoomType, StudioSettings, SwipeDirection,
};
use style_discovery_core::ports::SessionLog;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn library(count: usize) -> Vec<Image> {
    (0..count)
        .map(|i| {
            Image::new(
                format!("img-{}", i),
                format!("data:image/jpeg;base64,{}", i),
                RoomType::ALL[i % RoomType::ALL.len()],
                vec!["1".to_string(), "2".to_string()],
            )
        })
        .collect()
}

fn settings(session_length: usize) -> StudioSettings {
    StudioSettings {
        session_length,
        ..StudioSettings::default()
    }
}

struct Harness {
    store: Arc<InMemoryStore>,
    clock: Arc<ManualClock>,
    app_state: Arc<AppState>,
}

fn harness(images: Vec<Image>, settings: StudioSettings) -> Harness {
    let store = Arc::new(InMemoryStore::seeded(images, settings));
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
    ));
    let config = Arc::new(Config::from_lookup(|_| None).unwrap());
    let app_state =
        Arc::new(AppState::with_store(store.clone(), config).with_clock(clock.clone()));
    Harness {
        store,
        clock,
        app_state,
    }
}

/// Drives a session where each command is preceded by `delay_ms` of think time.
async fn drive(
    harness: &Harness,
    script: Vec<(i64, ClientMessage)>,
    cancellation: CancellationToken,
) -> (DiscoveryOutcome, Vec<ServerMessage>) {
    let clock = harness.clock.clone();
    let commands = stream::iter(script.into_iter().map(move |(delay_ms, command)| {
        clock.advance_ms(delay_ms);
        command
    }));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let outcome = run_discovery(harness.app_state.clone(), commands, tx, cancellation)
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    (outcome, events)
}

fn start(client_name: Option<&str>) -> (i64, ClientMessage) {
    (
        0,
        ClientMessage::Start {
            client_name: client_name.map(str::to_string),
        },
    )
}

fn swipe(delay_ms: i64, direction: SwipeDirection) -> (i64, ClientMessage) {
    (delay_ms, ClientMessage::Swipe { direction })
}

#[tokio::test]
async fn small_pool_is_refused() {
    let harness = harness(library(3), settings(10));

    let (outcome, events) = drive(
        &harness,
        vec![start(None), swipe(800, SwipeDirection::Like)],
        CancellationToken::new(),
    )
    .await;

    match outcome {
        DiscoveryOutcome::NotReady(readiness) => {
            assert_eq!(readiness.pool_size, 3);
            assert_eq!(readiness.remaining, 2);
            assert!(!readiness.is_ready);
        }
        other => panic!("expected NotReady, got {:?}", other),
    }
    assert!(matches!(events.as_slice(), [ServerMessage::PoolNotReady { .. }]));
    assert!(harness.store.list_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn inactive_images_do_not_count_towards_the_pool() {
    let mut images = library(5);
    images[0] = images[0].clone().deactivated();
    let harness = harness(images, settings(10));

    let (outcome, _) = drive(&harness, vec![start(None)], CancellationToken::new()).await;

    assert!(matches!(outcome, DiscoveryOutcome::NotReady(r) if r.pool_size == 4));
}

#[tokio::test]
async fn fast_likes_complete_and_are_recorded() {
    let harness = harness(library(8), settings(5));
    let mut script = vec![start(Some("Ada"))];
    script.extend((0..5).map(|_| swipe(800, SwipeDirection::Like)));

    let (outcome, events) = drive(&harness, script, CancellationToken::new()).await;

    let result = match outcome {
        DiscoveryOutcome::Completed(result) => result,
        other => panic!("expected Completed, got {:?}", other),
    };
    assert_eq!(result.decisions.len(), 5);
    assert!(result.decisions.iter().all(|d| d.response_time_ms == 800));
    assert_eq!(result.client_name.as_deref(), Some("Ada"));
    assert_eq!(
        result.summary.primary_styles,
        vec!["Minimalist".to_string(), "Scandinavian".to_string()]
    );
    assert_eq!(result.summary.confidence, Confidence::High);
    assert!((result.summary.decisiveness - (1.0 - 800.0 / 6000.0)).abs() < 1e-9);

    let recorded = harness.store.list_sessions().await.unwrap();
    assert_eq!(recorded, vec![result.clone()]);

    assert!(matches!(events.first(), Some(ServerMessage::SessionStarted { total: 5 })));
    let presented = events
        .iter()
        .filter(|e| matches!(e, ServerMessage::CardPresented { .. }))
        .count();
    assert_eq!(presented, 5);
    match events.last() {
        Some(ServerMessage::SessionCompleted { result: sent, report }) => {
            assert_eq!(sent.id, result.id);
            assert_eq!(report.liked_image_ids.len(), 5);
            assert_eq!(report.average_response_ms, 800);
            assert_eq!(report.export_file_name, "Imprint_DNA_Ada_2024-05-01.pdf");
        }
        other => panic!("expected SessionCompleted last, got {:?}", other),
    }
}

#[tokio::test]
async fn undo_flags_and_retimes_the_replacement_decision() {
    let harness = harness(library(5), settings(5));
    let mut script = vec![
        start(None),
        swipe(500, SwipeDirection::Like),
        (300, ClientMessage::Undo),
        (100, ClientMessage::Undo),
        swipe(700, SwipeDirection::Reject),
    ];
    script.extend((0..4).map(|_| swipe(1000, SwipeDirection::Like)));

    let (outcome, events) = drive(&harness, script, CancellationToken::new()).await;

    let result = match outcome {
        DiscoveryOutcome::Completed(result) => result,
        other => panic!("expected Completed, got {:?}", other),
    };
    let first = &result.decisions[0];
    assert_eq!(first.direction, SwipeDirection::Reject);
    assert!(first.undo_used);
    // Measured from the undo that re-presented the card, not the retracted swipe.
    assert_eq!(first.response_time_ms, 800);
    assert!(result.decisions[1..].iter().all(|d| !d.undo_used));

    let undos = events
        .iter()
        .filter(|e| matches!(e, ServerMessage::UndoApplied { position: 0 }))
        .count();
    assert_eq!(undos, 1);
    let rejected = events
        .iter()
        .filter(|e| matches!(e, ServerMessage::Error { .. }))
        .count();
    assert_eq!(rejected, 1, "the second undo is refused");

    let average = (800.0 + 4.0 * 1000.0) / 5.0;
    let expected = 1.0 - average / 6000.0 - 0.15;
    assert!((result.summary.decisiveness - expected).abs() < 1e-9);
}

#[tokio::test]
async fn commands_before_start_are_rejected() {
    let harness = harness(library(5), settings(5));
    let script = vec![
        swipe(0, SwipeDirection::Like),
        (0, ClientMessage::Undo),
        (0, ClientMessage::Cancel),
    ];

    let (outcome, events) = drive(&harness, script, CancellationToken::new()).await;

    assert!(matches!(outcome, DiscoveryOutcome::Cancelled));
    assert!(matches!(
        events.as_slice(),
        [
            ServerMessage::Error { .. },
            ServerMessage::Error { .. },
            ServerMessage::SessionCancelled
        ]
    ));
}

#[tokio::test]
async fn cancelling_mid_session_records_nothing() {
    let harness = harness(library(5), settings(5));
    let script = vec![
        start(None),
        swipe(900, SwipeDirection::Like),
        start(None),
        (0, ClientMessage::Cancel),
        swipe(900, SwipeDirection::Like),
    ];

    let (outcome, events) = drive(&harness, script, CancellationToken::new()).await;

    assert!(matches!(outcome, DiscoveryOutcome::Cancelled));
    assert!(matches!(events.last(), Some(ServerMessage::SessionCancelled)));
    assert!(events
        .iter()
        .any(|e| matches!(e, ServerMessage::Error { message } if message.contains("already"))));
    assert!(harness.store.list_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn ending_the_command_stream_cancels() {
    let harness = harness(library(5), settings(5));
    let script = vec![start(None), swipe(900, SwipeDirection::Like)];

    let (outcome, _) = drive(&harness, script, CancellationToken::new()).await;

    assert!(matches!(outcome, DiscoveryOutcome::Cancelled));
    assert!(harness.store.list_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn fired_token_stops_the_session() {
    let harness = harness(library(5), settings(5));
    let cancellation = CancellationToken::new();
    cancellation.cancel();
    // A stream that never yields; only the token can end the run.
    let commands = stream::pending::<ClientMessage>();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let outcome = run_discovery(harness.app_state.clone(), commands, tx, cancellation)
        .await
        .unwrap();

    assert!(matches!(outcome, DiscoveryOutcome::Cancelled));
    assert!(matches!(rx.recv().await, Some(ServerMessage::SessionCancelled)));
}

#[test]
fn wire_format_uses_tagged_snake_case() {
    let command: ClientMessage =
        serde_json::from_str(r#"{"type":"swipe","direction":"like"}"#).unwrap();
    assert_eq!(
        command,
        ClientMessage::Swipe {
            direction: SwipeDirection::Like
        }
    );

    let legacy: ClientMessage =
        serde_json::from_str(r#"{"type":"swipe","direction":"left"}"#).unwrap();
    assert_eq!(
        legacy,
        ClientMessage::Swipe {
            direction: SwipeDirection::Reject
        }
    );

    let start: ClientMessage = serde_json::from_str(r#"{"type":"start"}"#).unwrap();
    assert_eq!(start, ClientMessage::Start { client_name: None });

    let event = serde_json::to_value(ServerMessage::UndoApplied { position: 2 }).unwrap();
    assert_eq!(event, serde_json::json!({"type": "undo_applied", "position": 2}));

    let cancelled = serde_json::to_value(ServerMessage::SessionCancelled).unwrap();
    assert_eq!(cancelled, serde_json::json!({"type": "session_cancelled"}));
}
