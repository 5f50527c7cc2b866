//! Integration tests for the event bus

use core_runtime::events::{
    CoreEvent, DiagnosticEvent, EventBus, EventSeverity, EventStream, PlaybackEvent,
};

#[tokio::test]
async fn test_every_subscriber_sees_events_in_order() {
    let bus = EventBus::new(16);
    let mut ui = EventStream::new(bus.subscribe());
    let mut panel = EventStream::new(bus.subscribe());
    assert_eq!(bus.subscriber_count(), 2);

    bus.emit(PlaybackEvent::Play).unwrap();
    bus.emit(PlaybackEvent::TimeUpdate { current_time: 0.5 }).unwrap();
    bus.emit(PlaybackEvent::Pause).unwrap();

    for stream in [&mut ui, &mut panel] {
        let names: Vec<_> = stream
            .drain()
            .iter()
            .filter_map(|e| e.as_playback().map(|p| p.name()))
            .collect();
        assert_eq!(names, vec!["play", "timeupdate", "pause"]);
    }
}

#[tokio::test]
async fn test_filtered_stream_skips_diagnostics() {
    let bus = EventBus::default();
    let mut playback_only =
        EventStream::new(bus.subscribe()).filter(|e| matches!(e, CoreEvent::Playback(_)));

    bus.emit(DiagnosticEvent::PlayRetry {
        current_time: 1.0,
        streaming: true,
        video_playing: false,
        audio_playing: true,
        video_decoding: true,
        audio_decoding: false,
        delay_ms: 1000,
    })
    .unwrap();
    bus.emit(PlaybackEvent::Waiting { current_time: 1.0 }).unwrap();

    let event = playback_only.recv().await.unwrap();
    assert_eq!(
        event,
        CoreEvent::Playback(PlaybackEvent::Waiting { current_time: 1.0 })
    );
    assert!(playback_only.try_recv().is_none());
}

#[test]
fn test_emit_without_subscribers_reports_error() {
    let bus = EventBus::new(4);
    assert!(bus.emit(PlaybackEvent::Loop).is_err());
}

#[test]
fn test_play_retry_is_a_warning() {
    let retry = CoreEvent::from(DiagnosticEvent::PlayRetry {
        current_time: 0.0,
        streaming: false,
        video_playing: false,
        audio_playing: false,
        video_decoding: true,
        audio_decoding: false,
        delay_ms: 3000,
    });
    assert_eq!(retry.severity(), EventSeverity::Warning);
    assert_eq!(retry.description(), "Retrying playback after stall");
}

#[test]
fn test_wire_names_serialize() {
    let json = serde_json::to_value(CoreEvent::from(PlaybackEvent::Seeked { target_time: 4.0 }))
        .unwrap();
    assert_eq!(json["type"], "Playback");
    assert_eq!(json["payload"]["event"], "seeked");
    assert_eq!(json["payload"]["target_time"], 4.0);
}
