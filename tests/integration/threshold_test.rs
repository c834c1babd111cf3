use netpulse::core::net_monitor::{
    evaluate_thresholds, AlertKind, AlertSink, ConsoleSink, LogSink, Sample, ThresholdConfig,
};

fn sample() -> Sample {
    Sample {
        timestamp: 1_700_000_000,
        latency_ms: 30.0,
        packet_loss_pct: 0.0,
        sent_bps: 10_000.0,
        recv_bps: 10_000.0,
    }
}

#[test]
fn test_quiet_sample_produces_no_events() {
    let events = evaluate_thresholds(&sample(), &ThresholdConfig::default());
    assert!(events.is_empty());
}

#[test]
fn test_every_family_can_breach_at_once() {
    let noisy = Sample {
        latency_ms: 900.0,
        sent_bps: 5_000_000.0,
        recv_bps: 5_000_000.0,
        ..sample()
    };

    let events = evaluate_thresholds(&noisy, &ThresholdConfig::default());
    let kinds: Vec<AlertKind> = events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AlertKind::HighLatency,
            AlertKind::HighUpload,
            AlertKind::HighDownload
        ]
    );
}

#[test]
fn test_evaluator_is_pure() {
    let config = ThresholdConfig::default();
    let input = Sample {
        latency_ms: 500.0,
        ..sample()
    };

    let first = evaluate_thresholds(&input, &config);
    let second = evaluate_thresholds(&input, &config);
    assert_eq!(first.len(), second.len());
    assert_eq!(first[0].message, second[0].message);
}

#[test]
fn test_custom_thresholds_are_honored() {
    let config = ThresholdConfig {
        latency_ms: 10.0,
        packet_loss_fraction: 1.0,
        bandwidth_bytes_per_sec: 1_000.0,
    };

    let events = evaluate_thresholds(&sample(), &config);
    let kinds: Vec<AlertKind> = events.iter().map(|e| e.kind).collect();
    // 30 ms > 10 ms, both rates > 1 KB/s, loss 0 < 100%
    assert_eq!(
        kinds,
        vec![
            AlertKind::HighLatency,
            AlertKind::HighUpload,
            AlertKind::HighDownload
        ]
    );
    assert!(!kinds.contains(&AlertKind::HostUnreachable));
}

#[test]
fn test_events_flow_through_any_sink() {
    let breached = Sample {
        latency_ms: 250.0,
        ..sample()
    };
    let events = evaluate_thresholds(&breached, &ThresholdConfig::default());

    // Sinks consume events without panicking; delivery is the sink's
    // concern, the evaluator only builds the list.
    let mut console = ConsoleSink;
    let mut log = LogSink;
    for event in &events {
        console.emit(event);
        log.emit(event);
    }
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].value, 250.0);
}
