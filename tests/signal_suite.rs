use ring_visualizer::visual::{
    BEAT_COOLDOWN_MS, SignalTracker, blend_running_average, mean_of,
};

/// Spectrum whose byte sum is exactly `sum` (sum must fit in whole bytes).
fn spectrum_with_sum(sum: u32) -> Vec<u8> {
    let mut v = Vec::new();
    let mut left = sum;
    while left > 0 {
        let take = left.min(255);
        v.push(take as u8);
        left -= take;
    }
    if v.is_empty() {
        v.push(0);
    }
    v
}

// ── Running average blend ───────────────────────────────────────────────────

#[test]
fn blend_weights_newest_sum_three_to_one() {
    assert_eq!(blend_running_average(100.0, 500.0), 400.0);
    assert_eq!(blend_running_average(0.0, 400.0), 300.0);
    assert_eq!(blend_running_average(400.0, 0.0), 100.0);
}

#[test]
fn tracker_applies_blend_per_frame() {
    let mut tracker = SignalTracker::new(0);
    tracker.tick(300);

    let spectrum = spectrum_with_sum(400);
    tracker.detect_pulse(&spectrum, 200.0);
    assert_eq!(tracker.running_average(), 300.0);

    tracker.tick(600);
    tracker.detect_pulse(&spectrum, 200.0);
    assert_eq!(tracker.running_average(), blend_running_average(300.0, 400.0));
}

// ── Beat trigger ────────────────────────────────────────────────────────────

#[test]
fn beat_fires_when_sum_clears_average_plus_threshold() {
    let mut tracker = SignalTracker::new(0);
    tracker.tick(300); // cooldown timer well past 200 ms

    // Average is still 0, so a sum of 500 clears threshold 200.
    assert!(tracker.detect_pulse(&spectrum_with_sum(500), 200.0));
}

#[test]
fn beat_requires_strict_excess_over_threshold() {
    let mut tracker = SignalTracker::new(0);
    tracker.tick(300);

    // Exactly average + threshold is not enough.
    assert!(!tracker.detect_pulse(&spectrum_with_sum(200), 200.0));
}

#[test]
fn cooldown_suppresses_back_to_back_beats() {
    let mut tracker = SignalTracker::new(0);
    tracker.tick(300);
    assert!(tracker.detect_pulse(&spectrum_with_sum(5000), 200.0));

    // 50 ms later the sum is loud enough again but the window is closed.
    tracker.tick(350);
    assert!(!tracker.detect_pulse(&spectrum_with_sum(50_000), 200.0));

    // Once the cooldown has elapsed the next loud frame fires.
    tracker.tick(601);
    assert!(tracker.detect_pulse(&spectrum_with_sum(80_000), 200.0));
}

#[test]
fn quiet_frames_never_fire() {
    let mut tracker = SignalTracker::new(0);
    for step in 1..20u32 {
        tracker.tick((step * 50) % 1000);
        assert!(!tracker.detect_pulse(&spectrum_with_sum(10), 200.0));
    }
}

// ── Frame clock ─────────────────────────────────────────────────────────────

#[test]
fn frame_time_wraps_across_the_second_boundary() {
    let mut tracker = SignalTracker::new(900);
    tracker.tick(100);
    assert_eq!(tracker.frame_time(), 200.0);
    assert_eq!(tracker.app_time(), 200.0);
}

#[test]
fn app_time_accumulates_frame_deltas() {
    let mut tracker = SignalTracker::new(0);
    tracker.tick(16);
    tracker.tick(33);
    tracker.tick(50);
    assert_eq!(tracker.app_time(), 50.0);

    tracker.tick(10); // wrapped
    assert_eq!(tracker.frame_time(), 960.0);
    assert_eq!(tracker.app_time(), 1010.0);
}

#[test]
fn cooldown_constant_matches_documented_window() {
    assert_eq!(BEAT_COOLDOWN_MS, 200.0);
}

// ── Drawn-bin mean ──────────────────────────────────────────────────────────

#[test]
fn mean_of_covers_only_the_leading_bins() {
    let mut spectrum = vec![10u8; 20];
    for v in spectrum.iter_mut().skip(8) {
        *v = 255; // trailing bins must not contribute
    }
    assert_eq!(mean_of(&spectrum, 8), 10.0);
}

#[test]
fn mean_of_handles_empty_ranges() {
    assert_eq!(mean_of(&[], 0), 0.0);
    assert_eq!(mean_of(&[42], 0), 0.0);
}
