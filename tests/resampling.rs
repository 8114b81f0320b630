mod fixtures;

use fixtures::{expand_to_fine, wave, RecordingSink};
use qqe_engine::{BarSnapshot, QqeConfig, QqeEngine, Timeframe};

const RUN: u64 = 5;

fn coarse_feed() -> Vec<BarSnapshot> {
    wave(&[(-0.5, 80), (1.0, 40), (-0.75, 40)], 0, 300)
}

fn drive_resampled(coarse: &Vec<BarSnapshot>, fine: &Vec<BarSnapshot>) -> QqeEngine {
    let mut engine = QqeEngine::new(
        QqeConfig::builder()
            .symbol("EURUSD")
            .timeframe(Timeframe::M1)
            .upper_timeframe(Timeframe::M5)
            .build(),
    );
    let mut sink = RecordingSink::default();
    for i in 0..fine.len() {
        engine.calculate(fine, Some(coarse), i, &mut sink);
    }
    engine
}

fn drive_direct(coarse: &Vec<BarSnapshot>) -> QqeEngine {
    let mut engine = QqeEngine::new(
        QqeConfig::builder()
            .symbol("EURUSD")
            .timeframe(Timeframe::M5)
            .build(),
    );
    let mut sink = RecordingSink::default();
    for i in 0..coarse.len() {
        engine.calculate(coarse, None, i, &mut sink);
    }
    engine
}

/// Every fine bar of a run reports the one coarse value computed for it.
#[test]
fn all_fine_bars_of_a_run_share_one_value() {
    let coarse = coarse_feed();
    let fine = expand_to_fine(&coarse, RUN, 60);
    let engine = drive_resampled(&coarse, &fine);

    for ci in 0..coarse.len() {
        let base = ci as u64 * RUN;
        let first_rsi = engine.rsi_ma().get(base as usize);
        let first_trail = engine.trailing_level().get(base as usize);
        for k in 1..RUN {
            let i = (base + k) as usize;
            let rsi = engine.rsi_ma().get(i);
            let trail = engine.trailing_level().get(i);
            assert!(
                rsi == first_rsi || (rsi.is_nan() && first_rsi.is_nan()),
                "RsiMa differs inside run {ci} at fine index {i}"
            );
            assert!(
                trail == first_trail || (trail.is_nan() && first_trail.is_nan()),
                "TrailingLevel differs inside run {ci} at fine index {i}"
            );
        }
    }
}

/// Resampling over 1-minute bars reproduces the values a direct 5-minute
/// engine computes, run by run.
#[test]
fn resampled_matches_direct_coarse_computation() {
    let coarse = coarse_feed();
    let fine = expand_to_fine(&coarse, RUN, 60);
    let resampled = drive_resampled(&coarse, &fine);
    let direct = drive_direct(&coarse);

    for ci in 0..coarse.len() {
        let fine_last = (ci as u64 * RUN + RUN - 1) as usize;
        for (name, a, b) in [
            ("RsiMa", direct.rsi_ma().get(ci), resampled.rsi_ma().get(fine_last)),
            (
                "TrailingLevel",
                direct.trailing_level().get(ci),
                resampled.trailing_level().get(fine_last),
            ),
        ] {
            if a.is_nan() {
                assert!(b.is_nan(), "{name}: direct undefined but resampled set at {ci}");
            } else {
                assert!((a - b).abs() < 1e-9, "{name} diverges at {ci}: {a} vs {b}");
            }
        }
    }
}

/// With resampling active, warm-up gating follows the coarse index, so the
/// fine series stays undefined five times longer than without resampling.
#[test]
fn warm_up_scales_with_the_upper_timeframe() {
    let coarse = coarse_feed();
    let fine = expand_to_fine(&coarse, RUN, 60);
    let engine = drive_resampled(&coarse, &fine);

    assert!(engine.is_resampling());
    assert!(!engine.rsi_ma().is_defined(17 * RUN as usize));
    assert!(engine.rsi_ma().is_defined((18 * RUN + RUN - 1) as usize));
}
