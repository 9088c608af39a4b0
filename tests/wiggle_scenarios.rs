//! End-to-end scenarios for the wiggle engine.
//!
//! Run with: cargo test --test wiggle_scenarios

use std::path::PathBuf;

use wiggle::cli::render_job;
use wiggle::driver::displace;
use wiggle::render_job::{RenderJobSpec, RenderPhase};
use wiggle::svg::extract_first_path_data;
use wiggle::{smooth, ManualScheduler, MeasuredPath, WiggleDriver, WiggleParams};

const UNIT_SQUARE: &str = "M0,0 L1,0 L1,1 L0,1 Z";
const SQUARE_CURVE: &str = "M 0,0 Q 1,0 1,0.5 Q 1,1 0.5,1 Q 0,1 0,0.5 Q 0,0 0,0 T 0,0";

fn fire(driver: &mut WiggleDriver<ManualScheduler>) -> String {
    let handle = driver
        .scheduler_mut()
        .take_pending()
        .expect("a frame should be pending");
    driver
        .on_frame(handle)
        .expect("pending frame should publish")
        .to_string()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("wiggle-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_zero_amplitude_square_is_static() {
    for speed in [0.001, 0.1, 0.5, 3.0] {
        let mut driver = WiggleDriver::new(ManualScheduler::new());
        driver
            .start(UNIT_SQUARE, WiggleParams::new(0.0, speed, 4))
            .unwrap();
        assert_eq!(driver.curve(), SQUARE_CURVE);
        for _ in 0..10 {
            assert_eq!(fire(&mut driver), SQUARE_CURVE);
        }
    }
}

#[test]
fn test_frame_recomputation_is_bit_identical() {
    let path = MeasuredPath::parse("M10 10 C30 0 70 0 90 10 S90 90 50 90 Q10 90 10 10").unwrap();
    let samples = wiggle::sample(&path, 24, 61.5, 18.0);
    for frame in [0, 1, 17, 1000, 123_456] {
        let a = displace(&samples, frame, 0.07);
        let b = displace(&samples, frame, 0.07);
        assert_eq!(a, b);
        assert_eq!(smooth(&a), smooth(&b));
    }
}

#[test]
fn test_point_count_change_cancels_and_resamples_before_next_frame() {
    let mut driver = WiggleDriver::new(ManualScheduler::new()).with_fixed_seed(3.0);
    driver
        .start(UNIT_SQUARE, WiggleParams::new(5.0, 0.1, 4))
        .unwrap();
    fire(&mut driver);
    let stale = driver.pending().unwrap();

    driver
        .update(UNIT_SQUARE, WiggleParams::new(5.0, 0.1, 8))
        .unwrap();
    assert_eq!(driver.scheduler().cancelled(), 1);
    assert_eq!(driver.samples().len(), 9);
    assert!(driver.on_frame(stale).is_none());

    // The published curve already reflects the new sampling.
    let curve = fire(&mut driver);
    assert_eq!(curve.matches('Q').count(), 8);
}

#[test]
fn test_wiggling_curve_changes_between_frames() {
    let mut driver = WiggleDriver::new(ManualScheduler::new()).with_fixed_seed(11.0);
    driver
        .start(UNIT_SQUARE, WiggleParams::new(10.0, 0.1, 10))
        .unwrap();
    let first = driver.curve().to_string();
    let second = fire(&mut driver);
    assert_ne!(first, second);
    assert!(second.starts_with("M "));
}

#[test]
fn test_render_job_writes_frames_and_metadata() {
    let dir = scratch_dir("render");
    let input = dir.join("asset.svg");
    std::fs::write(
        &input,
        r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M10 10 L90 10 L90 90 L10 90 Z"/></svg>"#,
    )
    .unwrap();

    let mut spec = RenderJobSpec::new(input, dir.join("frames"));
    spec.frames = 5;
    spec.seed = Some(42.0);
    spec.params = WiggleParams::new(6.0, 0.2, 12);
    spec.validate().unwrap();

    let metadata = render_job(&spec).unwrap();
    assert_eq!(metadata.frame_count, 5);
    assert_eq!(metadata.seed, 42.0);
    assert_eq!(metadata.input_hash.len(), 64);

    for i in 0..5 {
        let frame = std::fs::read_to_string(spec.frame_path(i)).unwrap();
        let d = extract_first_path_data(&frame).unwrap().unwrap();
        assert!(d.starts_with("M "));
        assert!(d.contains(" T "));
    }
    assert!(!spec.frame_path(5).exists());

    let json = std::fs::read_to_string(spec.output_dir.join("metadata.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["frameCount"], 5);
    assert_eq!(value["job"]["params"]["pointCount"], 12);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_render_job_reports_bad_path_data() {
    let dir = scratch_dir("bad-path");
    let input = dir.join("path.txt");
    std::fs::write(&input, "M0 0 L1").unwrap();

    let spec = RenderJobSpec::new(input, dir.join("frames"));
    let err = render_job(&spec).unwrap_err();
    assert_eq!(err.phase, RenderPhase::ParsePath);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_render_job_clamps_zero_point_count() {
    let dir = scratch_dir("zero-points");
    let input = dir.join("path.txt");
    std::fs::write(&input, UNIT_SQUARE).unwrap();

    let mut spec = RenderJobSpec::new(input, dir.join("frames"));
    spec.frames = 2;
    spec.seed = Some(1.0);
    spec.params = WiggleParams::new(0.0, 0.1, 0);
    spec.validate().unwrap();

    let metadata = render_job(&spec).unwrap();
    assert_eq!(metadata.effective_params.point_count, 1);
    assert_eq!(metadata.job.params.point_count, 0);
    assert_eq!(metadata.warnings.len(), 1);

    // One interval gives two samples: the start point counted at both ends.
    let frame = std::fs::read_to_string(spec.frame_path(1)).unwrap();
    let d = extract_first_path_data(&frame).unwrap().unwrap();
    assert_eq!(d, "M 0,0 Q 0,0 0,0 T 0,0");

    let _ = std::fs::remove_dir_all(&dir);
}
