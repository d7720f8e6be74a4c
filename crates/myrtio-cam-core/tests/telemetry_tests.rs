//! Frame-rate sampling and the framerate status line.

use myrtio_cam_core::telemetry::Telemetry;

#[test]
fn tick_publishes_and_resets_the_frame_counters() {
    let telemetry = Telemetry::new();
    for _ in 0..25 {
        telemetry.count_net_frame();
    }
    for _ in 0..26 {
        telemetry.count_hw_frame();
    }
    telemetry.count_i2s_frame();

    telemetry.tick();
    let snapshot = telemetry.snapshot();
    assert_eq!(snapshot.net_fps, 25);
    assert_eq!(snapshot.hw_fps, 26);
    assert_eq!(snapshot.i2s_fps, 1);
    assert_eq!(snapshot.uptime_secs, 1);

    // a quiet second publishes zeros
    telemetry.tick();
    let snapshot = telemetry.snapshot();
    assert_eq!(snapshot.net_fps, 0);
    assert_eq!(snapshot.uptime_secs, 2);
}

#[test]
fn error_counters_accumulate_until_cleared() {
    let telemetry = Telemetry::new();
    telemetry.count_dma_error();
    telemetry.count_dma_error();
    telemetry.count_jpg_error();
    telemetry.tick();

    let snapshot = telemetry.snapshot();
    assert_eq!(snapshot.dma_errors, 2);
    assert_eq!(snapshot.jpg_errors, 1);

    telemetry.clear_errors();
    let snapshot = telemetry.snapshot();
    assert_eq!(snapshot.dma_errors, 0);
    assert_eq!(snapshot.jpg_errors, 0);
}

#[test]
fn framerate_line_matches_the_page_format() {
    let telemetry = Telemetry::new();
    telemetry.count_net_frame();
    telemetry.count_net_frame();
    telemetry.count_hw_frame();
    telemetry.count_jpg_error();
    telemetry.record_signal_strength(-70);
    telemetry.tick();

    let line = telemetry.framerate_line();
    assert_eq!(
        line.as_str(),
        "- NetFPS:2 CamFPS:1 I2sFPS:0 - QUEerrors:0 JPGerrors:1 - UpTime(hrs):0 - Rssi:-70"
    );
}

#[test]
fn uptime_is_reported_in_whole_hours() {
    let telemetry = Telemetry::new();
    for _ in 0..7200 {
        telemetry.tick();
    }

    let line = telemetry.framerate_line();
    assert!(line.as_str().contains("UpTime(hrs):2"));
}
