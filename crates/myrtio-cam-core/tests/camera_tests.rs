//! Frame acquisition and sensor clock transitions.

mod common;

use common::MockCamera;
use embassy_futures::block_on;
use myrtio_cam_core::camera::{
    CameraError, Sensor, fresh_frame, set_night_mode, set_stream_speed,
};
use myrtio_cam_core::control::ControlState;

/// A sensor binding that overrides nothing.
struct BareSensor;

impl Sensor for BareSensor {}

#[test]
fn every_operation_defaults_to_unsupported() {
    let mut sensor = BareSensor;

    assert_eq!(sensor.set_framesize(8), Err(CameraError::Unsupported));
    assert_eq!(sensor.set_vflip(1), Err(CameraError::Unsupported));
    assert_eq!(
        sensor.set_register(0x111, 0xff, 0),
        Err(CameraError::Unsupported)
    );
    assert_eq!(sensor.get_register(0x111, 0xff), Err(CameraError::Unsupported));
    assert!(sensor.status().is_err());
}

#[test]
fn fresh_frame_discards_the_stale_exposure() {
    let mut camera = MockCamera::with_frames(vec![vec![1], vec![2], vec![3]]);

    let frame = block_on(fresh_frame(&mut camera)).unwrap();

    assert_eq!(frame.data, &[2]);
}

#[test]
fn stream_speed_drives_the_clock_divider_and_the_flag() {
    let mut camera = MockCamera::new();
    let state = ControlState::new();

    set_stream_speed(&mut camera, &state, false).unwrap();
    assert_eq!(camera.register(0x111), Some(0x02));
    assert!(!state.stream_fast());

    set_stream_speed(&mut camera, &state, true).unwrap();
    assert_eq!(camera.register(0x111), Some(0x00));
    assert!(state.stream_fast());
}

#[test]
fn stream_speed_failure_leaves_the_flag_untouched() {
    let mut sensor = BareSensor;
    let state = ControlState::new();
    state.set_stream_fast(true);

    assert!(set_stream_speed(&mut sensor, &state, false).is_err());
    assert!(state.stream_fast());
}

#[test]
fn leaving_night_mode_restores_the_fast_clock() {
    let mut camera = MockCamera::new();
    let state = ControlState::new();
    state.set_night_mode(true);
    state.set_stream_fast(false);

    block_on(set_night_mode(&mut camera, &state, false)).unwrap();

    assert_eq!(camera.register(0x10f), Some(0x43));
    assert!(!state.night_mode());
    assert!(state.stream_fast());
}
