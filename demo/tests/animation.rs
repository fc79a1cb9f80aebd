use std::time::Duration;

use harling::{App, Headless, Input, KeyCode, Rgba, WindowConfig};
use lime_harling::square::{RenderMode, shift_color};
use lime_harling::{Memory, handle_input, update_and_render};

fn small_window() -> WindowConfig {
    WindowConfig {
        title: String::from("test"),
        width: 4,
        height: 3,
        frame_interval: Duration::from_millis(1),
        ..Default::default()
    }
}

fn expected_frame(width: usize, height: usize, shift: i32) -> Vec<Rgba> {
    (0..height)
        .flat_map(|y| (0..width).map(move |x| shift_color(x, y, shift)))
        .collect()
}

fn run(mode: RenderMode, backend: &mut Headless) {
    App::new(Memory::new(mode), small_window())
        .run_with(backend, handle_input, update_and_render)
        .unwrap();
}

#[test_log::test]
fn each_frame_uses_the_next_shift() {
    let mut backend = Headless::idle(5).recording();
    run(RenderMode::Buffer, &mut backend);

    assert_eq!(backend.presented(), 5);
    for (shift, frame) in backend.frames().iter().enumerate() {
        assert_eq!(frame, &expected_frame(4, 3, shift as i32), "frame {shift}");
    }
}

#[test_log::test]
fn point_rendering_matches_buffer_rendering() {
    let mut buffer = Headless::idle(3).recording();
    let mut points = Headless::idle(3).recording();
    run(RenderMode::Buffer, &mut buffer);
    run(RenderMode::Points, &mut points);

    assert_eq!(buffer.frames(), points.frames());
}

#[test_log::test]
fn q_quits_before_the_next_frame() {
    let mut backend = Headless::new([
        vec![],
        vec![],
        vec![Input::key_down(KeyCode::KeyQ)],
        vec![],
    ]);
    run(RenderMode::Buffer, &mut backend);

    assert_eq!(backend.presented(), 2);
}

#[test_log::test]
fn escape_quits_immediately() {
    let mut backend = Headless::new([vec![Input::key_down(KeyCode::Escape)]]).recording();
    run(RenderMode::Buffer, &mut backend);

    assert_eq!(backend.presented(), 0);
    assert!(backend.last_frame().is_none());
}

#[test_log::test]
fn f_toggles_fullscreen_in_and_out() {
    let press_f = || vec![Input::key_down(KeyCode::KeyF), Input::key_up(KeyCode::KeyF)];
    let mut backend = Headless::new([press_f(), vec![], press_f(), press_f()]);
    run(RenderMode::Buffer, &mut backend);

    assert_eq!(backend.fullscreen_requests(), [true, false, true]);
    assert!(backend.is_fullscreen());
    assert_eq!(backend.presented(), 4);
}

#[test_log::test]
fn toggling_fullscreen_does_not_disturb_the_animation() {
    let mut backend =
        Headless::new([vec![], vec![Input::key_down(KeyCode::KeyF)], vec![]]).recording();
    run(RenderMode::Buffer, &mut backend);

    assert_eq!(backend.last_frame(), Some(expected_frame(4, 3, 2).as_slice()));
}

#[test]
fn invalid_window_is_rejected_before_running() {
    let config = WindowConfig {
        width: 0,
        ..small_window()
    };
    let mut backend = Headless::idle(1);
    let err = App::new(Memory::default(), config)
        .run_with(&mut backend, handle_input, update_and_render)
        .unwrap_err();

    assert!(matches!(err, harling::PlatformError::InvalidConfig(_)));
    assert_eq!(backend.presented(), 0);
}

#[test]
fn oversized_window_is_rejected_before_allocating() {
    let config = WindowConfig {
        width: u32::MAX as usize,
        height: u32::MAX as usize,
        ..small_window()
    };
    let mut backend = Headless::idle(1);
    let err = App::new(Memory::default(), config)
        .run_with(&mut backend, handle_input, update_and_render)
        .unwrap_err();

    assert!(matches!(err, harling::PlatformError::InvalidConfig(_)));
    assert_eq!(backend.presented(), 0);
}

#[test_log::test]
fn f_follows_fullscreen_left_by_the_system() {
    let mut backend = Headless::new([
        vec![Input::key_down(KeyCode::KeyF)],
        vec![Input::FullscreenChanged(false)],
        vec![Input::key_down(KeyCode::KeyF)],
    ]);
    run(RenderMode::Buffer, &mut backend);

    assert_eq!(backend.fullscreen_requests(), [true, true]);
    assert_eq!(backend.presented(), 3);
}
