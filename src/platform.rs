use crate::{Input, Rgba};

#[cfg(target_os = "macos")]
pub mod appkit;
#[cfg(not(any(target_os = "macos", target_arch = "wasm32")))]
pub mod desktop;
#[cfg(not(target_arch = "wasm32"))]
pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub enum PlatformRequest<'a> {
    Update(PlatformState<'a>),
    Input(Input),
}

pub struct PlatformState<'a> {
    pub delta: f32,
    //
    pub frame_buffer: &'a mut [Rgba],
    pub width: usize,
    pub height: usize,
}

/// Largest whole size, in CSS pixels, that shows a `width x height` canvas
/// inside the viewport without changing its aspect ratio.
pub fn fit_to_viewport(
    width: usize,
    height: usize,
    viewport_width: f64,
    viewport_height: f64,
) -> (f64, f64) {
    let scale = (viewport_width / width as f64).min(viewport_height / height as f64);
    let scale = scale.max(0.0);
    ((width as f64 * scale).floor(), (height as f64 * scale).floor())
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::{Backend, run_loop};

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Instant;

    use super::{PlatformRequest, PlatformState};
    use crate::pacing::{FpsCounter, FramePacer};
    use crate::{Control, Input, PlatformError, Rgba, WindowConfig, debug};

    /// A window the native frame loop can poll and present to.
    pub trait Backend {
        /// Appends every input received since the previous call.
        fn poll_events(&mut self, events: &mut Vec<Input>);

        fn present(
            &mut self,
            frame_buffer: &[Rgba],
            width: usize,
            height: usize,
        ) -> Result<(), PlatformError>;

        fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), PlatformError>;
    }

    /// Polls, renders, presents and sleeps until the application quits.
    pub fn run_loop<B: Backend>(
        backend: &mut B,
        config: &WindowConfig,
        mut request: impl FnMut(PlatformRequest<'_>) -> Control,
    ) -> Result<(), PlatformError> {
        let (width, height) = (config.width, config.height);
        let mut frame_buffer = vec![Rgba::BLACK; config.pixels()];
        let mut pacer = FramePacer::new(config.frame_interval);
        let mut fps = FpsCounter::default();
        let mut events = Vec::new();
        let mut last_time = Instant::now();

        log::info!("entering frame loop at {width}x{height}");
        loop {
            pacer.begin();

            backend.poll_events(&mut events);
            for input in events.drain(..) {
                match request(PlatformRequest::Input(input)) {
                    Control::Continue => {}
                    Control::Quit => {
                        log::info!("quit requested, leaving frame loop");
                        return Ok(());
                    }
                    Control::Fullscreen(fullscreen) => {
                        log::debug!("switching fullscreen to {fullscreen}");
                        if let Err(err) = backend.set_fullscreen(fullscreen) {
                            log::error!("{err}");
                            return Err(err);
                        }
                    }
                }
            }

            let now = Instant::now();
            let delta = now.duration_since(last_time).as_secs_f32();
            last_time = now;

            let (render_secs, _) = debug::time_secs(|| {
                request(PlatformRequest::Update(PlatformState {
                    delta,
                    frame_buffer: &mut frame_buffer,
                    width,
                    height,
                }))
            });
            let (present_secs, presented) =
                debug::time_secs(|| backend.present(&frame_buffer, width, height));
            log::trace!("render {render_secs:.6}s, present {present_secs:.6}s");
            if let Err(err) = presented {
                log::error!("{err}");
                return Err(err);
            }

            if let Some(rate) = fps.tick(delta) {
                log::debug!("{rate:.2} fps");
            }

            if let Some(delay) = pacer.finish() {
                std::thread::sleep(delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{Control, Headless, KeyCode, PlatformError, WindowConfig};

    fn config() -> WindowConfig {
        WindowConfig {
            width: 2,
            height: 2,
            frame_interval: Duration::from_millis(1),
            ..Default::default()
        }
    }

    /// Paints every pixel with the frame number and quits on Escape.
    fn counting() -> impl FnMut(PlatformRequest<'_>) -> Control {
        let mut frame = 0u8;
        move |request| match request {
            PlatformRequest::Input(Input::Key {
                code: KeyCode::Escape,
                pressed: true,
                ..
            })
            | PlatformRequest::Input(Input::CloseRequested) => Control::Quit,
            PlatformRequest::Input(Input::Key {
                code: KeyCode::KeyF,
                pressed: true,
                ..
            }) => Control::Fullscreen(true),
            PlatformRequest::Input(_) => Control::Continue,
            PlatformRequest::Update(state) => {
                state.frame_buffer.fill(Rgba::rgb(frame, 0, 0));
                frame += 1;
                Control::Continue
            }
        }
    }

    #[test_log::test]
    fn renders_until_close() {
        let mut backend = Headless::idle(3).recording();
        run_loop(&mut backend, &config(), counting()).unwrap();

        assert_eq!(backend.presented(), 3);
        let reds: Vec<u8> = backend.frames().iter().map(|f| f[0].r).collect();
        assert_eq!(reds, [0, 1, 2]);
    }

    #[test_log::test]
    fn quit_skips_the_pending_frame() {
        let mut backend = Headless::new([
            vec![],
            vec![Input::key_down(KeyCode::Escape), Input::key_down(KeyCode::KeyF)],
            vec![],
        ]);
        run_loop(&mut backend, &config(), counting()).unwrap();

        assert_eq!(backend.presented(), 1);
        assert!(backend.fullscreen_requests().is_empty());
    }

    #[test_log::test]
    fn applies_fullscreen_before_rendering() {
        let mut backend = Headless::new([vec![Input::key_down(KeyCode::KeyF)]]);
        run_loop(&mut backend, &config(), counting()).unwrap();

        assert_eq!(backend.fullscreen_requests(), [true]);
        assert!(backend.is_fullscreen());
        assert_eq!(backend.presented(), 1);
    }

    #[test_log::test]
    fn present_failure_ends_loop() {
        let mut backend = Headless::idle(10).fail_present_after(2);
        let err = run_loop(&mut backend, &config(), counting()).unwrap_err();

        assert!(matches!(err, PlatformError::Present(_)));
        assert_eq!(backend.presented(), 2);
    }

    #[test_log::test]
    fn fullscreen_failure_ends_loop() {
        let mut backend =
            Headless::new([vec![Input::key_down(KeyCode::KeyF)], vec![]]).fail_fullscreen();
        let err = run_loop(&mut backend, &config(), counting()).unwrap_err();

        assert!(matches!(err, PlatformError::Fullscreen { entering: true, .. }));
        assert_eq!(backend.presented(), 0);
    }

    #[test]
    fn fits_square_into_landscape_viewport() {
        assert_eq!(fit_to_viewport(256, 256, 1920.0, 1080.0), (1080.0, 1080.0));
    }

    #[test]
    fn keeps_aspect_in_portrait_viewport() {
        assert_eq!(fit_to_viewport(320, 240, 400.0, 900.0), (400.0, 300.0));
    }

    #[test]
    fn shrinks_into_a_small_viewport() {
        assert_eq!(fit_to_viewport(256, 256, 100.0, 50.0), (50.0, 50.0));
    }

    #[test]
    fn collapses_in_an_empty_viewport() {
        assert_eq!(fit_to_viewport(256, 256, 0.0, 0.0), (0.0, 0.0));
        assert_eq!(fit_to_viewport(256, 256, 800.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn letterboxes_wide_canvas_in_square_viewport() {
        assert_eq!(fit_to_viewport(320, 240, 800.0, 800.0), (800.0, 600.0));
    }

    #[test]
    fn rounds_down_to_whole_pixels() {
        assert_eq!(fit_to_viewport(3, 2, 10.0, 10.0), (10.0, 6.0));
    }
}
