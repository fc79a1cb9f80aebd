pub mod config;
pub mod square;

use harling::{Control, Input, KeyCode, PlatformInput, PlatformUpdate};

pub use config::Config;
use square::{RenderMode, Shift, render_square};

pub const USAGE: [&str; 2] = [
    "Press the Q or Esc key to end the animation",
    "Press the F key for full screen",
];

#[derive(Debug, Default)]
pub struct Memory {
    pub shift: Shift,
    pub fullscreen: bool,
    pub render_mode: RenderMode,
}

impl Memory {
    pub fn new(render_mode: RenderMode) -> Self {
        Self {
            render_mode,
            ..Default::default()
        }
    }
}

pub fn handle_input(PlatformInput { memory, input }: PlatformInput<Memory>) -> Control {
    match input {
        Input::CloseRequested => Control::Quit,
        Input::Key {
            code: KeyCode::Escape | KeyCode::KeyQ,
            pressed: true,
            ..
        } => Control::Quit,
        Input::Key {
            code: KeyCode::KeyF,
            pressed: true,
            repeat: false,
        } => {
            memory.fullscreen = !memory.fullscreen;
            Control::Fullscreen(memory.fullscreen)
        }
        Input::FullscreenChanged(fullscreen) => {
            memory.fullscreen = fullscreen;
            Control::Continue
        }
        Input::Resized { width, height } => {
            log::debug!("window resized to {width}x{height}");
            Control::Continue
        }
        Input::Key { .. } => Control::Continue,
    }
}

pub fn update_and_render(
    PlatformUpdate {
        memory,
        frame_buffer,
        width,
        height,
        ..
    }: PlatformUpdate<Memory>,
) {
    render_square(
        frame_buffer,
        width,
        height,
        memory.shift.value(),
        memory.render_mode,
    );
    memory.shift.advance();
}
