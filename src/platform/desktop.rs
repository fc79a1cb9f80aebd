use minifb::{Key, KeyRepeat, Scale, ScaleMode, Window, WindowOptions};

use crate::platform::Backend;
use crate::{Input, KeyCode, PlatformError, Rgba, WindowConfig};

/// A `minifb` window.
///
/// Fullscreen is a borderless, topmost window scaled to fit the screen.
/// Exclusive fullscreen misbehaves on multi-monitor desktops, so switching
/// mode recreates the window instead.
pub struct Desktop {
    window: Window,
    title: String,
    width: usize,
    height: usize,
    scale: Scale,
    resizable: bool,
    fullscreen: bool,
    size: (usize, usize),
    pixels: Vec<u32>,
}

impl Desktop {
    pub fn new(config: &WindowConfig) -> Result<Self, PlatformError> {
        let scale = match config.scale {
            1 => Scale::X1,
            2 => Scale::X2,
            4 => Scale::X4,
            8 => Scale::X8,
            16 => Scale::X16,
            32 => Scale::X32,
            other => {
                return Err(PlatformError::InvalidConfig(format!(
                    "unsupported window scale {other}"
                )));
            }
        };

        let mut desktop = Self {
            window: open(
                &config.title,
                config.width,
                config.height,
                windowed(scale, config.resizable),
            )
            .map_err(PlatformError::Window)?,
            title: config.title.clone(),
            width: config.width,
            height: config.height,
            scale,
            resizable: config.resizable,
            fullscreen: false,
            size: (0, 0),
            pixels: vec![0; config.pixels()],
        };
        desktop.size = desktop.window.get_size();
        log::info!(
            "opened {}x{} window \"{}\"",
            desktop.size.0,
            desktop.size.1,
            desktop.title
        );
        Ok(desktop)
    }
}

fn open(
    title: &str,
    width: usize,
    height: usize,
    options: WindowOptions,
) -> Result<Window, String> {
    let mut window = Window::new(title, width, height, options).map_err(|err| err.to_string())?;
    // The frame loop does its own pacing.
    window.set_target_fps(0);
    Ok(window)
}

fn windowed(scale: Scale, resizable: bool) -> WindowOptions {
    WindowOptions {
        resize: resizable,
        scale,
        scale_mode: ScaleMode::Stretch,
        ..WindowOptions::default()
    }
}

fn borderless_fullscreen() -> WindowOptions {
    WindowOptions {
        borderless: true,
        title: false,
        topmost: true,
        scale: Scale::FitScreen,
        scale_mode: ScaleMode::Stretch,
        ..WindowOptions::default()
    }
}

impl Backend for Desktop {
    fn poll_events(&mut self, events: &mut Vec<Input>) {
        if !self.window.is_open() {
            events.push(Input::CloseRequested);
            return;
        }

        events.extend(
            self.window
                .get_keys_pressed(KeyRepeat::No)
                .into_iter()
                .map(|key| Input::key_down(key_code(key))),
        );
        events.extend(
            self.window
                .get_keys_released()
                .into_iter()
                .map(|key| Input::key_up(key_code(key))),
        );

        let size = self.window.get_size();
        if size != self.size {
            self.size = size;
            events.push(Input::Resized {
                width: size.0,
                height: size.1,
            });
        }
    }

    fn present(
        &mut self,
        frame_buffer: &[Rgba],
        width: usize,
        height: usize,
    ) -> Result<(), PlatformError> {
        self.pixels.resize(frame_buffer.len(), 0);
        for (dst, src) in self.pixels.iter_mut().zip(frame_buffer) {
            *dst = src.to_0rgb();
        }
        self.window
            .update_with_buffer(&self.pixels, width, height)
            .map_err(|err| PlatformError::Present(err.to_string()))
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), PlatformError> {
        if fullscreen == self.fullscreen {
            return Ok(());
        }

        let options = if fullscreen {
            borderless_fullscreen()
        } else {
            windowed(self.scale, self.resizable)
        };
        self.window = open(&self.title, self.width, self.height, options).map_err(|reason| {
            PlatformError::Fullscreen {
                entering: fullscreen,
                reason,
            }
        })?;
        self.fullscreen = fullscreen;
        self.size = self.window.get_size();
        log::debug!(
            "{} fullscreen, window is now {}x{}",
            if fullscreen { "entered" } else { "left" },
            self.size.0,
            self.size.1
        );
        Ok(())
    }
}

fn key_code(key: Key) -> KeyCode {
    match key {
        Key::A => KeyCode::KeyA,
        Key::B => KeyCode::KeyB,
        Key::C => KeyCode::KeyC,
        Key::D => KeyCode::KeyD,
        Key::E => KeyCode::KeyE,
        Key::F => KeyCode::KeyF,
        Key::G => KeyCode::KeyG,
        Key::H => KeyCode::KeyH,
        Key::I => KeyCode::KeyI,
        Key::J => KeyCode::KeyJ,
        Key::K => KeyCode::KeyK,
        Key::L => KeyCode::KeyL,
        Key::M => KeyCode::KeyM,
        Key::N => KeyCode::KeyN,
        Key::O => KeyCode::KeyO,
        Key::P => KeyCode::KeyP,
        Key::Q => KeyCode::KeyQ,
        Key::R => KeyCode::KeyR,
        Key::S => KeyCode::KeyS,
        Key::T => KeyCode::KeyT,
        Key::U => KeyCode::KeyU,
        Key::V => KeyCode::KeyV,
        Key::W => KeyCode::KeyW,
        Key::X => KeyCode::KeyX,
        Key::Y => KeyCode::KeyY,
        Key::Z => KeyCode::KeyZ,
        Key::Key0 => KeyCode::Num0,
        Key::Key1 => KeyCode::Num1,
        Key::Key2 => KeyCode::Num2,
        Key::Key3 => KeyCode::Num3,
        Key::Key4 => KeyCode::Num4,
        Key::Key5 => KeyCode::Num5,
        Key::Key6 => KeyCode::Num6,
        Key::Key7 => KeyCode::Num7,
        Key::Key8 => KeyCode::Num8,
        Key::Key9 => KeyCode::Num9,
        Key::Escape => KeyCode::Escape,
        Key::Enter | Key::NumPadEnter => KeyCode::Return,
        Key::Tab => KeyCode::Tab,
        Key::Space => KeyCode::Spacebar,
        Key::Left => KeyCode::LeftArrow,
        Key::Right => KeyCode::RightArrow,
        Key::Up => KeyCode::UpArrow,
        Key::Down => KeyCode::DownArrow,
        _ => KeyCode::Unknown,
    }
}
