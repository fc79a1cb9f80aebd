use core::time::Duration;

pub mod debug;
pub mod error;
pub mod pacing;
pub mod platform;

pub use error::PlatformError;
#[cfg(not(target_arch = "wasm32"))]
pub use platform::{Backend, headless::Headless};

/// Application entry point. Owns the user memory until [`App::run`] hands it
/// to the platform backend for the compile target.
pub struct App<T> {
    memory: T,
    config: WindowConfig,
}

impl<T: 'static> App<T> {
    pub fn new(memory: T, config: WindowConfig) -> Self {
        Self { memory, config }
    }

    /// Opens a window and runs until the application returns [`Control::Quit`]
    /// or the window is closed.
    pub fn run(
        self,
        handle_input: fn(PlatformInput<T>) -> Control,
        update_and_render: fn(PlatformUpdate<T>),
    ) -> Result<(), PlatformError> {
        self.config.validate()?;

        #[cfg(target_os = "macos")]
        {
            let request = request_handler(self.memory, handle_input, update_and_render);
            platform::appkit::run(request, &self.config)
        }

        #[cfg(target_arch = "wasm32")]
        {
            let request = request_handler(self.memory, handle_input, update_and_render);
            platform::wasm::run(request, &self.config)
        }

        #[cfg(not(any(target_os = "macos", target_arch = "wasm32")))]
        {
            let mut backend = platform::desktop::Desktop::new(&self.config)?;
            self.run_with(&mut backend, handle_input, update_and_render)
        }
    }

    /// Runs the native frame loop against an arbitrary [`Backend`].
    #[cfg(not(target_arch = "wasm32"))]
    pub fn run_with<B: Backend>(
        self,
        backend: &mut B,
        handle_input: fn(PlatformInput<T>) -> Control,
        update_and_render: fn(PlatformUpdate<T>),
    ) -> Result<(), PlatformError> {
        self.config.validate()?;
        let config = self.config;
        let request = request_handler(self.memory, handle_input, update_and_render);
        platform::run_loop(backend, &config, request)
    }
}

fn request_handler<T>(
    mut memory: T,
    handle_input: fn(PlatformInput<T>) -> Control,
    update_and_render: fn(PlatformUpdate<T>),
) -> impl FnMut(platform::PlatformRequest<'_>) -> Control + 'static
where
    T: 'static,
{
    move |request| match request {
        platform::PlatformRequest::Input(input) => handle_input(PlatformInput {
            memory: &mut memory,
            input,
        }),
        platform::PlatformRequest::Update(state) => {
            update_and_render(PlatformUpdate {
                memory: &mut memory,
                frame_buffer: state.frame_buffer,
                width: state.width,
                height: state.height,
                delta: state.delta,
            });
            Control::Continue
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    /// Frame buffer width in pixels.
    pub width: usize,
    /// Frame buffer height in pixels.
    pub height: usize,
    /// Integer window scale used in windowed mode.
    pub scale: usize,
    /// Target frame period. The native loop sleeps off whatever is left of it.
    pub frame_interval: Duration,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::from("harling"),
            width: 256,
            height: 256,
            scale: 1,
            frame_interval: Duration::from_millis(17),
            resizable: true,
        }
    }
}

impl WindowConfig {
    pub const SCALES: [usize; 6] = [1, 2, 4, 8, 16, 32];
    /// Largest frame buffer side, in pixels.
    pub const MAX_DIMENSION: usize = 16_384;
    /// Largest frame buffer, in pixels (256 MiB of `Rgba`).
    pub const MAX_PIXELS: usize = 1 << 26;

    pub fn validate(&self) -> Result<(), PlatformError> {
        if self.width == 0 || self.height == 0 {
            return Err(PlatformError::InvalidConfig(format!(
                "frame buffer must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        let pixels = self.width.checked_mul(self.height);
        if self.width > Self::MAX_DIMENSION
            || self.height > Self::MAX_DIMENSION
            || pixels.is_none_or(|pixels| pixels > Self::MAX_PIXELS)
        {
            return Err(PlatformError::InvalidConfig(format!(
                "frame buffer {}x{} exceeds {} pixels per side or {} pixels in total",
                self.width,
                self.height,
                Self::MAX_DIMENSION,
                Self::MAX_PIXELS
            )));
        }
        if !Self::SCALES.contains(&self.scale) {
            return Err(PlatformError::InvalidConfig(format!(
                "unsupported window scale {}",
                self.scale
            )));
        }
        Ok(())
    }

    pub fn pixels(&self) -> usize {
        self.width * self.height
    }
}

pub struct PlatformInput<'a, T> {
    pub memory: &'a mut T,
    pub input: Input,
}

pub struct PlatformUpdate<'a, T> {
    pub memory: &'a mut T,
    pub frame_buffer: &'a mut [Rgba],
    pub width: usize,
    pub height: usize,
    /// Seconds since the previous update.
    pub delta: f32,
}

/// What the application wants from the platform after handling an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
    Fullscreen(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key {
        code: KeyCode,
        pressed: bool,
        repeat: bool,
    },
    Resized {
        width: usize,
        height: usize,
    },
    /// The window entered or left fullscreen, whoever asked for it.
    FullscreenChanged(bool),
    CloseRequested,
}

impl Input {
    pub fn key_down(code: KeyCode) -> Self {
        Self::Key {
            code,
            pressed: true,
            repeat: false,
        }
    }

    pub fn key_up(code: KeyCode) -> Self {
        Self::Key {
            code,
            pressed: false,
            repeat: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Escape,
    Return,
    Tab,
    Spacebar,
    LeftArrow,
    RightArrow,
    UpArrow,
    DownArrow,
    Unknown,
}

impl KeyCode {
    /// Maps a DOM `KeyboardEvent.code` string.
    pub fn from_dom_code(code: &str) -> Self {
        match code {
            "KeyA" => Self::KeyA,
            "KeyB" => Self::KeyB,
            "KeyC" => Self::KeyC,
            "KeyD" => Self::KeyD,
            "KeyE" => Self::KeyE,
            "KeyF" => Self::KeyF,
            "KeyG" => Self::KeyG,
            "KeyH" => Self::KeyH,
            "KeyI" => Self::KeyI,
            "KeyJ" => Self::KeyJ,
            "KeyK" => Self::KeyK,
            "KeyL" => Self::KeyL,
            "KeyM" => Self::KeyM,
            "KeyN" => Self::KeyN,
            "KeyO" => Self::KeyO,
            "KeyP" => Self::KeyP,
            "KeyQ" => Self::KeyQ,
            "KeyR" => Self::KeyR,
            "KeyS" => Self::KeyS,
            "KeyT" => Self::KeyT,
            "KeyU" => Self::KeyU,
            "KeyV" => Self::KeyV,
            "KeyW" => Self::KeyW,
            "KeyX" => Self::KeyX,
            "KeyY" => Self::KeyY,
            "KeyZ" => Self::KeyZ,
            "Digit0" => Self::Num0,
            "Digit1" => Self::Num1,
            "Digit2" => Self::Num2,
            "Digit3" => Self::Num3,
            "Digit4" => Self::Num4,
            "Digit5" => Self::Num5,
            "Digit6" => Self::Num6,
            "Digit7" => Self::Num7,
            "Digit8" => Self::Num8,
            "Digit9" => Self::Num9,
            "Escape" => Self::Escape,
            "Enter" | "NumpadEnter" => Self::Return,
            "Tab" => Self::Tab,
            "Space" => Self::Spacebar,
            "ArrowLeft" => Self::LeftArrow,
            "ArrowRight" => Self::RightArrow,
            "ArrowUp" => Self::UpArrow,
            "ArrowDown" => Self::DownArrow,
            _ => Self::Unknown,
        }
    }
}

/// A frame buffer pixel, laid out as the bytes `r g b a`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, u8::MAX)
    }

    /// Packs into `0x00RRGGBB`, alpha dropped.
    pub const fn to_0rgb(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

pub fn as_bytes(frame_buffer: &[Rgba]) -> &[u8] {
    bytemuck::cast_slice(frame_buffer)
}
