use std::time::Duration;

use clap::Parser;
use harling::WindowConfig;

use crate::square::RenderMode;

pub const TITLE: &str = "Lime harling";

const MAX_SIDE: i64 = WindowConfig::MAX_DIMENSION as i64;

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "lime-harling",
    about = "A colourful square that changes colour over time"
)]
pub struct Config {
    /// Frame buffer width in pixels.
    #[arg(short = 'W', long, default_value_t = 256, value_parser = clap::value_parser!(u32).range(1..=MAX_SIDE))]
    pub width: u32,

    /// Frame buffer height in pixels.
    #[arg(short = 'H', long, default_value_t = 256, value_parser = clap::value_parser!(u32).range(1..=MAX_SIDE))]
    pub height: u32,

    /// Window scale in windowed mode (1, 2, 4, 8, 16 or 32).
    #[arg(short, long, default_value_t = 1, value_parser = parse_scale)]
    pub scale: usize,

    /// Window title.
    #[arg(long, default_value = TITLE)]
    pub title: String,

    /// Target frame period in milliseconds.
    #[arg(long = "frame-ms", default_value_t = 17, value_parser = clap::value_parser!(u64).range(1..))]
    pub frame_ms: u64,

    /// How the square is drawn into the frame buffer.
    #[arg(short, long, value_enum, default_value_t = RenderMode::Buffer)]
    pub render: RenderMode,

    /// Keep the window at its initial size.
    #[arg(long)]
    pub fixed_size: bool,

    /// Render this many frames without opening a window, then exit.
    #[arg(long, value_name = "FRAMES")]
    pub headless: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_from(["lime-harling"])
    }
}

impl Config {
    pub fn window(&self) -> WindowConfig {
        WindowConfig {
            title: self.title.clone(),
            width: self.width as usize,
            height: self.height as usize,
            scale: self.scale,
            frame_interval: Duration::from_millis(self.frame_ms),
            resizable: !self.fixed_size,
        }
    }
}

fn parse_scale(arg: &str) -> Result<usize, String> {
    let scale: usize = arg.parse().map_err(|err| format!("{err}"))?;
    if WindowConfig::SCALES.contains(&scale) {
        Ok(scale)
    } else {
        Err(format!("{scale} is not one of {:?}", WindowConfig::SCALES))
    }
}
