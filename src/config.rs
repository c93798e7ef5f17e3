use crate::visual::Rgb;
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(name = "ring-visualizer", version, about = "Audio-reactive ring spectrum visualizer for the terminal")]
pub struct Config {
    /// Substring match against input device names; default input otherwise.
    #[arg(long)]
    pub device: Option<String>,

    #[arg(long, default_value_t = false)]
    pub list_devices: bool,

    /// Analysis window size (power of two, 32..=32768). The spectrum and
    /// waveform buffers each hold fft_size / 2 bytes.
    #[arg(long, default_value_t = 256)]
    pub fft_size: usize,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, value_enum, default_value_t = SceneStyle::Bright)]
    pub scene: SceneStyle,

    #[arg(long, value_enum, default_value_t = LineStyle::Default)]
    pub line_style: LineStyle,

    /// How far the summed spectrum must rise above its running average
    /// (within the 200 ms cooldown window) to register a beat.
    #[arg(long, default_value_t = 200.0)]
    pub beat_threshold: f32,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub gradient: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub bars: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub ring: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub waveform: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub pulse_lines: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub ring_gradient: bool,

    #[arg(long, default_value_t = false)]
    pub noise: bool,

    #[arg(long, default_value_t = false)]
    pub invert: bool,

    #[arg(long, default_value_t = false)]
    pub grayscale: bool,

    #[arg(long, default_value_t = false)]
    pub threshold: bool,

    #[arg(long, default_value_t = false)]
    pub emboss: bool,

    // Ring gradient stops, innermost first, as #rrggbb.
    #[arg(long, default_value = "#ff0000")]
    pub color_a: Rgb,

    #[arg(long, default_value = "#ff7f00")]
    pub color_b: Rgb,

    #[arg(long, default_value = "#ffff00")]
    pub color_c: Rgb,

    #[arg(long, default_value = "#00ff00")]
    pub color_d: Rgb,

    #[arg(long, default_value = "#0000ff")]
    pub color_e: Rgb,

    #[arg(long, default_value = "#2e2b5f")]
    pub color_f: Rgb,

    #[arg(long, default_value = "#8b00ff")]
    pub color_g: Rgb,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    /// Load saved runtime options at startup and save them on exit.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub prefs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(alias = "ansi", alias = "text")]
    Ascii,
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    #[value(alias = "hires", alias = "dots")]
    Braille,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneStyle {
    /// White bar halo behind the ring.
    Bright,
    /// Ring over deep-blue bars, pulse trail filled beneath it.
    Deep,
}

impl SceneStyle {
    pub fn label(self) -> &'static str {
        match self {
            Self::Bright => "bright",
            Self::Deep => "deep",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LineStyle {
    Default,
    Average,
    Smooth,
}

impl LineStyle {
    pub fn next(self) -> Self {
        match self {
            Self::Default => Self::Average,
            Self::Average => Self::Smooth,
            Self::Smooth => Self::Default,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Average => "average",
            Self::Smooth => "smooth",
        }
    }
}
