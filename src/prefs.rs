use crate::config::{LineStyle, SceneStyle};
use crate::visual::VisualOptions;
use std::fmt;
use std::path::{Path, PathBuf};

/// The runtime-adjustable visual options, persisted between sessions as a
/// small `key=value` file. Gradient colors stay CLI-only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualPrefs {
    pub scene: SceneStyle,
    pub line_style: LineStyle,
    pub gradient: bool,
    pub bars: bool,
    pub ring: bool,
    pub waveform: bool,
    pub pulse_lines: bool,
    pub ring_gradient: bool,
    pub noise: bool,
    pub invert: bool,
    pub grayscale: bool,
    pub threshold: bool,
    pub emboss: bool,
    pub beat_threshold: f32,
}

impl Default for VisualPrefs {
    fn default() -> Self {
        Self {
            scene: SceneStyle::Bright,
            line_style: LineStyle::Default,
            gradient: true,
            bars: true,
            ring: true,
            waveform: true,
            pulse_lines: true,
            ring_gradient: true,
            noise: false,
            invert: false,
            grayscale: false,
            threshold: false,
            emboss: false,
            beat_threshold: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrefsError {
    Io(String),
    Parse { line: usize, message: String },
}

impl fmt::Display for PrefsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Parse { line, message } => write!(f, "parse error at line {line}: {message}"),
        }
    }
}

impl std::error::Error for PrefsError {}

impl VisualPrefs {
    pub fn from_options(opts: &VisualOptions) -> Self {
        Self {
            scene: opts.scene,
            line_style: opts.line_style,
            gradient: opts.show_gradient,
            bars: opts.show_bars,
            ring: opts.show_ring,
            waveform: opts.show_waveform,
            pulse_lines: opts.pulse_lines,
            ring_gradient: opts.ring_gradient,
            noise: opts.fx.noise,
            invert: opts.fx.invert,
            grayscale: opts.fx.grayscale,
            threshold: opts.fx.threshold,
            emboss: opts.fx.emboss,
            beat_threshold: opts.beat_threshold,
        }
    }

    pub fn apply_to(&self, opts: &mut VisualOptions) {
        opts.scene = self.scene;
        opts.line_style = self.line_style;
        opts.show_gradient = self.gradient;
        opts.show_bars = self.bars;
        opts.show_ring = self.ring;
        opts.show_waveform = self.waveform;
        opts.pulse_lines = self.pulse_lines;
        opts.ring_gradient = self.ring_gradient;
        opts.fx.noise = self.noise;
        opts.fx.invert = self.invert;
        opts.fx.grayscale = self.grayscale;
        opts.fx.threshold = self.threshold;
        opts.fx.emboss = self.emboss;
        opts.beat_threshold = self.beat_threshold;
    }

    pub fn parse(text: &str) -> Result<Self, PrefsError> {
        let mut prefs = Self::default();
        for (line_idx, raw) in text.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key_raw, value_raw)) = line.split_once('=') else {
                return Err(PrefsError::Parse {
                    line: line_no,
                    message: "expected <key>=<value>".to_string(),
                });
            };
            let key = key_raw.trim();
            let value = value_raw.trim();
            let bad = |message: String| PrefsError::Parse {
                line: line_no,
                message,
            };
            match key {
                "scene" => {
                    prefs.scene = match value.to_ascii_lowercase().as_str() {
                        "bright" => SceneStyle::Bright,
                        "deep" => SceneStyle::Deep,
                        _ => return Err(bad(format!("scene must be bright/deep, got {value:?}"))),
                    };
                }
                "line_style" => {
                    prefs.line_style = match value.to_ascii_lowercase().as_str() {
                        "default" => LineStyle::Default,
                        "average" => LineStyle::Average,
                        "smooth" => LineStyle::Smooth,
                        _ => {
                            return Err(bad(format!(
                                "line_style must be default/average/smooth, got {value:?}"
                            )));
                        }
                    };
                }
                "beat_threshold" => {
                    let v: f32 = value
                        .parse()
                        .map_err(|_| bad(format!("beat_threshold must be a number, got {value:?}")))?;
                    if !v.is_finite() || v < 0.0 {
                        return Err(bad("beat_threshold must be finite and >= 0".to_string()));
                    }
                    prefs.beat_threshold = v;
                }
                "gradient" | "bars" | "ring" | "waveform" | "pulse_lines" | "ring_gradient"
                | "noise" | "invert" | "grayscale" | "threshold" | "emboss" => {
                    let v = parse_bool(value)
                        .ok_or_else(|| bad(format!("{key} must be true/false")))?;
                    match key {
                        "gradient" => prefs.gradient = v,
                        "bars" => prefs.bars = v,
                        "ring" => prefs.ring = v,
                        "waveform" => prefs.waveform = v,
                        "pulse_lines" => prefs.pulse_lines = v,
                        "ring_gradient" => prefs.ring_gradient = v,
                        "noise" => prefs.noise = v,
                        "invert" => prefs.invert = v,
                        "grayscale" => prefs.grayscale = v,
                        "threshold" => prefs.threshold = v,
                        "emboss" => prefs.emboss = v,
                        _ => unreachable!(),
                    }
                }
                _ => {}
            }
        }
        Ok(prefs)
    }

    pub fn to_text(&self) -> String {
        format!(
            "# ring_visualizer runtime prefs v1\n\
             scene={}\n\
             line_style={}\n\
             gradient={}\n\
             bars={}\n\
             ring={}\n\
             waveform={}\n\
             pulse_lines={}\n\
             ring_gradient={}\n\
             noise={}\n\
             invert={}\n\
             grayscale={}\n\
             threshold={}\n\
             emboss={}\n\
             beat_threshold={}\n",
            self.scene.label(),
            self.line_style.label(),
            self.gradient,
            self.bars,
            self.ring,
            self.waveform,
            self.pulse_lines,
            self.ring_gradient,
            self.noise,
            self.invert,
            self.grayscale,
            self.threshold,
            self.emboss,
            self.beat_threshold,
        )
    }

    pub fn load(path: Option<&Path>) -> Result<Self, PrefsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = match std::fs::read_to_string(path) {
            Ok(v) => v,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(PrefsError::Io(err.to_string())),
        };

        Self::parse(&text)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<(), PrefsError> {
        let Some(path) = path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PrefsError::Io(e.to_string()))?;
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, self.to_text()).map_err(|e| PrefsError::Io(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| PrefsError::Io(e.to_string()))
    }
}

pub fn prefs_storage_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return Some(PathBuf::from(xdg).join("ring_visualizer").join("prefs.txt"));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("ring_visualizer")
            .join("prefs.txt"),
    )
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
