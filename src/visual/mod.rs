mod canvas;
mod geometry;
mod postfx;
mod pulse;
mod signal;

use crate::config::{Config, LineStyle, SceneStyle};

pub use canvas::{Canvas, Paint, Point, Rgb};
pub use geometry::{bin_angle, line_averaged, line_default, line_smooth, MIN_RADIUS};
pub use postfx::{NOISE_COLOR, PostFx, apply_post_fx};
pub use pulse::{AGE_STEP, MAX_AGE, PulseLine, PulseTrail};
pub use signal::{BEAT_COOLDOWN_MS, SignalTracker, blend_running_average, mean_of};

/// Backdrop gradient, top to bottom.
pub const BACKDROP_STOPS: [(f32, Rgb); 5] = [
    (0.0, Rgb::new(0xfa, 0xf5, 0xe3)),
    (0.25, Rgb::new(0xda, 0xf2, 0xef)),
    (0.5, Rgb::new(0x67, 0xe6, 0xd6)),
    (0.75, Rgb::new(0x3a, 0xb4, 0xc7)),
    (1.0, Rgb::new(0x21, 0x65, 0x8f)),
];

const DEEP_BAR_COLOR: Rgb = Rgb::new(0, 25, 50);

/// Flat per-frame configuration. The visualizer never mutates it; the app
/// layer rebuilds it when a key toggle or pref changes.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualOptions {
    pub scene: SceneStyle,
    pub line_style: LineStyle,
    pub show_gradient: bool,
    pub show_bars: bool,
    pub show_ring: bool,
    pub show_waveform: bool,
    pub pulse_lines: bool,
    pub ring_gradient: bool,
    pub fx: PostFx,
    pub ring_colors: [Rgb; 7],
    pub beat_threshold: f32,
}

impl VisualOptions {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            scene: cfg.scene,
            line_style: cfg.line_style,
            show_gradient: cfg.gradient,
            show_bars: cfg.bars,
            show_ring: cfg.ring,
            show_waveform: cfg.waveform,
            pulse_lines: cfg.pulse_lines,
            ring_gradient: cfg.ring_gradient,
            fx: PostFx {
                noise: cfg.noise,
                invert: cfg.invert,
                grayscale: cfg.grayscale,
                threshold: cfg.threshold,
                emboss: cfg.emboss,
            },
            ring_colors: [
                cfg.color_a,
                cfg.color_b,
                cfg.color_c,
                cfg.color_d,
                cfg.color_e,
                cfg.color_f,
                cfg.color_g,
            ],
            beat_threshold: cfg.beat_threshold,
        }
    }
}

/// One frame's borrowed inputs.
pub struct FrameInput<'a> {
    pub spectrum: &'a [u8],
    pub waveform: &'a [u8],
    /// Millisecond-of-second reading for this frame (0..=999).
    pub now_ms: u32,
}

/// Owns all cross-frame state: the beat tracker, the pulse trail and the
/// random source (seedable, so tests can pin jitter and noise).
pub struct Visualizer {
    signal: SignalTracker,
    trail: PulseTrail,
    rng: fastrand::Rng,
}

impl Visualizer {
    pub fn new(now_ms: u32) -> Self {
        Self::with_rng(now_ms, fastrand::Rng::new())
    }

    pub fn with_rng(now_ms: u32, rng: fastrand::Rng) -> Self {
        Self {
            signal: SignalTracker::new(now_ms),
            trail: PulseTrail::new(),
            rng,
        }
    }

    pub fn running_average(&self) -> f32 {
        self.signal.running_average()
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Draw one frame into `pixels` (RGBA, `w * h * 4` bytes). Returns true
    /// when this frame registered a beat.
    pub fn render(
        &mut self,
        input: &FrameInput<'_>,
        opts: &VisualOptions,
        pixels: &mut [u8],
        w: usize,
        h: usize,
    ) -> bool {
        let frame_len = w.saturating_mul(h).saturating_mul(4);
        if w == 0 || h == 0 || pixels.len() < frame_len {
            return false;
        }

        let mut beat = false;
        {
            let mut canvas = Canvas::new(&mut pixels[..frame_len], w, h);
            canvas.clear(Rgb::BLACK);

            if opts.show_gradient {
                let paint = Paint::linear_y(0.0, h as f32, &BACKDROP_STOPS);
                canvas.fill_rect(0.0, 0.0, w as f32, h as f32, &paint);
            }

            match opts.scene {
                SceneStyle::Bright => {
                    if opts.show_bars {
                        draw_bars(&mut canvas, input.spectrum, &BarVariant::bright(w as f32));
                    }
                    beat = self.draw_spectrum_ring(&mut canvas, input, opts);
                }
                SceneStyle::Deep => {
                    beat = self.draw_spectrum_ring(&mut canvas, input, opts);
                    if opts.show_bars {
                        draw_bars(&mut canvas, input.spectrum, &BarVariant::deep(w as f32));
                    }
                }
            }

            if opts.show_waveform {
                draw_waveform(&mut canvas, input.waveform);
            }
        }

        postfx::apply_post_fx(&opts.fx, &mut pixels[..frame_len], w, &mut self.rng);
        beat
    }

    /// The ring pass also owns the beat clock, so hiding the ring freezes
    /// detection along with it.
    fn draw_spectrum_ring(
        &mut self,
        canvas: &mut Canvas<'_>,
        input: &FrameInput<'_>,
        opts: &VisualOptions,
    ) -> bool {
        if !opts.show_ring {
            return false;
        }
        let spectrum = input.spectrum;
        let w = canvas.width() as f32;
        let h = canvas.height() as f32;
        let max_radius = (w / 2.0).min(h / 2.0);
        let num_values = spectrum.len().saturating_sub(12);

        self.signal.tick(input.now_ms);
        let beat = self.signal.detect_pulse(spectrum, opts.beat_threshold);
        if num_values < 2 {
            return beat;
        }
        let average = signal::mean_of(spectrum, num_values);

        canvas.save();
        canvas.translate(w / 2.0, h / 1.75);
        canvas.rotate((-90.0f32).to_radians());

        if opts.scene == SceneStyle::Deep && opts.pulse_lines {
            self.trail.draw(canvas, &mut self.rng, true);
        }

        let pts = match opts.line_style {
            LineStyle::Default => geometry::line_default(spectrum, num_values, max_radius),
            LineStyle::Average => {
                geometry::line_averaged(spectrum, num_values, average, max_radius, w / 2.0)
            }
            LineStyle::Smooth => geometry::line_smooth(spectrum, num_values, max_radius),
        };

        if beat && opts.pulse_lines {
            self.trail.push(pts.clone());
        }

        canvas.stroke_polyline(&pts, 1.0, &Paint::solid(Rgb::BLACK));
        let fill = if opts.ring_gradient {
            ring_gradient_paint(canvas, &opts.ring_colors, self.signal.app_time(), max_radius)
        } else {
            Paint::solid(Rgb::WHITE)
        };
        canvas.fill_polygon(&pts, &fill);

        if opts.scene == SceneStyle::Bright && opts.pulse_lines {
            self.trail.draw(canvas, &mut self.rng, false);
        }

        canvas.restore();
        beat
    }
}

/// Radial rainbow whose stop offsets walk a full cycle once per second.
fn ring_gradient_paint(
    canvas: &Canvas<'_>,
    colors: &[Rgb; 7],
    app_time_ms: f32,
    max_radius: f32,
) -> Paint {
    let change = (app_time_ms % 1000.0) / 1000.0;
    let mut stops = [(0.0f32, Rgb::BLACK); 7];
    for (k, (stop, &color)) in stops.iter_mut().zip(colors).enumerate() {
        let mut off = k as f32 / 7.0 + change;
        if off > 1.0 {
            off -= 1.0;
        }
        *stop = (off, color);
    }
    let (cx, cy) = canvas.to_device(0.0, 0.0);
    Paint::radial(cx, cy, max_radius, &stops)
}

struct BarVariant {
    /// Bins excluded from the top end of the spectrum.
    skip: usize,
    color: Rgb,
    height_factor: f32,
    cap: f32,
}

impl BarVariant {
    fn bright(canvas_w: f32) -> Self {
        Self {
            skip: 3,
            color: Rgb::WHITE,
            height_factor: 0.5,
            cap: canvas_w / 2.0,
        }
    }

    fn deep(canvas_w: f32) -> Self {
        Self {
            skip: 8,
            color: DEEP_BAR_COLOR,
            height_factor: 0.135,
            cap: canvas_w / 8.0,
        }
    }
}

/// Mirrored bar halves along the right and left edges, drawn via the same
/// ±90°/270° rotations the ring uses for its mirroring.
fn draw_bars(canvas: &mut Canvas<'_>, spectrum: &[u8], variant: &BarVariant) {
    let len = spectrum.len();
    if len <= variant.skip + 1 {
        return;
    }
    let w = canvas.width() as f32;
    let margin = 5.0;
    let divisor = (len - variant.skip - 1) as f32;
    let bar_width = (w - margin * 2.0) / divisor;
    let bar_height = 200.0;
    let count = len - variant.skip;

    canvas.save();
    canvas.translate(w, 0.0);
    canvas.rotate(90.0f32.to_radians());
    for i in 0..count {
        let alpha = 0.25 + i as f32 / len as f32;
        let reach = bar_reach(spectrum[i], bar_height, variant.height_factor, variant.cap + 1.0);
        canvas.fill_rect(
            i as f32 * bar_width,
            0.0,
            bar_width + 2.0,
            reach,
            &Paint::solid_alpha(variant.color, alpha),
        );
    }
    canvas.restore();

    canvas.save();
    canvas.translate(0.0, w);
    canvas.rotate(270.0f32.to_radians());
    for i in 0..count {
        let alpha = 0.25 + i as f32 / len as f32;
        let reach = bar_reach(spectrum[i], bar_height, variant.height_factor, variant.cap);
        canvas.fill_rect(
            (divisor - i as f32) * bar_width,
            0.0,
            bar_width + 2.0,
            reach,
            &Paint::solid_alpha(variant.color, alpha),
        );
    }
    canvas.restore();
}

/// Reciprocal bar length; a zero byte goes infinite and takes the cap.
fn bar_reach(value: u8, bar_height: f32, factor: f32, cap: f32) -> f32 {
    (bar_height * (255.0 / value as f32) * factor).min(cap)
}

/// Time-domain polyline with the same reciprocal mapping; zero bytes produce
/// non-finite points that the stroke skips.
fn draw_waveform(canvas: &mut Canvas<'_>, waveform: &[u8]) {
    let len = waveform.len();
    if len <= 12 {
        return;
    }
    let w = canvas.width() as f32;
    let margin = 5.0;
    let bar_width = (w - margin * 2.0) / (len - 12) as f32;
    let bar_height = 100.0;

    let mut pts = Vec::with_capacity(len - 1);
    pts.push(Point::new(0.0, bar_height * (255.0 / waveform[0] as f32)));
    for (i, &v) in waveform.iter().enumerate().take(len - 1).skip(1) {
        pts.push(Point::new(
            i as f32 * bar_width,
            bar_height * (255.0 / v as f32),
        ));
    }
    canvas.stroke_polyline(&pts, 5.0, &Paint::solid(Rgb::BLACK));
}
