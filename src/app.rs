use crate::audio::AudioSystem;
use crate::config::{Config, RendererMode, SceneStyle};
use crate::prefs::{VisualPrefs, prefs_storage_path};
use crate::render::{AsciiRenderer, BrailleRenderer, Frame, HalfBlockRenderer, Renderer};
use crate::terminal::TerminalGuard;
use crate::visual::{FrameInput, VisualOptions, Visualizer};
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::fmt::Write as _;
use std::io::BufWriter;
use std::time::{Duration, Instant};

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let mut opts = VisualOptions::from_config(&cfg);

    // Prefs are resolved before the terminal goes raw so errors print cleanly.
    let prefs_path = if cfg.prefs { prefs_storage_path() } else { None };
    if let Some(path) = prefs_path.as_deref() {
        if path.exists() {
            let saved = VisualPrefs::load(Some(path))
                .with_context(|| format!("load prefs from {}", path.display()))?;
            saved.apply_to(&mut opts);
        }
    }

    let audio = AudioSystem::new(cfg.fft_size, cfg.device.as_deref())
        .with_context(|| format!("start audio capture (fft size {})", cfg.fft_size))?;
    let tap = audio.tap();

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut renderer: Box<dyn Renderer> = match cfg.renderer {
        RendererMode::Ascii => Box::new(AsciiRenderer::new()),
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Braille => Box::new(BrailleRenderer::new()),
    };
    let (px_w_mul, px_h_mul) = match cfg.renderer {
        RendererMode::Ascii => (1usize, 1usize),
        RendererMode::HalfBlock => (1, 2),
        RendererMode::Braille => (2, 4),
    };

    let mut last_size = crossterm::terminal::size().context("get terminal size")?;
    if last_size.0 < 4 || last_size.1 < 2 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 4x2, got {}x{})",
            last_size.0,
            last_size.1
        ));
    }

    let start = Instant::now();
    let mut viz = Visualizer::new(start.elapsed().subsec_millis());

    let bins = tap.bin_count();
    let mut spectrum = vec![0u8; bins];
    let mut waveform = vec![0u8; bins];
    let mut pixels: Vec<u8> = Vec::new();

    let mut show_hud = true;
    let mut show_help = false;
    let mut fps = FpsCounter::new();
    let mut beat_flash = 0.0f32;

    loop {
        let frame_start = Instant::now();

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    if handle_key(k.code, k.modifiers, &mut opts, &mut show_hud, &mut show_help) {
                        if let Some(path) = prefs_path.as_deref() {
                            VisualPrefs::from_options(&opts)
                                .save(Some(path))
                                .with_context(|| format!("save prefs to {}", path.display()))?;
                        }
                        return Ok(());
                    }
                }
                Event::Resize(c, r) => {
                    last_size = (c, r);
                }
                _ => {}
            }
        }

        // Resize events can be missed in some terminals; poll once per frame.
        let sz = crossterm::terminal::size()?;
        if sz != last_size {
            last_size = sz;
        }

        let (term_cols, term_rows) = last_size;
        let hud_rows: u16 = if show_hud { 2 } else { 0 };
        let visual_rows = term_rows.saturating_sub(hud_rows).max(1);
        let w = (term_cols as usize).saturating_mul(px_w_mul);
        let h = (visual_rows as usize).saturating_mul(px_h_mul);
        let need = w.saturating_mul(h).saturating_mul(4);
        if pixels.len() != need {
            pixels.resize(need, 0);
        }

        tap.read_spectrum(&mut spectrum);
        tap.read_waveform(&mut waveform);

        let input = FrameInput {
            spectrum: &spectrum,
            waveform: &waveform,
            now_ms: start.elapsed().subsec_millis(),
        };
        if viz.render(&input, &opts, &mut pixels, w, h) {
            beat_flash = 1.0;
        }

        let hud = if show_hud {
            build_hud(
                &opts,
                viz.running_average(),
                viz.trail_len(),
                beat_flash,
                fps.fps(),
                renderer.name(),
            )
        } else {
            String::new()
        };
        let overlay = if show_help { Some(HELP_TEXT) } else { None };

        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: &pixels,
            hud: &hud,
            hud_rows,
            overlay,
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;

        fps.tick();
        beat_flash *= 0.85;

        // Frame pacing.
        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = frame_start.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

/// Key handling stands in for the original settings panel; every toggle maps
/// onto one `VisualOptions` field. Returns true to quit.
fn handle_key(
    code: KeyCode,
    mods: KeyModifiers,
    opts: &mut VisualOptions,
    show_hud: &mut bool,
    show_help: &mut bool,
) -> bool {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return true;
    }

    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        KeyCode::Char('1') => opts.scene = SceneStyle::Bright,
        KeyCode::Char('2') => opts.scene = SceneStyle::Deep,
        KeyCode::Char('l') => opts.line_style = opts.line_style.next(),
        KeyCode::Char('g') => opts.show_gradient = !opts.show_gradient,
        KeyCode::Char('b') => opts.show_bars = !opts.show_bars,
        KeyCode::Char('r') => opts.show_ring = !opts.show_ring,
        KeyCode::Char('w') => opts.show_waveform = !opts.show_waveform,
        KeyCode::Char('p') => opts.pulse_lines = !opts.pulse_lines,
        KeyCode::Char('f') => opts.ring_gradient = !opts.ring_gradient,
        KeyCode::Char('n') => opts.fx.noise = !opts.fx.noise,
        KeyCode::Char('i') => opts.fx.invert = !opts.fx.invert,
        KeyCode::Char('o') => opts.fx.grayscale = !opts.fx.grayscale,
        KeyCode::Char('t') => opts.fx.threshold = !opts.fx.threshold,
        KeyCode::Char('e') => opts.fx.emboss = !opts.fx.emboss,
        KeyCode::Char('[') | KeyCode::Down => {
            opts.beat_threshold = (opts.beat_threshold - 10.0).max(0.0);
        }
        KeyCode::Char(']') | KeyCode::Up => {
            opts.beat_threshold = (opts.beat_threshold + 10.0).min(2000.0);
        }
        KeyCode::Char('h') => *show_hud = !*show_hud,
        KeyCode::Char('?') => *show_help = !*show_help,
        _ => {}
    }
    false
}

fn build_hud(
    opts: &VisualOptions,
    running_average: f32,
    trail_len: usize,
    beat_flash: f32,
    fps: f32,
    renderer_name: &str,
) -> String {
    let mut s = String::new();
    let _ = write!(
        s,
        "{} scene {} | line {} | thr {:.0} | avg {:>7.0} | pulses {:>2} | {:>5.1} fps | {}",
        if beat_flash > 0.4 { "*" } else { " " },
        opts.scene.label(),
        opts.line_style.label(),
        opts.beat_threshold,
        running_average,
        trail_len,
        fps,
        renderer_name,
    );
    s.push('\n');
    let flag = |on: bool, ch: char| if on { ch } else { '-' };
    let _ = write!(
        s,
        "[1/2] scene  [l] line  layers {}{}{}{}{}{}  fx {}{}{}{}{}  [[/]] thr  [?] help  [q] quit",
        flag(opts.show_gradient, 'g'),
        flag(opts.show_bars, 'b'),
        flag(opts.show_ring, 'r'),
        flag(opts.show_waveform, 'w'),
        flag(opts.pulse_lines, 'p'),
        flag(opts.ring_gradient, 'f'),
        flag(opts.fx.noise, 'n'),
        flag(opts.fx.invert, 'i'),
        flag(opts.fx.grayscale, 'o'),
        flag(opts.fx.threshold, 't'),
        flag(opts.fx.emboss, 'e'),
    );
    s
}

const HELP_TEXT: &str = "ring-visualizer keys\n\
\n\
1 / 2      scene: bright / deep\n\
l          cycle line style (default, average, smooth)\n\
g          backdrop gradient\n\
b          spectrum bars\n\
r          spectrum ring\n\
w          waveform line\n\
p          pulse trail\n\
f          ring gradient\n\
n i o t e  noise / invert / grayscale / threshold / emboss\n\
[ / ]      beat threshold -/+ 10\n\
h          HUD\n\
?          this help\n\
q / Esc    quit";

struct FpsCounter {
    frames: u32,
    window_start: Instant,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            window_start: Instant::now(),
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.window_start.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            self.fps = self.frames as f32 / elapsed;
            self.frames = 0;
            self.window_start = Instant::now();
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
