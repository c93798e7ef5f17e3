use anyhow::{Context, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat};
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;
use std::f32::consts::PI;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Byte-mapping window for spectrum magnitudes, in decibels.
pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;
/// Per-bin smoothing toward the previous analysis window.
pub const SMOOTHING: f32 = 0.8;

/// Latest analyser output: one spectrum byte and one waveform byte per bin
/// (`fft_size / 2` of each). Readers copy snapshots out once per frame.
pub struct AnalyserTap {
    inner: Mutex<TapBuffers>,
    bin_count: usize,
}

struct TapBuffers {
    spectrum: Vec<u8>,
    waveform: Vec<u8>,
}

impl AnalyserTap {
    fn new(bin_count: usize) -> Self {
        Self {
            inner: Mutex::new(TapBuffers {
                spectrum: vec![0; bin_count],
                waveform: vec![128; bin_count],
            }),
            bin_count,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    pub fn read_spectrum(&self, out: &mut [u8]) {
        if let Ok(g) = self.inner.lock() {
            let n = out.len().min(g.spectrum.len());
            out[..n].copy_from_slice(&g.spectrum[..n]);
        }
    }

    pub fn read_waveform(&self, out: &mut [u8]) {
        if let Ok(g) = self.inner.lock() {
            let n = out.len().min(g.waveform.len());
            out[..n].copy_from_slice(&g.waveform[..n]);
        }
    }

    fn store(&self, spectrum: &[u8], waveform: &[u8]) {
        if let Ok(mut g) = self.inner.lock() {
            let n = g.spectrum.len().min(spectrum.len());
            g.spectrum[..n].copy_from_slice(&spectrum[..n]);
            let n = g.waveform.len().min(waveform.len());
            g.waveform[..n].copy_from_slice(&waveform[..n]);
        }
    }
}

pub struct AudioSystem {
    // Keep the input stream alive for the full AudioSystem lifetime.
    _stream: cpal::Stream,
    stop: Arc<AtomicBool>,
    analyser_handle: Option<thread::JoinHandle<()>>,
    tap: Arc<AnalyserTap>,
    pub sample_rate_hz: u32,
}

impl AudioSystem {
    pub fn new(fft_size: usize, device_query: Option<&str>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            fft_size.is_power_of_two() && (32..=32768).contains(&fft_size),
            "fft size must be a power of two in 32..=32768, got {fft_size}"
        );

        let host = cpal::default_host();
        let device = select_input_device(&host, device_query)?;
        let supported = device
            .default_input_config()
            .context("get default input config")?;
        let sample_rate_hz = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let config: cpal::StreamConfig = supported.clone().into();

        let rb_capacity = (sample_rate_hz as usize).saturating_mul(4);
        let rb = HeapRb::<f32>::new(rb_capacity);
        let (mut prod, mut cons) = rb.split();

        let stop = Arc::new(AtomicBool::new(false));
        let tap = Arc::new(AnalyserTap::new(fft_size / 2));
        let tap_for_thread = Arc::clone(&tap);
        let stop_for_thread = Arc::clone(&stop);

        let err_fn = |err| eprintln!("audio stream error: {err}");

        let stream = match supported.sample_format() {
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::U16 => device.build_input_stream(
                &config,
                move |data: &[u16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            fmt => return Err(anyhow!("unsupported sample format: {fmt:?}")),
        };

        stream.play().context("start input stream")?;

        let analyser_handle = thread::spawn(move || {
            analyse_loop(&mut cons, fft_size, &stop_for_thread, &tap_for_thread)
        });

        Ok(Self {
            _stream: stream,
            stop,
            analyser_handle: Some(analyser_handle),
            tap,
            sample_rate_hz,
        })
    }

    pub fn tap(&self) -> Arc<AnalyserTap> {
        Arc::clone(&self.tap)
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.analyser_handle.take() {
            let _ = h.join();
        }
    }
}

pub fn list_input_devices() -> anyhow::Result<()> {
    let host = cpal::default_host();
    let devices = host.input_devices().context("enumerate input devices")?;

    let mut out = io::stdout();
    writeln!(out, "Input devices:")?;
    for dev in devices {
        let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
        writeln!(out, "  - {}", name)?;
    }
    Ok(())
}

fn select_input_device(
    host: &cpal::Host,
    device_query: Option<&str>,
) -> anyhow::Result<cpal::Device> {
    let devices = host
        .input_devices()
        .context("enumerate input devices")?
        .collect::<Vec<_>>();

    let want = device_query.map(|s| s.to_lowercase());
    if let Some(want) = want.as_deref() {
        if let Some(dev) = devices.iter().find(|d| {
            d.name()
                .map(|n| n.to_lowercase().contains(want))
                .unwrap_or(false)
        }) {
            return Ok(dev.clone());
        }
        return Err(anyhow!("no input device matching: {want}"));
    }

    host.default_input_device()
        .ok_or_else(|| anyhow!("no default input device found"))
}

fn push_interleaved<T: Sample<Float = f32> + Copy>(
    data: &[T],
    channels: usize,
    prod: &mut ringbuf::HeapProd<f32>,
) {
    for frame in data.chunks(channels) {
        let mut acc = 0.0f32;
        for s in frame {
            acc += (*s).to_float_sample();
        }
        let mono = acc / channels as f32;
        let _ = prod.try_push(mono);
    }
}

/// Map a normalized FFT magnitude onto the 0..=255 decibel scale.
pub fn magnitude_to_byte(mag: f32) -> u8 {
    if mag <= 0.0 {
        return 0;
    }
    let db = 20.0 * mag.log10();
    let scaled = 255.0 * (db - MIN_DECIBELS) / (MAX_DECIBELS - MIN_DECIBELS);
    scaled.clamp(0.0, 255.0) as u8
}

/// Map a [-1, 1] sample onto the unsigned waveform byte (silence is 128).
pub fn sample_to_byte(s: f32) -> u8 {
    (128.0 + s * 128.0).clamp(0.0, 255.0) as u8
}

fn analyse_loop(
    cons: &mut ringbuf::HeapCons<f32>,
    fft_size: usize,
    stop: &AtomicBool,
    tap: &AnalyserTap,
) {
    let n = fft_size;
    let half = n / 2;
    // Half-window hop keeps tap updates comfortably ahead of the frame rate.
    let hop = half;

    let mut scratch = vec![0.0f32; n];
    let mut write_pos = 0usize;
    let mut filled = 0usize;
    let mut since_last = 0usize;

    let hann = (0..n)
        .map(|i| 0.5 - 0.5 * ((2.0 * PI * i as f32) / (n as f32)).cos())
        .collect::<Vec<_>>();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let mut fft_buf = vec![Complex { re: 0.0f32, im: 0.0f32 }; n];
    let mut smoothed = vec![0.0f32; half];
    let mut spectrum = vec![0u8; half];
    let mut waveform = vec![0u8; half];

    while !stop.load(Ordering::Relaxed) {
        let mut got_any = false;
        while let Some(s) = cons.try_pop() {
            got_any = true;
            scratch[write_pos] = s;
            write_pos = (write_pos + 1) % n;
            if filled < n {
                filled += 1;
            }
            since_last += 1;
            if filled == n && since_last >= hop {
                since_last = 0;

                // Newest half window, oldest sample first.
                for (i, b) in waveform.iter_mut().enumerate() {
                    let s = scratch[(write_pos + n - half + i) % n];
                    *b = sample_to_byte(s);
                }

                for (i, c) in fft_buf.iter_mut().enumerate() {
                    let s = scratch[(write_pos + i) % n];
                    c.re = s * hann[i];
                    c.im = 0.0;
                }
                fft.process(&mut fft_buf);

                for i in 0..half {
                    let c = fft_buf[i];
                    let mag = (c.re * c.re + c.im * c.im).sqrt() / n as f32;
                    smoothed[i] = SMOOTHING * smoothed[i] + (1.0 - SMOOTHING) * mag;
                    spectrum[i] = magnitude_to_byte(smoothed[i]);
                }

                tap.store(&spectrum, &waveform);
            }
        }

        if !got_any {
            thread::sleep(Duration::from_millis(1));
        }
    }
}
