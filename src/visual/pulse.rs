use super::canvas::{Canvas, Paint, Point, Rgb};
use std::collections::VecDeque;

/// Age added every frame a line is drawn.
pub const AGE_STEP: f32 = 3.0;
/// Lines past this age are evicted from the head of the queue.
pub const MAX_AGE: f32 = 900.0;
/// Per-axis jitter added to each vertex's unit direction.
const JITTER_SCALE: f32 = 1.0 / 65.0;

/// A past ring outline that expands outward and fades as it ages.
#[derive(Debug, Clone)]
pub struct PulseLine {
    pub points: Vec<Point>,
    pub age: f32,
}

/// Insertion-ordered queue of pulse lines. Eviction is age-based, but ages
/// grow monotonically with enqueue order, so it behaves as a FIFO.
#[derive(Debug, Default)]
pub struct PulseTrail {
    lines: VecDeque<PulseLine>,
}

impl PulseTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn push(&mut self, points: Vec<Point>) {
        self.lines.push_back(PulseLine { points, age: 1.0 });
    }

    pub fn ages(&self) -> impl Iterator<Item = f32> + '_ {
        self.lines.iter().map(|l| l.age)
    }

    /// Age and draw every line, then drop expired lines from the head.
    ///
    /// Each vertex moves outward along its own unit direction, jittered per
    /// axis by `rng.f32() / 65`; the jitter is why the trail shimmers. The
    /// first vertex is emitted twice, so the stroked loop closes over itself.
    pub fn draw(&mut self, canvas: &mut Canvas<'_>, rng: &mut fastrand::Rng, filled: bool) {
        let stroke = Paint::solid(Rgb::BLACK);
        for line in &mut self.lines {
            line.age += AGE_STEP;
            let Some(&first) = line.points.first() else {
                continue;
            };

            let mut expanded = Vec::with_capacity(line.points.len() + 1);
            expanded.push(displace(first, line.age, rng));
            for &p in &line.points {
                expanded.push(displace(p, line.age, rng));
            }

            canvas.stroke_polyline(&expanded, line.age / 100.0, &stroke);
            if filled {
                let fade = (200.0 / line.age).clamp(0.0, 1.0);
                canvas.fill_polygon(&expanded, &Paint::solid_alpha(Rgb::WHITE, fade));
            }
        }

        while self.lines.front().is_some_and(|l| l.age > MAX_AGE) {
            self.lines.pop_front();
        }
    }
}

fn displace(p: Point, age: f32, rng: &mut fastrand::Rng) -> Point {
    let len = p.length();
    // A vertex at the origin yields a non-finite direction; the canvas skips
    // such points when stroking.
    let ux = p.x / len + rng.f32() * JITTER_SCALE;
    let uy = p.y / len + rng.f32() * JITTER_SCALE;
    Point::new(p.x + age * ux, p.y + age * uy)
}
