use super::canvas::Point;
use std::f32::consts::PI;

/// Radii never collapse below this, so silent input still draws a small ring.
pub const MIN_RADIUS: f32 = 20.0;
const RADIUS_CEILING: f32 = 20000.0;
const FULL_TURN: f32 = PI * 2.0;

/// Angle for bin `i` of the forward half-sweep.
///
/// Deliberately `PI / (n / i)` rather than `i / n * PI`: the two differ in
/// float evaluation order and the resulting non-uniform spacing is the
/// signature look of the ring. Bin 0 (and the closing point) sit at a full
/// turn instead.
pub fn bin_angle(num_values: usize, i: usize) -> f32 {
    PI / (num_values as f32 / i as f32)
}

/// One point per bin, mirrored about the x axis on the way back and closed by
/// repeating the first point. `2 * (num_values - 1) + 2` points total.
pub fn line_default(spectrum: &[u8], num_values: usize, max_radius: f32) -> Vec<Point> {
    if num_values < 2 || spectrum.len() < num_values {
        return Vec::new();
    }

    let point_at = |i: usize, angle: f32| -> Point {
        let radius =
            (spectrum[i] as f32 / 255.0 * max_radius).clamp(MIN_RADIUS, RADIUS_CEILING);
        Point::new(radius * angle.cos(), radius * angle.sin())
    };

    let mut pts = Vec::with_capacity(2 * (num_values - 1) + 2);
    pts.push(point_at(0, FULL_TURN));
    for i in 1..num_values {
        pts.push(point_at(i, bin_angle(num_values, i)));
    }
    for i in (1..num_values).rev() {
        let p = point_at(i, bin_angle(num_values, i));
        pts.push(Point::new(p.x, -p.y));
    }
    pts.push(point_at(0, FULL_TURN));
    pts
}

/// Power-curve variant: radius measures how far a bin sits from the mean of
/// the drawn bins, compressed with an 0.85 exponent and bounded by half the
/// frame width instead of the tall ceiling.
pub fn line_averaged(
    spectrum: &[u8],
    num_values: usize,
    average: f32,
    max_radius: f32,
    half_width: f32,
) -> Vec<Point> {
    if num_values < 2 || spectrum.len() < num_values {
        return Vec::new();
    }

    let avg_norm = average / max_radius;
    let point_at = |i: usize, angle: f32| -> Point {
        let spread = (spectrum[i] as f32 / 255.0 - avg_norm).abs() * max_radius;
        let radius = (spread.powf(0.85) * 3.1).clamp(MIN_RADIUS, half_width);
        Point::new(radius * angle.cos(), radius * angle.sin())
    };

    let mut pts = Vec::with_capacity(2 * (num_values - 1) + 2);
    pts.push(point_at(0, FULL_TURN));
    for i in 1..num_values {
        pts.push(point_at(i, bin_angle(num_values, i)));
    }
    for i in (1..num_values).rev() {
        let p = point_at(i, bin_angle(num_values, i));
        pts.push(Point::new(p.x, -p.y));
    }
    pts.push(point_at(0, FULL_TURN));
    pts
}

/// Smoothed variant: each radius is a 3-sample blend with twice the weight on
/// the previous blended value. The chain warms up over a forward sweep that
/// emits nothing, then the mirrored backward sweep stages points into a
/// reversed-index array before emission. One point shorter than the other
/// styles: `2 * (num_values - 1) + 1`.
pub fn line_smooth(spectrum: &[u8], num_values: usize, max_radius: f32) -> Vec<Point> {
    if num_values < 2 || spectrum.len() < num_values {
        return Vec::new();
    }

    let radius_of = |i: usize| spectrum[i] as f32 / 255.0 * max_radius;

    let mut prev = radius_of(1).clamp(MIN_RADIUS, RADIUS_CEILING);
    for i in 1..num_values {
        let used = ((radius_of(i) + 2.0 * prev) / 3.0).clamp(MIN_RADIUS, RADIUS_CEILING);
        prev = used;
    }

    let staged_len = num_values - 1;
    let mut staged = vec![Point::new(0.0, 0.0); staged_len];
    for i in (1..num_values).rev() {
        let used = ((radius_of(i) + 2.0 * prev) / 3.0).clamp(MIN_RADIUS, RADIUS_CEILING);
        let angle = bin_angle(num_values, i);
        // Index |1 - i|, i.e. the backward sweep writes front-to-back.
        staged[i - 1] = Point::new(used * angle.cos(), -(used * angle.sin()));
        prev = used;
    }

    let mut pts = Vec::with_capacity(2 * staged_len + 1);
    pts.push(staged[0]);
    for i in 1..staged_len {
        pts.push(staged[i]);
    }
    for i in (1..staged_len).rev() {
        pts.push(Point::new(staged[i].x, -staged[i].y));
    }
    pts.push(Point::new(staged[0].x, -staged[0].y));
    pts.push(staged[0]);
    pts
}
