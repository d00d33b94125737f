//! Pure geometry helpers shared by the shape builders: Bézier evaluation,
//! incremental circle/ellipse stepping and miter-joint offsets. No state
//! beyond what each call carries.

use std::f32::consts::PI;

/// Evaluates a flattened `(x, y)` control polygon at `t` by de Casteljau
/// collapse, `p[j] += (p[j + 2] - p[j]) * t` until one point remains.
///
/// `scratch` is consumed as working storage; callers sampling a whole curve
/// refill it from the original control points for every step, and close the
/// curve with the original last control point at `t = 1` so accumulated float
/// drift never shows at the boundary.
pub fn bezier_point(scratch: &mut [f32], t: f32) -> (f32, f32) {
    debug_assert!(scratch.len() >= 2 && scratch.len() % 2 == 0);
    let mut remaining = scratch.len();
    while remaining > 2 {
        for j in 0..remaining - 2 {
            scratch[j] += (scratch[j + 2] - scratch[j]) * t;
        }
        remaining -= 2;
    }
    (scratch[0], scratch[1])
}

/// Unit-circle points over `[angle_start, angle_end)`, produced by the
/// tangential/radial correction recurrence
/// `x' = (x - y·tan Δθ)·cos Δθ`, `y' = (y + x·tan Δθ)·cos Δθ`.
///
/// Trigonometric functions run once at construction; each step is two
/// multiply-adds and two multiplies. Yields exactly `segments` points; the
/// explicit closing vertex at `angle_end` is the caller's job. Ellipse radii
/// are applied by the caller at output only, which keeps the recurrence a
/// true circle and the scaled output a true ellipse parametrization.
#[derive(Debug, Clone)]
pub struct ArcPoints {
    x: f32,
    y: f32,
    tan_step: f32,
    cos_step: f32,
    remaining: usize,
}

impl ArcPoints {
    pub fn new(angle_start: f32, angle_end: f32, segments: usize) -> Self {
        debug_assert!(segments > 0);
        let step = (angle_end - angle_start) / segments as f32;
        Self {
            x: angle_start.cos(),
            y: angle_start.sin(),
            tan_step: step.tan(),
            cos_step: step.cos(),
            remaining: segments,
        }
    }
}

impl Iterator for ArcPoints {
    type Item = (f32, f32);

    fn next(&mut self) -> Option<(f32, f32)> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let out = (self.x, self.y);
        let x = (self.x - self.y * self.tan_step) * self.cos_step;
        let y = (self.y + self.x * self.tan_step) * self.cos_step;
        self.x = x;
        self.y = y;
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ArcPoints {}

/// Direction angle of the segment from `(x0, y0)` to `(x1, y1)`.
pub fn segment_angle(x0: f32, y0: f32, x1: f32, y1: f32) -> f32 {
    (y1 - y0).atan2(x1 - x0)
}

/// Perpendicular (left normal) offset of half-width `w` for a segment with
/// direction `angle`.
pub fn perpendicular_offset(angle: f32, half_width: f32) -> (f32, f32) {
    (-half_width * angle.sin(), half_width * angle.cos())
}

/// Which side of a joint receives the miter fill: `-1.0` if the turn from
/// `prev_angle` to `cur_angle` bends one way, `+1.0` the other.
///
/// The sign rule disambiguates the inner from the outer miter side,
/// including across the ±π wrap of `atan2`.
pub fn turn_direction(prev_angle: f32, cur_angle: f32) -> f32 {
    let diff = cur_angle - prev_angle;
    if (diff > -PI && diff < 0.0) || diff > PI {
        -1.0
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn bezier_on_all_zero_control_points_stays_at_origin() {
        let control = [0.0f32; 8];
        for i in 0..10 {
            let mut scratch = control;
            let (x, y) = bezier_point(&mut scratch, i as f32 / 10.0);
            assert_eq!((x, y), (0.0, 0.0));
        }
    }

    #[test]
    fn bezier_line_interpolates_linearly() {
        let mut scratch = [0.0, 0.0, 10.0, 20.0];
        let (x, y) = bezier_point(&mut scratch, 0.5);
        assert!((x - 5.0).abs() < 1e-6);
        assert!((y - 10.0).abs() < 1e-6);
    }

    #[test]
    fn bezier_endpoint_at_t_zero_is_first_control_point() {
        let mut scratch = [3.0, 4.0, 7.0, 8.0, 11.0, 12.0];
        assert_eq!(bezier_point(&mut scratch, 0.0), (3.0, 4.0));
    }

    #[test]
    fn arc_points_yields_exactly_segments_points() {
        let pts: Vec<_> = ArcPoints::new(0.0, FRAC_PI_2, 8).collect();
        assert_eq!(pts.len(), 8);
        // First point sits on the start angle.
        assert!((pts[0].0 - 1.0).abs() < 1e-6);
        assert!(pts[0].1.abs() < 1e-6);
        // Last yielded point is one step short of the end angle.
        let expected = FRAC_PI_2 * 7.0 / 8.0;
        assert!((pts[7].0 - expected.cos()).abs() < 1e-4);
        assert!((pts[7].1 - expected.sin()).abs() < 1e-4);
    }

    #[test]
    fn arc_points_stay_on_the_unit_circle() {
        for (x, y) in ArcPoints::new(0.3, 5.9, 64) {
            let r = (x * x + y * y).sqrt();
            assert!((r - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn turn_direction_sign_rule() {
        // Left turn.
        assert_eq!(turn_direction(0.0, FRAC_PI_2), 1.0);
        // Right turn.
        assert_eq!(turn_direction(FRAC_PI_2, 0.0), -1.0);
        // Wrap past +pi reads as a right turn.
        assert_eq!(turn_direction(-3.0, 3.0), -1.0);
    }
}
