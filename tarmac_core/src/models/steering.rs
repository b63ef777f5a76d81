// tarmac_core/src/models/steering.rs

//! Steering geometry: driver input to road-wheel angles.

/// Below this base angle both wheels simply take the base angle (rad, 0.5 deg).
pub const ACKERMANN_THRESHOLD: f64 = 0.5 * std::f64::consts::PI / 180.0;

const MIN_INNER_RADIUS: f64 = 1e-3;

/// Maps a normalized input in [-1, 1] to a base steer angle. Positive turns left.
pub fn base_angle(input: f64, max_steering_angle: f64) -> f64 {
    let input = if input.is_finite() { input } else { 0.0 };
    input.clamp(-1.0, 1.0) * max_steering_angle
}

/// Splits `base` into `(left, right)` road-wheel angles so both front wheels
/// roll around a common turn centre on the rear axle line. The inner wheel
/// (left for a left turn) always steers more sharply.
pub fn ackermann_angles(base: f64, wheelbase: f64, track_width: f64) -> (f64, f64) {
    if base.abs() < ACKERMANN_THRESHOLD {
        return (base, base);
    }

    let turn_radius = wheelbase / base.abs();
    let half_track = track_width / 2.0;
    let inner = (wheelbase / (turn_radius - half_track).max(MIN_INNER_RADIUS)).atan();
    let outer = (wheelbase / (turn_radius + half_track)).atan();
    let sign = base.signum();

    if base > 0.0 {
        (sign * inner, sign * outer)
    } else {
        (sign * outer, sign * inner)
    }
}
