pub mod distance_2d;
pub mod intersect_2d;
pub mod polygon_2d;

/// 2D point in world coordinates.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Tolerance used when deciding whether two segments cross strictly inside
/// both of their open intervals.
pub const INTERSECTION_EPSILON: f64 = 1e-6;

/// Linear interpolation between `a` and `b` at parameter `t`.
#[must_use]
pub fn lerp(a: &Point2, b: &Point2, t: f64) -> Point2 {
    Point2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// Returns `true` if both points are within `tol` of each other.
#[must_use]
pub fn points_coincide(a: &Point2, b: &Point2, tol: f64) -> bool {
    (a - b).norm() <= tol
}
