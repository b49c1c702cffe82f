/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// Lifts a planar point into 3D with `z = 0`.
#[must_use]
pub fn lift(point: &Point2) -> Point3 {
    Point3::new(point.x, point.y, 0.0)
}
