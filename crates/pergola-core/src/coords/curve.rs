use super::Vec2;

/// Point at parameter `t` along the segment from `a` to `b`.
///
/// `t` is not clamped; values outside [0, 1] extrapolate.
#[inline]
pub fn point_along_line(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a * (1.0 - t) + b * t
}

/// Point at parameter `t` along a cubic Bezier curve.
///
/// `p0`/`p1` are the endpoints, `c0`/`c1` the control points. Evaluated by
/// repeated interpolation (de Casteljau), which stays stable for any `t`.
pub fn point_along_bezier(p0: Vec2, c0: Vec2, c1: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let a = point_along_line(p0, c0, t);
    let b = point_along_line(c0, c1, t);
    let c = point_along_line(c1, p1, t);

    let d = point_along_line(a, b, t);
    let e = point_along_line(b, c, t);

    point_along_line(d, e, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_endpoints_are_exact() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(5.0, -2.0);
        assert_eq!(point_along_line(a, b, 0.0), a);
        assert_eq!(point_along_line(a, b, 1.0), b);
        assert_eq!(point_along_line(a, b, 0.5), Vec2::new(3.0, 0.0));
    }

    #[test]
    fn bezier_hits_endpoints() {
        let p0 = Vec2::ZERO;
        let p1 = Vec2::new(10.0, 0.0);
        let c0 = Vec2::new(0.0, 10.0);
        let c1 = Vec2::new(10.0, 10.0);
        assert_eq!(point_along_bezier(p0, c0, c1, p1, 0.0), p0);
        assert_eq!(point_along_bezier(p0, c0, c1, p1, 1.0), p1);
    }

    #[test]
    fn degenerate_bezier_reduces_to_line() {
        // Control points on the chord leave the curve straight.
        let p0 = Vec2::ZERO;
        let p1 = Vec2::new(9.0, 9.0);
        let c0 = Vec2::new(3.0, 3.0);
        let c1 = Vec2::new(6.0, 6.0);
        let mid = point_along_bezier(p0, c0, c1, p1, 0.5);
        assert!((mid.x - 4.5).abs() < 1e-4);
        assert!((mid.y - 4.5).abs() < 1e-4);
    }
}
