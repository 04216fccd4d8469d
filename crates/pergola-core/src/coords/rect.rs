use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(
            self.origin.x + self.size.x / 2.0,
            self.origin.y + self.size.y / 2.0,
        )
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let mut x = self.origin.x;
        let mut y = self.origin.y;
        let mut w = self.size.x;
        let mut h = self.size.y;

        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }

        Rect::new(x, y, w, h)
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let r = self.normalized();
        p.x >= r.origin.x
            && p.y >= r.origin.y
            && p.x < (r.origin.x + r.size.x)
            && p.y < (r.origin.y + r.size.y)
    }

    /// Pixel hit-testing: both the point and the rect are rounded to whole
    /// pixels before the half-open test.
    #[inline]
    pub fn rounded_contains(self, p: Vec2) -> bool {
        let r = Rect::new(
            self.origin.x.round(),
            self.origin.y.round(),
            self.size.x.round(),
            self.size.y.round(),
        );
        r.contains(p.rounded())
    }

    #[inline]
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let a = self.normalized();
        let b = other.normalized();

        let x0 = a.origin.x.max(b.origin.x);
        let y0 = a.origin.y.max(b.origin.y);
        let x1 = (a.origin.x + a.size.x).min(b.origin.x + b.size.x);
        let y1 = (a.origin.y + a.size.y).min(b.origin.y + b.size.y);

        let w = x1 - x0;
        let h = y1 - y0;

        if w <= 0.0 || h <= 0.0 {
            None
        } else {
            Some(Rect::new(x0, y0, w, h))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    // ── contains ──────────────────────────────────────────────────────────

    #[test]
    fn contains_interior_and_min_edge() {
        assert!(r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(5.0, 5.0)));
        assert!(r(0.0, 0.0, 10.0, 10.0).contains(Vec2::ZERO));
    }

    #[test]
    fn contains_max_edge_exclusive() {
        // Half-open [min, max): the max edge is not contained.
        assert!(!r(0.0, 0.0, 10.0, 10.0).contains(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn contains_normalizes_negative_size() {
        assert!(r(10.0, 10.0, -10.0, -10.0).contains(Vec2::new(5.0, 5.0)));
    }

    // ── rounded_contains ──────────────────────────────────────────────────

    #[test]
    fn rounded_contains_snaps_point_to_pixel() {
        let rect = r(0.0, 0.0, 10.0, 10.0);
        assert!(rect.rounded_contains(Vec2::new(-0.4, -0.4)));
        assert!(!rect.rounded_contains(Vec2::new(-0.6, 5.0)));
        assert!(!rect.rounded_contains(Vec2::new(9.6, 5.0)));
    }

    #[test]
    fn rounded_contains_snaps_rect_to_pixel() {
        // Origin rounds up to 1, so exactly 0 falls outside.
        let rect = r(0.7, 0.7, 10.0, 10.0);
        assert!(!rect.rounded_contains(Vec2::ZERO));
        assert!(rect.rounded_contains(Vec2::new(1.0, 1.0)));
    }

    // ── normalized / max / center ─────────────────────────────────────────

    #[test]
    fn normalized_flips_negative_extents() {
        let n = r(10.0, 0.0, -4.0, 5.0).normalized();
        assert_eq!(n.origin.x, 6.0);
        assert_eq!(n.size.x, 4.0);
    }

    #[test]
    fn max_and_center() {
        let rect = r(2.0, 4.0, 10.0, 20.0);
        assert_eq!(rect.max(), Vec2::new(12.0, 24.0));
        assert_eq!(rect.center(), Vec2::new(7.0, 14.0));
    }

    // ── intersect ─────────────────────────────────────────────────────────

    #[test]
    fn intersect_overlapping() {
        let a = r(0.0, 0.0, 10.0, 10.0);
        let b = r(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersect(b).unwrap(), r(5.0, 5.0, 5.0, 5.0));
    }

    #[test]
    fn intersect_touching_edge_returns_none() {
        let a = r(0.0, 0.0, 10.0, 10.0);
        let b = r(10.0, 0.0, 10.0, 10.0);
        assert!(a.intersect(b).is_none());
    }

    // ── is_empty ──────────────────────────────────────────────────────────

    #[test]
    fn is_empty_requires_both_extents_positive() {
        assert!(r(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(r(0.0, 0.0, 5.0, 0.0).is_empty());
        assert!(!r(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
