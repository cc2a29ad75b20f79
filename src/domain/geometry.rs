/// Spatial model: center-anchored axis-aligned boxes.
///
/// Every entity is positioned by its center `(x, y)` in playfield pixels
/// (y grows downward). Its extent comes from the sprite it currently shows,
/// so a box is rebuilt from `(x, y, sprite size)` whenever it is needed
/// rather than stored.

/// A center-anchored axis-aligned bounding box.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Aabb {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Aabb {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Aabb { x, y, w, h }
    }

    #[inline]
    pub fn left(&self) -> f64 { self.x - self.w / 2.0 }
    #[inline]
    pub fn right(&self) -> f64 { self.x + self.w / 2.0 }
    #[inline]
    pub fn top(&self) -> f64 { self.y - self.h / 2.0 }
    #[inline]
    pub fn bottom(&self) -> f64 { self.y + self.h / 2.0 }

    /// Exact overlap test. Boxes that only share an edge intersect;
    /// boxes separated by any positive gap do not.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }

    /// Is `x` within the horizontal span (edges inclusive)?
    #[inline]
    pub fn spans_x(&self, x: f64) -> bool {
        x >= self.left() && x <= self.right()
    }
}

/// Anything that occupies a box on the playfield.
pub trait Bounded {
    fn bounds(&self) -> Aabb;
}

/// Do the two entities' current boxes overlap?
#[inline]
pub fn intersects<A: Bounded + ?Sized, B: Bounded + ?Sized>(a: &A, b: &B) -> bool {
    a.bounds().intersects(&b.bounds())
}
