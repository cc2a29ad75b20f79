/// Patrol-path walker for monkeys.
///
/// A path is a cyclic list of segment lengths in whole pixels. The walker
/// moves `PATROL_SPEED` per frame along the current segment and turns around
/// when the segment is used up, when it reaches the edge of the platform it
/// stands on, or when it reaches the side of the screen. A leftover distance
/// shorter than one step is dropped on the turn, not carried forward.

use super::entity::{Facing, Platform};
use super::geometry::{Aabb, Bounded};

/// Horizontal walk speed, pixels per frame.
pub const PATROL_SPEED: f64 = 0.5;

/// Slack for "standing on" and "at the edge of" a platform.
pub const EDGE_TOLERANCE: f64 = 2.0;

#[derive(Clone, Debug)]
pub struct Patrol {
    pub facing: Facing,
    pub path: Vec<u32>,
    /// Index into `path`; wraps on use.
    pub segment: usize,
    /// Distance walked in the current segment.
    pub distance: f64,
}

impl Patrol {
    pub fn new(facing: Facing, path: Vec<u32>) -> Self {
        Patrol { facing, path, segment: 0, distance: 0.0 }
    }

    pub fn reset(&mut self, facing: Facing) {
        self.facing = facing;
        self.segment = 0;
        self.distance = 0.0;
    }

    /// Advance one frame for a grounded walker occupying `body`.
    /// Returns the walker's new center x.
    pub fn advance(&mut self, body: &Aabb, platforms: &[Platform], window_width: f64) -> f64 {
        if self.path.is_empty() {
            return body.x;
        }
        self.segment %= self.path.len();
        let target = f64::from(self.path[self.segment]);

        if self.distance + PATROL_SPEED > target
            || at_platform_edge(body, self.facing, platforms)
            || at_screen_edge(body, self.facing, window_width)
        {
            self.segment += 1;
            self.facing = self.facing.flip();
            self.distance = 0.0;
            body.x
        } else {
            self.distance += PATROL_SPEED;
            body.x + PATROL_SPEED * self.facing.sign()
        }
    }
}

fn stands_on(body: &Aabb, p: &Platform) -> bool {
    (body.bottom() - p.top()).abs() < EDGE_TOLERANCE
}

/// Is the walker at the end of a platform it stands on, in its facing direction?
pub fn at_platform_edge(body: &Aabb, facing: Facing, platforms: &[Platform]) -> bool {
    platforms.iter().filter(|p| stands_on(body, p)).any(|p| {
        let pb = p.bounds();
        let limit = match facing {
            Facing::Right => pb.right() - body.w / 2.0,
            Facing::Left => pb.left() + body.w / 2.0,
        };
        (body.x - limit).abs() <= EDGE_TOLERANCE
    })
}

/// Is the walker touching the side of the screen it faces?
pub fn at_screen_edge(body: &Aabb, facing: Facing, window_width: f64) -> bool {
    match facing {
        Facing::Right => body.right() >= window_width,
        Facing::Left => body.left() <= 0.0,
    }
}
