/// Gravity resolver and ladder rule: the single source of truth for vertical motion.
///
/// ## Fallable capability
///
/// Barrels, ladders, monkeys, the boss and the player are unrelated types
/// that all fall. Each implements `Fallable` (position, velocity, gravity
/// constant); the resolver itself is stateless free functions.
///
/// ## Landing
///
/// An entity is GROUNDED on a platform when:
///   - its bottom edge is within `LANDING_TOLERANCE` of the platform's top edge
///   - its center x lies within the platform's horizontal span
///
/// Landing correction is folded into `is_airborne`: a grounded entity is
/// snapped to rest exactly on the top edge and its velocity zeroed before the
/// caller decides whether to accelerate it. First platform in list order wins.
///
/// ## Ladders
///
/// The player is ON a ladder while horizontally inside its width and
/// vertically overlapping its span. Climbing stops at the ladder's top edge
/// (off the top) and at its bottom edge (into the platform beneath).

use super::entity::{Barrel, Boss, Ladder, Monkey, Platform};
use super::geometry::{Aabb, Bounded};

/// Maximum downward speed, pixels per frame.
pub const TERMINAL_VELOCITY: f64 = 10.0;

/// Vertical slack when testing whether an entity rests on a platform.
pub const LANDING_TOLERANCE: f64 = 4.5;

/// Slack when testing whether the player reached a ladder end.
pub const LADDER_EPSILON: f64 = 1e-6;

/// Ladder zone extends this far above the ladder's top edge, so a player
/// standing on the platform at the ladder's head can climb down.
const LADDER_TOP_REACH: f64 = 1.0;

/// Margin used when deciding whether a ladder was authored inside a platform.
const LADDER_EMBED_MARGIN: f64 = 10.0;

pub const PLAYER_GRAVITY: f64 = 0.2;
pub const MONKEY_GRAVITY: f64 = 0.4;
pub const BOSS_GRAVITY: f64 = 0.4;
pub const BARREL_GRAVITY: f64 = 0.4;
pub const LADDER_GRAVITY: f64 = 0.25;

// ══════════════════════════════════════════════════════════════
// Capability
// ══════════════════════════════════════════════════════════════

pub trait Fallable: Bounded {
    fn gravity(&self) -> f64;
    fn velocity(&self) -> f64;
    fn set_velocity(&mut self, v: f64);
    fn set_y(&mut self, y: f64);
    fn y(&self) -> f64;
}

// ══════════════════════════════════════════════════════════════
// Gravity
// ══════════════════════════════════════════════════════════════

/// Does `b` rest on `p` (within tolerance)?
#[inline]
pub fn rests_on(b: &Aabb, p: &Platform) -> bool {
    (b.bottom() - p.top()).abs() <= LANDING_TOLERANCE && p.bounds().spans_x(b.x)
}

/// True if the entity is not resting on any platform.
///
/// When it does rest on one, it is snapped so its bottom edge sits exactly
/// on that platform's top edge and its velocity is reset to 0.
pub fn is_airborne<F: Fallable + ?Sized>(entity: &mut F, platforms: &[Platform]) -> bool {
    let b = entity.bounds();
    match platforms.iter().find(|p| rests_on(&b, p)) {
        Some(p) => {
            entity.set_y(p.top() - b.h / 2.0);
            entity.set_velocity(0.0);
            false
        }
        None => true,
    }
}

/// One frame of free fall: accelerate (clamped) then move.
pub fn apply_gravity<F: Fallable + ?Sized>(entity: &mut F) {
    let v = (entity.velocity() + entity.gravity()).min(TERMINAL_VELOCITY);
    entity.set_velocity(v);
    entity.set_y(entity.y() + v);
}

/// Resolve one frame of falling. Returns whether the entity was airborne.
pub fn fall<F: Fallable + ?Sized>(entity: &mut F, platforms: &[Platform]) -> bool {
    if is_airborne(entity, platforms) {
        apply_gravity(entity);
        true
    } else {
        false
    }
}

// ══════════════════════════════════════════════════════════════
// Spawn settling
// ══════════════════════════════════════════════════════════════

/// Lift a barrel that overlaps a platform onto that platform's top edge.
pub fn settle_barrel(barrel: &mut Barrel, platforms: &[Platform]) {
    let b = barrel.bounds();
    if let Some(p) = platforms.iter().find(|p| p.bounds().intersects(&b)) {
        barrel.y = p.top() - b.h / 2.0;
    }
}

/// Lift a ladder authored straddling a platform onto that platform.
pub fn settle_ladder(ladder: &mut Ladder, platforms: &[Platform]) {
    let l = ladder.bounds();
    let embedded = |p: &&Platform| {
        let pb = p.bounds();
        l.right() <= pb.right()
            && l.left() >= pb.left()
            && l.bottom() - LADDER_EMBED_MARGIN >= pb.bottom()
            && l.top() + LADDER_EMBED_MARGIN <= pb.top()
    };
    if let Some(p) = platforms.iter().find(embedded) {
        ladder.y = p.top() - l.h / 2.0;
    }
}

// ══════════════════════════════════════════════════════════════
// Ladder rule
// ══════════════════════════════════════════════════════════════

/// Is a body with box `b` inside this ladder's climbable zone?
pub fn in_ladder_zone(b: &Aabb, ladder: &Ladder) -> bool {
    let l = ladder.bounds();
    l.spans_x(b.x)
        && b.bottom() >= l.top() - LADDER_TOP_REACH
        && b.y <= l.bottom()
}

/// First ladder (list order) whose zone contains `b`.
pub fn ladder_at<'a>(b: &Aabb, ladders: &'a [Ladder]) -> Option<&'a Ladder> {
    ladders.iter().find(|l| in_ladder_zone(b, l))
}

/// Has the body's bottom edge reached (or passed) the ladder's top edge?
#[inline]
pub fn at_ladder_top(b: &Aabb, ladder: &Ladder) -> bool {
    b.bottom() <= ladder.bounds().top() + LADDER_EPSILON
}

/// Is the body's bottom edge still above the ladder's bottom edge?
#[inline]
pub fn above_ladder_bottom(b: &Aabb, ladder: &Ladder) -> bool {
    b.bottom() < ladder.bounds().bottom() - LADDER_EPSILON
}

/// New center y after climbing up by at most `speed`, clamped at the top.
pub fn climb_up_y(b: &Aabb, ladder: &Ladder, speed: f64) -> f64 {
    let room = (b.bottom() - ladder.bounds().top()).max(0.0);
    b.y - speed.min(room)
}

/// New center y after climbing down by at most `speed`, clamped at the bottom.
pub fn climb_down_y(b: &Aabb, ladder: &Ladder, speed: f64) -> f64 {
    let room = (ladder.bounds().bottom() - b.bottom()).max(0.0);
    b.y + speed.min(room)
}

// ══════════════════════════════════════════════════════════════
// Fallable impls
// ══════════════════════════════════════════════════════════════

impl Fallable for Barrel {
    fn gravity(&self) -> f64 { BARREL_GRAVITY }
    fn velocity(&self) -> f64 { self.velocity }
    fn set_velocity(&mut self, v: f64) { self.velocity = v; }
    fn set_y(&mut self, y: f64) { self.y = y; }
    fn y(&self) -> f64 { self.y }
}

impl Fallable for Ladder {
    fn gravity(&self) -> f64 { LADDER_GRAVITY }
    fn velocity(&self) -> f64 { self.velocity }
    fn set_velocity(&mut self, v: f64) { self.velocity = v; }
    fn set_y(&mut self, y: f64) { self.y = y; }
    fn y(&self) -> f64 { self.y }
}

impl Fallable for Monkey {
    fn gravity(&self) -> f64 { MONKEY_GRAVITY }
    fn velocity(&self) -> f64 { self.velocity }
    fn set_velocity(&mut self, v: f64) { self.velocity = v; }
    fn set_y(&mut self, y: f64) { self.y = y; }
    fn y(&self) -> f64 { self.y }
}

impl Fallable for Boss {
    fn gravity(&self) -> f64 { BOSS_GRAVITY }
    fn velocity(&self) -> f64 { self.velocity }
    fn set_velocity(&mut self, v: f64) { self.velocity = v; }
    fn set_y(&mut self, y: f64) { self.y = y; }
    fn y(&self) -> f64 { self.y }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Floor of four platforms whose top edge is at y = 744.
    fn floor() -> Vec<Platform> {
        (0..4).map(|i| Platform::new(64.0 + 128.0 * i as f64, 752.0)).collect()
    }

    // ── is_airborne / apply_gravity ──

    #[test]
    fn high_barrel_is_airborne_and_untouched() {
        let mut b = Barrel::new(100.0, 300.0);
        assert!(is_airborne(&mut b, &floor()));
        assert_eq!(b.y, 300.0);
    }

    #[test]
    fn near_contact_snaps_exactly_onto_edge() {
        // Barrel bottom at 740.5 (3.5 above the top edge).
        let mut b = Barrel::new(100.0, 724.5);
        b.velocity = 3.0;
        assert!(!is_airborne(&mut b, &floor()));
        assert_eq!(b.bounds().bottom(), 744.0);
        assert_eq!(b.velocity, 0.0);
    }

    #[test]
    fn outside_tolerance_is_airborne() {
        // Bottom at 739 (5 above the top edge).
        let mut b = Barrel::new(100.0, 723.0);
        assert!(is_airborne(&mut b, &floor()));
    }

    #[test]
    fn off_the_horizontal_span_is_airborne() {
        let mut b = Barrel::new(600.0, 728.0);
        assert!(is_airborne(&mut b, &floor()));
    }

    #[test]
    fn first_platform_in_list_wins() {
        let platforms = vec![Platform::new(100.0, 752.0), Platform::new(100.0, 754.0)];
        let mut b = Barrel::new(100.0, 727.0);
        assert!(!is_airborne(&mut b, &platforms));
        assert_eq!(b.bounds().bottom(), 744.0);
    }

    #[test]
    fn gravity_accumulates_then_clamps() {
        let mut b = Barrel::new(100.0, 0.0);
        apply_gravity(&mut b);
        assert!((b.velocity - 0.4).abs() < 1e-9);
        assert!((b.y - 0.4).abs() < 1e-9);
        for _ in 0..100 { apply_gravity(&mut b); }
        assert_eq!(b.velocity, TERMINAL_VELOCITY);
    }

    #[test]
    fn falling_barrel_lands_with_zero_velocity() {
        let platforms = floor();
        // Short drop: per-frame steps stay narrower than the landing window.
        let mut b = Barrel::new(100.0, 684.0);
        let mut frames = 0;
        while fall(&mut b, &platforms) {
            frames += 1;
            assert!(frames < 1000, "barrel never landed");
        }
        assert_eq!(b.velocity, 0.0);
        assert_eq!(b.bounds().bottom(), 744.0);
    }

    // ── settling ──

    #[test]
    fn barrel_inside_platform_is_lifted() {
        let platforms = floor();
        let mut b = Barrel::new(100.0, 750.0);
        settle_barrel(&mut b, &platforms);
        assert_eq!(b.bounds().bottom(), 744.0);
    }

    #[test]
    fn ladder_straddling_platform_is_lifted() {
        let platforms = vec![Platform::new(200.0, 600.0)];
        // Ladder centered on the platform, spanning 524..676.
        let mut l = Ladder::new(200.0, 600.0);
        settle_ladder(&mut l, &platforms);
        assert_eq!(l.bounds().bottom(), 592.0);
    }

    #[test]
    fn ladder_between_tiers_is_left_alone() {
        let platforms = vec![Platform::new(200.0, 600.0)];
        let mut l = Ladder::new(200.0, 668.0); // top edge at 592
        settle_ladder(&mut l, &platforms);
        assert_eq!(l.y, 668.0);
    }

    // ── ladder rule ──

    fn body(x: f64, bottom: f64) -> Aabb {
        Aabb::new(x, bottom - 21.0, 30.0, 42.0)
    }

    #[test]
    fn ladder_zone_bounds() {
        // Ladder spans 592..744 vertically, 400..440 horizontally.
        let l = Ladder::new(420.0, 668.0);
        assert!(in_ladder_zone(&body(420.0, 744.0), &l));
        assert!(in_ladder_zone(&body(420.0, 592.0), &l));
        assert!(in_ladder_zone(&body(420.0, 591.0), &l));
        assert!(!in_ladder_zone(&body(420.0, 590.0), &l));
        assert!(!in_ladder_zone(&body(445.0, 700.0), &l));
    }

    #[test]
    fn climb_is_clamped_to_ladder_ends() {
        let l = Ladder::new(420.0, 668.0);
        let near_top = body(420.0, 594.0);
        let y = climb_up_y(&near_top, &l, 3.5);
        assert_eq!(y + 21.0, 592.0);
        assert!(at_ladder_top(&body(420.0, y + 21.0), &l));

        let near_bottom = body(420.0, 742.0);
        let y = climb_down_y(&near_bottom, &l, 3.5);
        assert_eq!(y + 21.0, 744.0);
        assert!(!above_ladder_bottom(&body(420.0, y + 21.0), &l));
    }

    #[test]
    fn overshoot_past_top_still_counts_as_top() {
        let l = Ladder::new(420.0, 668.0);
        assert!(at_ladder_top(&body(420.0, 591.5), &l));
        assert!(!at_ladder_top(&body(420.0, 600.0), &l));
    }

    proptest! {
        #[test]
        fn velocity_never_exceeds_terminal_and_never_decreases(
            start in -5.0f64..10.0,
            frames in 1usize..400,
        ) {
            let mut b = Barrel::new(0.0, 0.0);
            b.velocity = start;
            let mut prev = b.velocity;
            for _ in 0..frames {
                apply_gravity(&mut b);
                prop_assert!(b.velocity <= TERMINAL_VELOCITY);
                prop_assert!(b.velocity >= prev);
                prev = b.velocity;
            }
        }

        #[test]
        fn landing_leaves_no_gap_or_overlap(x in 10.0f64..500.0, offset in -4.5f64..4.5) {
            let platforms = floor();
            let mut b = Barrel::new(x, 744.0 - 16.0 + offset);
            prop_assert!(!is_airborne(&mut b, &platforms));
            prop_assert_eq!(b.bounds().bottom(), 744.0);
            prop_assert_eq!(b.velocity, 0.0);
        }
    }
}
