//! Collision geometry
//!
//! The player is conceptually stationary at track offset 0 and the world
//! slides toward it along +z. Every entity gets an axis-aligned box built
//! from a static per-type profile; the player box depends on the vertical
//! mode, not on the rendered jump arc.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::{Collectible, Hazard, HazardKind, Player, VerticalMode};
use crate::consts::*;

/// Sliding clears an obstacle only if it is lower than this
pub const PASS_UNDER_THRESHOLD: f32 = 0.7;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box resting on `base_y`, centered on x/z
    pub fn from_base(x: f32, base_y: f32, z: f32, size: Vec3) -> Self {
        let half = Vec3::new(size.x / 2.0, 0.0, size.z / 2.0);
        let anchor = Vec3::new(x, base_y, z);
        Self {
            min: anchor - half,
            max: anchor + half + Vec3::new(0.0, size.y, 0.0),
        }
    }

    /// Strict overlap (touching faces do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Stretch the box toward -z to cover the distance it moved this tick
    pub fn swept_back(mut self, travel: f32) -> Self {
        self.min.z -= travel.max(0.0);
        self
    }
}

/// How a hazard resolves on contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomePolicy {
    /// Holes in the ice: only a jump clears them
    Chasm,
    /// Jump over, or slide past if low enough
    JumpOrSlide,
    /// Animals: sliding does not help
    MustJump,
    /// Non-terminal loss of steering
    Slip,
    /// Non-terminal swim zone
    Swim,
}

/// Static collision shape of a hazard type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionProfile {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub can_be_jumped: bool,
    pub can_be_slid: bool,
}

impl CollisionProfile {
    const fn new(width: f32, height: f32, depth: f32, can_be_jumped: bool, can_be_slid: bool) -> Self {
        Self {
            width,
            height,
            depth,
            can_be_jumped,
            can_be_slid,
        }
    }

    pub fn size(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }
}

impl HazardKind {
    pub fn profile(self) -> CollisionProfile {
        match self {
            HazardKind::Ice => CollisionProfile::new(1.0, 0.9, 1.0, true, true),
            HazardKind::Rock => CollisionProfile::new(0.9, 0.6, 0.9, true, true),
            HazardKind::Crevasse => CollisionProfile::new(1.5, 0.3, 2.0, true, false),
            HazardKind::LargeCrevasse => CollisionProfile::new(1.5, 0.3, 4.0, true, false),
            HazardKind::Seal => CollisionProfile::new(1.2, 0.8, 1.6, true, false),
            HazardKind::Fox => CollisionProfile::new(0.7, 0.6, 1.0, true, false),
            HazardKind::Snowball => CollisionProfile::new(0.8, 0.8, 0.8, true, true),
            HazardKind::IcePatch => CollisionProfile::new(2.0, 0.1, 2.0, true, true),
            HazardKind::Water => CollisionProfile::new(LANE_WIDTH * 0.8, 0.1, 6.0, true, true),
        }
    }

    pub fn policy(self) -> OutcomePolicy {
        match self {
            HazardKind::Crevasse | HazardKind::LargeCrevasse => OutcomePolicy::Chasm,
            HazardKind::Ice | HazardKind::Rock | HazardKind::Snowball => OutcomePolicy::JumpOrSlide,
            HazardKind::Seal | HazardKind::Fox => OutcomePolicy::MustJump,
            HazardKind::IcePatch => OutcomePolicy::Slip,
            HazardKind::Water => OutcomePolicy::Swim,
        }
    }

    /// Half-length of the track window in which this kind is tested
    pub fn collision_band(self) -> f32 {
        COLLISION_BAND.max(self.profile().depth / 2.0)
    }
}

impl Hazard {
    /// Profile height after scaling (snowballs vary in size)
    pub fn effective_height(&self) -> f32 {
        self.kind.profile().height * self.scale
    }

    pub fn hitbox(&self) -> Aabb {
        let size = self.kind.profile().size() * self.scale;
        Aabb::from_base(self.lane.x(), 0.0, self.position, size)
    }
}

/// Pickup box (fish bob around their tier height)
const COLLECTIBLE_SIZE: Vec3 = Vec3::new(0.8, 0.6, 0.8);

impl Collectible {
    pub fn hitbox(&self) -> Aabb {
        let base_y = self.height.y() - COLLECTIBLE_SIZE.y / 2.0;
        Aabb::from_base(self.lane.x(), base_y, self.position, COLLECTIBLE_SIZE)
    }
}

/// Vertical extent (bottom, height) of the player box per mode
fn player_vertical_extent(mode: VerticalMode) -> (f32, f32) {
    match mode {
        VerticalMode::Standing => (0.05, 1.0),
        VerticalMode::Sliding | VerticalMode::BellySliding => (0.05, 0.4),
        VerticalMode::Jumping => (1.1, 1.0),
        VerticalMode::Swimming => (-0.2, 0.6),
    }
}

impl Player {
    pub fn hitbox(&self) -> Aabb {
        let (base_y, height) = player_vertical_extent(self.mode);
        let size = Vec3::new(PLAYER_HITBOX_WIDTH, height, PLAYER_HITBOX_DEPTH);
        Aabb::from_base(self.x(), base_y, 0.0, size)
    }
}

/// Does contact with this hazard end the run in the given mode?
pub fn is_terminal(hazard: &Hazard, mode: VerticalMode) -> bool {
    let profile = hazard.kind.profile();
    let jumping = mode == VerticalMode::Jumping && profile.can_be_jumped;
    match hazard.kind.policy() {
        OutcomePolicy::Chasm | OutcomePolicy::MustJump => !jumping,
        OutcomePolicy::JumpOrSlide => {
            let slid_under = mode.is_sliding()
                && profile.can_be_slid
                && hazard.effective_height() < PASS_UNDER_THRESHOLD;
            !(jumping || slid_under)
        }
        OutcomePolicy::Slip | OutcomePolicy::Swim => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{CollectibleKind, HeightTier, Lane};

    fn hazard(kind: HazardKind, lane: Lane, position: f32) -> Hazard {
        Hazard {
            id: 1,
            lane,
            kind,
            position,
            rotation: 0.0,
            scale: 1.0,
        }
    }

    fn player(mode: VerticalMode) -> Player {
        Player {
            mode,
            ..Default::default()
        }
    }

    #[test]
    fn aabb_overlap_is_strict() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let c = Aabb::new(Vec3::splat(0.5), Vec3::splat(1.5));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn other_lanes_never_overlap() {
        let standing = player(VerticalMode::Standing).hitbox();
        for kind in HazardKind::ALL {
            let left = hazard(kind, Lane::Left, 0.0).hitbox();
            assert!(!standing.overlaps(&left), "{kind:?} leaked across lanes");
        }
    }

    #[test]
    fn jumping_box_clears_low_hazards() {
        let airborne = player(VerticalMode::Jumping).hitbox();
        for kind in [HazardKind::Crevasse, HazardKind::Rock, HazardKind::Fox, HazardKind::Water] {
            assert!(!airborne.overlaps(&hazard(kind, Lane::Center, 0.0).hitbox()));
        }
    }

    #[test]
    fn standing_overlaps_hazard_in_lane() {
        let standing = player(VerticalMode::Standing).hitbox();
        for kind in HazardKind::ALL {
            assert!(standing.overlaps(&hazard(kind, Lane::Center, 0.0).hitbox()), "{kind:?}");
        }
    }

    #[test]
    fn policies_by_mode() {
        let rock = hazard(HazardKind::Rock, Lane::Center, 0.0);
        let ice = hazard(HazardKind::Ice, Lane::Center, 0.0);
        let seal = hazard(HazardKind::Seal, Lane::Center, 0.0);
        let chasm = hazard(HazardKind::Crevasse, Lane::Center, 0.0);

        assert!(is_terminal(&rock, VerticalMode::Standing));
        assert!(!is_terminal(&rock, VerticalMode::Sliding));
        assert!(!is_terminal(&rock, VerticalMode::BellySliding));
        assert!(is_terminal(&ice, VerticalMode::Sliding));
        assert!(!is_terminal(&ice, VerticalMode::Jumping));
        assert!(is_terminal(&seal, VerticalMode::Sliding));
        assert!(!is_terminal(&seal, VerticalMode::Jumping));
        assert!(is_terminal(&chasm, VerticalMode::BellySliding));
        assert!(!is_terminal(&chasm, VerticalMode::Jumping));
    }

    #[test]
    fn small_snowballs_can_be_slid_past() {
        let mut snowball = hazard(HazardKind::Snowball, Lane::Center, 0.0);
        snowball.scale = 0.8;
        assert!(!is_terminal(&snowball, VerticalMode::Sliding));
        snowball.scale = 1.3;
        assert!(is_terminal(&snowball, VerticalMode::Sliding));
    }

    #[test]
    fn high_fish_needs_a_jump() {
        let fish = Collectible {
            id: 1,
            lane: Lane::Center,
            kind: CollectibleKind::Fish,
            position: 0.0,
            height: HeightTier::High,
            collected: false,
            fade: 0.0,
        };
        assert!(!player(VerticalMode::Standing).hitbox().overlaps(&fish.hitbox()));
        assert!(player(VerticalMode::Jumping).hitbox().overlaps(&fish.hitbox()));
    }

    #[test]
    fn sweep_catches_fast_movers() {
        let standing = player(VerticalMode::Standing).hitbox();
        let rock = hazard(HazardKind::Rock, Lane::Center, 3.0).hitbox();
        assert!(!standing.overlaps(&rock));
        assert!(standing.overlaps(&rock.swept_back(4.0)));
    }

    #[test]
    fn long_chasms_get_wider_band() {
        assert_eq!(HazardKind::Rock.collision_band(), COLLISION_BAND);
        assert_eq!(HazardKind::LargeCrevasse.collision_band(), 2.0);
        assert_eq!(HazardKind::Water.collision_band(), 3.0);
    }
}
