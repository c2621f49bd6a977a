//! Static decor the car can hit: trees, horses and mountains.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

/// Obstacle category. Order of `COLLISION_PRIORITY` decides which obstacle
/// wins when the car overlaps several in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    Tree,
    Horse,
    Mountain,
}

impl ObstacleKind {
    pub const COLLISION_PRIORITY: [ObstacleKind; 3] =
        [ObstacleKind::Tree, ObstacleKind::Horse, ObstacleKind::Mountain];

    /// Trees and horses fall over when struck; mountains never move.
    pub fn is_knockable(self) -> bool {
        !matches!(self, ObstacleKind::Mountain)
    }
}

/// Stable index into an `ObstacleRegistry`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObstacleId(pub usize);

/// A placed obstacle on the ground plane.
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Base position; y is always 0.
    pub position: Vec3,
    /// Collision radius.
    pub radius: f32,
    /// Visual height (mountains only).
    pub height: f32,
    /// Facing around the vertical axis, radians.
    pub yaw: f32,
    knocked_down: bool,
    /// Rotation about the fall axis. 0 is upright, -π/2 is flat.
    tilt: f32,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, position: Vec3, radius: f32) -> Self {
        Self {
            kind,
            position: Vec3::new(position.x, 0.0, position.z),
            radius,
            height: 0.0,
            yaw: 0.0,
            knocked_down: false,
            tilt: 0.0,
        }
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn is_knocked_down(&self) -> bool {
        self.knocked_down
    }

    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    /// Whether this obstacle can currently stop or slow the car.
    pub fn is_solid(&self) -> bool {
        !self.knocked_down
    }

    /// Edge-to-edge gap between two obstacles on the ground plane.
    pub fn gap_to(&self, other: &Obstacle) -> f32 {
        ground_distance(self.position, other.position) - self.radius - other.radius
    }

    /// Fell the obstacle. Returns `true` only on the first call for a
    /// knockable obstacle; the flag never reverts.
    pub(crate) fn knock_down(&mut self) -> bool {
        if self.knocked_down || !self.kind.is_knockable() {
            return false;
        }
        self.knocked_down = true;
        true
    }

    /// Move the fall rotation toward `target`, never past it and never back.
    /// Returns `true` once the target is reached.
    pub(crate) fn tip_toward(&mut self, target: f32, step: f32) -> bool {
        self.tilt = (self.tilt - step.max(0.0)).max(target);
        self.tilt <= target
    }
}

/// Terminal fall rotation for knocked obstacles.
pub const FALLEN_TILT: f32 = -FRAC_PI_2;

/// Read-only view of an obstacle for renderers and overlays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleSnapshot {
    pub id: ObstacleId,
    pub kind: ObstacleKind,
    pub position: Vec3,
    pub radius: f32,
    pub knocked_down: bool,
    pub tilt: f32,
}

/// Every obstacle in the session. Built once; only knockdown state changes.
#[derive(Clone, Debug, Default)]
pub struct ObstacleRegistry {
    obstacles: Vec<Obstacle>,
}

impl ObstacleRegistry {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: ObstacleId) -> Option<&mut Obstacle> {
        self.obstacles.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> {
        self.obstacles
            .iter()
            .enumerate()
            .map(|(i, obstacle)| (ObstacleId(i), obstacle))
    }

    pub fn of_kind(&self, kind: ObstacleKind) -> impl Iterator<Item = (ObstacleId, &Obstacle)> {
        self.iter().filter(move |(_, obstacle)| obstacle.kind == kind)
    }

    pub fn count_of(&self, kind: ObstacleKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn knocked_down_count(&self) -> usize {
        self.obstacles.iter().filter(|o| o.is_knocked_down()).count()
    }

    pub fn snapshot(&self) -> Vec<ObstacleSnapshot> {
        self.iter()
            .map(|(id, obstacle)| ObstacleSnapshot {
                id,
                kind: obstacle.kind,
                position: obstacle.position,
                radius: obstacle.radius,
                knocked_down: obstacle.is_knocked_down(),
                tilt: obstacle.tilt(),
            })
            .collect()
    }
}

/// Distance between two points ignoring height.
pub fn ground_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knockdown_is_one_way_and_only_for_knockables() {
        let mut tree = Obstacle::new(ObstacleKind::Tree, Vec3::new(1.0, 3.0, 2.0), 4.0);
        assert_eq!(tree.position.y, 0.0);
        assert!(tree.is_solid());

        assert!(tree.knock_down());
        assert!(!tree.knock_down());
        assert!(tree.is_knocked_down());
        assert!(!tree.is_solid());

        let mut mountain = Obstacle::new(ObstacleKind::Mountain, Vec3::ZERO, 40.0);
        assert!(!mountain.knock_down());
        assert!(mountain.is_solid());
    }

    #[test]
    fn tilt_clamps_at_target() {
        let mut horse = Obstacle::new(ObstacleKind::Horse, Vec3::ZERO, 1.2);
        assert!(!horse.tip_toward(FALLEN_TILT, 1.0));
        assert_eq!(horse.tilt(), -1.0);
        assert!(horse.tip_toward(FALLEN_TILT, 5.0));
        assert_eq!(horse.tilt(), FALLEN_TILT);
        // Negative steps never raise it back up
        assert!(horse.tip_toward(FALLEN_TILT, -3.0));
        assert_eq!(horse.tilt(), FALLEN_TILT);
    }

    #[test]
    fn registry_filters_by_kind_in_insertion_order() {
        let registry = ObstacleRegistry::new(vec![
            Obstacle::new(ObstacleKind::Mountain, Vec3::ZERO, 30.0),
            Obstacle::new(ObstacleKind::Tree, Vec3::X, 4.0),
            Obstacle::new(ObstacleKind::Tree, Vec3::Z, 4.0),
            Obstacle::new(ObstacleKind::Horse, Vec3::NEG_X, 1.2),
        ]);

        let trees: Vec<ObstacleId> = registry.of_kind(ObstacleKind::Tree).map(|(id, _)| id).collect();
        assert_eq!(trees, vec![ObstacleId(1), ObstacleId(2)]);
        assert_eq!(registry.count_of(ObstacleKind::Horse), 1);
        assert_eq!(registry.snapshot().len(), 4);
        assert_eq!(registry.knocked_down_count(), 0);
    }

    #[test]
    fn gap_is_measured_edge_to_edge_on_the_ground() {
        let a = Obstacle::new(ObstacleKind::Tree, Vec3::new(0.0, 0.0, 0.0), 4.0);
        let b = Obstacle::new(ObstacleKind::Horse, Vec3::new(10.0, 7.0, 0.0), 1.2);
        assert!((a.gap_to(&b) - 4.8).abs() < 1e-5);
    }
}
