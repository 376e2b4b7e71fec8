//! rapier2d integration in screen space.
//!
//! [`PhysicsWorld`] owns a rapier2d simulation and hands out opaque
//! [`BodyId`]s. Coordinates are pixels with y growing downward, so gravity is
//! a positive y acceleration and positive rotations turn clockwise on screen,
//! matching how the [`Canvas`](crate::canvas::Canvas) draws.
//!
//! # Determinism
//!
//! rapier2d is compiled with `enhanced-determinism`. Bodies are inserted in a
//! fixed order by the scene and every list this module returns is sorted by
//! [`BodyId`], so a seeded scene steps identically on the same platform.

use std::collections::HashMap;
use std::fmt;

use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;

/// Friction applied to every collider. Low, so tokens slide off the tilted
/// controls instead of resting on them.
const SURFACE_FRICTION: Real = 0.1;

// ---------------------------------------------------------------------------
// Body descriptors
// ---------------------------------------------------------------------------

/// Stable handle for a body in a [`PhysicsWorld`]. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u64);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How rapier treats a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Moved by gravity and collisions.
    Dynamic,
    /// Never moves (walls, controls).
    Static,
}

/// Collider shape, in full extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Box { width: f64, height: f64 },
    Circle { radius: f64 },
}

impl ColliderShape {
    fn to_shared(self) -> SharedShape {
        match self {
            ColliderShape::Box { width, height } => {
                SharedShape::cuboid((width / 2.0) as Real, (height / 2.0) as Real)
            }
            ColliderShape::Circle { radius } => SharedShape::ball(radius as Real),
        }
    }
}

/// Everything needed to create a body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    pub kind: BodyKind,
    pub shape: ColliderShape,
    /// Centre x.
    pub x: f64,
    /// Centre y.
    pub y: f64,
    /// Initial rotation in radians.
    pub rotation: f64,
    /// Coefficient of restitution; pairs bounce with the larger of the two.
    pub restitution: f64,
    /// Total mass. `None` derives it from the shape with unit density.
    pub mass: Option<f64>,
    /// Initial linear velocity in pixels per second. Ignored for static bodies.
    pub velocity: (f64, f64),
}

impl BodySpec {
    /// Static, unrotated box.
    pub fn static_box(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            kind: BodyKind::Static,
            shape: ColliderShape::Box { width, height },
            x,
            y,
            rotation: 0.0,
            restitution: 0.0,
            mass: None,
            velocity: (0.0, 0.0),
        }
    }
}

/// Position and orientation of a body after a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyTransform {
    pub x: f64,
    pub y: f64,
    /// Rotation in radians.
    pub angle: f64,
}

/// Two bodies that started touching during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactPair {
    pub a: BodyId,
    pub b: BodyId,
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// rapier2d simulation state plus the id mapping.
pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    next_id: u64,
    bodies: HashMap<BodyId, RigidBodyHandle>,
    colliders: HashMap<ColliderHandle, BodyId>,
}

impl PhysicsWorld {
    /// Create an empty world with the configured gravity and step size.
    pub fn new(config: &PhysicsConfig) -> Self {
        let integration_params = IntegrationParameters {
            dt: config.fixed_dt as Real,
            length_unit: config.length_unit as Real,
            ..IntegrationParameters::default()
        };
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, config.gravity as Real],
            integration_params,
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            next_id: 0,
            bodies: HashMap::new(),
            colliders: HashMap::new(),
        }
    }

    /// Add a body with a single collider and return its id.
    pub fn insert(&mut self, spec: &BodySpec) -> BodyId {
        let translation = vector![spec.x as Real, spec.y as Real];
        let rb = match spec.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic()
                .ccd_enabled(true)
                .linvel(vector![spec.velocity.0 as Real, spec.velocity.1 as Real]),
            BodyKind::Static => RigidBodyBuilder::fixed(),
        }
        .translation(translation)
        .rotation(spec.rotation as Real)
        .build();
        let body_handle = self.rigid_body_set.insert(rb);

        let mut collider = ColliderBuilder::new(spec.shape.to_shared())
            .restitution(spec.restitution as Real)
            .restitution_combine_rule(CoefficientCombineRule::Max)
            .friction(SURFACE_FRICTION)
            .active_events(ActiveEvents::COLLISION_EVENTS);
        if let Some(mass) = spec.mass {
            collider = collider.mass(mass as Real);
        }
        let collider_handle = self.collider_set.insert_with_parent(
            collider.build(),
            body_handle,
            &mut self.rigid_body_set,
        );

        let id = BodyId(self.next_id);
        self.next_id += 1;
        self.bodies.insert(id, body_handle);
        self.colliders.insert(collider_handle, id);
        id
    }

    /// Remove a body and its collider. Unknown ids are ignored.
    pub fn remove(&mut self, id: BodyId) -> bool {
        let Some(handle) = self.bodies.remove(&id) else {
            return false;
        };
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
        self.colliders.retain(|_, owner| *owner != id);
        true
    }

    /// Advance the simulation by one fixed step.
    ///
    /// Returns the contacts that started during the step, sorted by id pair.
    pub fn step(&mut self) -> Vec<ContactPair> {
        let (collision_send, collision_recv) =
            rapier2d::crossbeam::channel::unbounded::<CollisionEvent>();
        let (force_send, _force_recv) =
            rapier2d::crossbeam::channel::unbounded::<ContactForceEvent>();
        let event_handler = ChannelEventCollector::new(collision_send, force_send);

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &event_handler,
        );

        let mut contacts = Vec::new();
        while let Ok(event) = collision_recv.try_recv() {
            if let CollisionEvent::Started(h1, h2, _) = event {
                if let (Some(&a), Some(&b)) = (self.colliders.get(&h1), self.colliders.get(&h2)) {
                    contacts.push(ContactPair {
                        a: a.min(b),
                        b: a.max(b),
                    });
                }
            }
        }
        // Channel delivery order is not stable across runs.
        contacts.sort_by_key(|c| (c.a, c.b));
        contacts
    }

    /// Current transform of a body.
    pub fn transform(&self, id: BodyId) -> Option<BodyTransform> {
        let rb = self.rigid_body_set.get(*self.bodies.get(&id)?)?;
        let t = rb.translation();
        Some(BodyTransform {
            x: t.x as f64,
            y: t.y as f64,
            angle: rb.rotation().angle() as f64,
        })
    }

    /// Linear velocity of a body.
    pub fn velocity(&self, id: BodyId) -> Option<(f64, f64)> {
        let rb = self.rigid_body_set.get(*self.bodies.get(&id)?)?;
        let v = rb.linvel();
        Some((v.x as f64, v.y as f64))
    }

    /// Transforms of all dynamic bodies, sorted by id.
    pub fn dynamic_transforms(&self) -> Vec<(BodyId, BodyTransform)> {
        let mut out: Vec<_> = self
            .bodies
            .iter()
            .filter(|(_, handle)| {
                self.rigid_body_set
                    .get(**handle)
                    .is_some_and(|rb| rb.is_dynamic())
            })
            .filter_map(|(&id, _)| Some((id, self.transform(id)?)))
            .collect();
        out.sort_by_key(|(id, _)| *id);
        out
    }

    /// Whether `id` refers to a live body.
    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Fixed step length in seconds.
    pub fn fixed_dt(&self) -> f64 {
        self.integration_params.dt as f64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(x: f64, y: f64) -> BodySpec {
        BodySpec {
            kind: BodyKind::Dynamic,
            shape: ColliderShape::Circle { radius: 30.0 },
            x,
            y,
            rotation: 0.0,
            restitution: 1.0,
            mass: Some(30.0),
            velocity: (0.0, 0.0),
        }
    }

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(&PhysicsConfig::default())
    }

    #[test]
    fn new_world_is_empty() {
        let pw = world();
        assert_eq!(pw.body_count(), 0);
        assert!((pw.fixed_dt() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn ids_are_sequential_and_not_reused() {
        let mut pw = world();
        let a = pw.insert(&ball(0.0, 0.0));
        let b = pw.insert(&ball(100.0, 0.0));
        assert_eq!((a, b), (BodyId(0), BodyId(1)));
        assert!(pw.remove(a));
        assert!(!pw.contains(a));
        assert!(pw.contains(b));
        let c = pw.insert(&ball(200.0, 0.0));
        assert_eq!(c, BodyId(2));
        assert_eq!(pw.body_count(), 2);
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut pw = world();
        assert!(!pw.remove(BodyId(42)));
        assert_eq!(pw.body_count(), 0);
    }

    #[test]
    fn dynamic_body_falls_down_screen() {
        let mut pw = world();
        let id = pw.insert(&ball(300.0, 0.0));
        for _ in 0..30 {
            pw.step();
        }
        let t = pw.transform(id).unwrap();
        assert!(t.y > 50.0, "ball should fall toward larger y, got {}", t.y);
        let (_, vy) = pw.velocity(id).unwrap();
        assert!(vy > 0.0);
    }

    #[test]
    fn static_body_stays_put_and_keeps_rotation() {
        let mut pw = world();
        let mut spec = BodySpec::static_box(100.0, 200.0, 40.0, 40.0);
        spec.rotation = 0.5;
        let id = pw.insert(&spec);
        for _ in 0..10 {
            pw.step();
        }
        let t = pw.transform(id).unwrap();
        assert_eq!((t.x, t.y), (100.0, 200.0));
        assert!((t.angle - 0.5).abs() < 1e-5);
        assert!(pw.dynamic_transforms().is_empty());
    }

    #[test]
    fn ball_bounces_off_floor() {
        let mut pw = world();
        pw.insert(&BodySpec::static_box(300.0, 400.0, 600.0, 20.0));
        let id = pw.insert(&ball(300.0, 200.0));

        let mut contacts = Vec::new();
        let mut went_up = false;
        for _ in 0..120 {
            contacts.extend(pw.step());
            if pw.velocity(id).unwrap().1 < -10.0 {
                went_up = true;
            }
        }
        assert!(!contacts.is_empty(), "ball should hit the floor");
        assert_eq!(contacts[0], ContactPair { a: BodyId(0), b: id });
        assert!(went_up, "restitution 1 should send the ball back up");
    }

    #[test]
    fn fast_ball_does_not_tunnel_through_thin_wall() {
        let mut pw = world();
        let wall = pw.insert(&BodySpec::static_box(100.0, 200.0, 1.0, 400.0));
        // 100 px per step against a 1 px wall: only CCD catches the hit.
        let id = pw.insert(&BodySpec {
            shape: ColliderShape::Circle { radius: 2.0 },
            velocity: (6000.0, 0.0),
            ..ball(50.0, 200.0)
        });

        let mut contacts = Vec::new();
        for _ in 0..30 {
            contacts.extend(pw.step());
            let t = pw.transform(id).unwrap();
            assert!(t.x < 100.0, "ball crossed the wall, x = {}", t.x);
        }
        assert!(contacts.contains(&ContactPair { a: wall, b: id }));
        assert!(pw.velocity(id).unwrap().0 < 0.0, "ball should rebound");
    }

    #[test]
    fn static_bodies_ignore_initial_velocity() {
        let mut pw = world();
        let id = pw.insert(&BodySpec {
            velocity: (500.0, 500.0),
            ..BodySpec::static_box(10.0, 10.0, 5.0, 5.0)
        });
        pw.step();
        assert_eq!(pw.velocity(id), Some((0.0, 0.0)));
    }

    #[test]
    fn dynamic_transforms_sorted_by_id() {
        let mut pw = world();
        for i in 0..5 {
            pw.insert(&ball(i as f64 * 100.0, 0.0));
        }
        pw.step();
        let ids: Vec<_> = pw.dynamic_transforms().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, (0..5).map(BodyId).collect::<Vec<_>>());
    }

    #[test]
    fn identical_runs_are_deterministic() {
        fn run() -> Vec<(f64, f64, f64)> {
            let mut pw = world();
            let mut spec = BodySpec::static_box(310.0, 300.0, 80.0, 40.0);
            spec.rotation = 45.0;
            pw.insert(&spec);
            let id = pw.insert(&ball(300.0, 0.0));
            (0..200)
                .map(|_| {
                    pw.step();
                    let t = pw.transform(id).unwrap();
                    (t.x, t.y, t.angle)
                })
                .collect()
        }
        assert_eq!(run(), run());
    }
}
