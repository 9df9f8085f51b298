use glam::Vec2;
use rapier2d::na as nalgebra;
use rapier2d::prelude::{
    CCDSolver, ColliderBuilder, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline,
    QueryPipeline, RigidBodyBuilder, RigidBodySet, vector,
};

/// Non-owning reference to a body in the world's body table.
pub use rapier2d::prelude::RigidBodyHandle as BodyHandle;

/// How a body responds to forces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Fully simulated: gravity, impulses, contacts.
    Dynamic,
    /// Immovable level geometry.
    Fixed,
}

/// Definition for a box-shaped rigid body.
///
/// Position and half extents are in physics units. The default material is
/// density 1, friction 0.3, restitution 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxBodyDef {
    pub position: Vec2,
    pub half_extents: Vec2,
    pub kind: BodyKind,
    pub fixed_rotation: bool,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for BoxBodyDef {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            half_extents: Vec2::splat(0.5),
            kind: BodyKind::Dynamic,
            fixed_rotation: false,
            density: 1.0,
            friction: 0.3,
            restitution: 0.0,
        }
    }
}

/// The shared rigid-body world.
///
/// Owns every body and fixture. Entities keep [`BodyHandle`]s for queries
/// only; removal goes through [`PhysicsWorld::remove_body`].
pub struct PhysicsWorld {
    gravity: rapier2d::prelude::Vector<f32>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, -9.81))
    }
}

impl PhysicsWorld {
    /// Create an empty world with the given gravity (physics units).
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: vector![gravity.x, gravity.y],
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Create a body with a single cuboid fixture from a definition.
    pub fn spawn_box(&mut self, def: &BoxBodyDef) -> BodyHandle {
        let builder = match def.kind {
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
        };
        let mut builder = builder.translation(vector![def.position.x, def.position.y]);
        if def.fixed_rotation {
            builder = builder.lock_rotations();
        }
        let handle = self.bodies.insert(builder);

        let collider = ColliderBuilder::cuboid(def.half_extents.x, def.half_extents.y)
            .density(def.density)
            .friction(def.friction)
            .restitution(def.restitution);
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        tracing::debug!(kind = ?def.kind, x = def.position.x, y = def.position.y, "spawned body");
        handle
    }

    /// Current world-space position of a body, if it still exists.
    pub fn body_position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(handle).map(|body| {
            let t = body.translation();
            Vec2::new(t.x, t.y)
        })
    }

    /// Set a body's linear velocity, waking it.
    pub fn set_body_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_linvel(vector![velocity.x, velocity.y], true);
        }
    }

    /// Apply a one-shot impulse at the body's center of mass.
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.apply_impulse(vector![impulse.x, impulse.y], true);
        }
    }

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Remove a body and its fixtures. Existing handles to it go stale
    /// and query to `None` afterwards.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    /// Number of bodies currently in the world.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_at_definition_position() {
        let mut world = PhysicsWorld::default();
        let handle = world.spawn_box(&BoxBodyDef {
            position: Vec2::new(2.5, 7.0),
            ..BoxBodyDef::default()
        });
        let pos = world.body_position(handle).unwrap();
        assert!((pos - Vec2::new(2.5, 7.0)).length() < 1e-6);
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn gravity_pulls_dynamic_bodies() {
        let mut world = PhysicsWorld::default();
        let handle = world.spawn_box(&BoxBodyDef::default());
        let before = world.body_position(handle).unwrap();
        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }
        let after = world.body_position(handle).unwrap();
        assert!(after.y < before.y);
    }

    #[test]
    fn fixed_bodies_do_not_move() {
        let mut world = PhysicsWorld::default();
        let handle = world.spawn_box(&BoxBodyDef {
            kind: BodyKind::Fixed,
            position: Vec2::new(1.0, 1.0),
            ..BoxBodyDef::default()
        });
        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }
        let pos = world.body_position(handle).unwrap();
        assert!((pos - Vec2::new(1.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn velocity_moves_body_without_gravity() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let handle = world.spawn_box(&BoxBodyDef::default());
        world.set_body_velocity(handle, Vec2::new(5.0, 0.0));
        world.step(1.0);
        let pos = world.body_position(handle).unwrap();
        assert!((pos.x - 5.0).abs() < 1e-3);
        assert!(pos.y.abs() < 1e-3);
    }

    #[test]
    fn impulse_moves_dynamic_body() {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let handle = world.spawn_box(&BoxBodyDef::default());
        world.apply_impulse(handle, Vec2::new(2.0, 0.0));
        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }
        let pos = world.body_position(handle).unwrap();
        assert!(pos.x > 0.0);
        assert!(pos.y.abs() < 1e-4);
    }

    #[test]
    fn removed_handle_queries_to_none() {
        let mut world = PhysicsWorld::default();
        let handle = world.spawn_box(&BoxBodyDef::default());
        assert!(world.contains(handle));
        assert!(world.remove_body(handle));
        assert!(!world.contains(handle));
        assert!(world.body_position(handle).is_none());
        assert_eq!(world.body_count(), 0);
        // Double remove is a no-op.
        assert!(!world.remove_body(handle));
    }

    #[test]
    fn dynamic_body_settles_on_fixed_floor() {
        let mut world = PhysicsWorld::default();
        let floor = world.spawn_box(&BoxBodyDef {
            kind: BodyKind::Fixed,
            position: Vec2::new(0.0, -1.0),
            half_extents: Vec2::new(10.0, 0.5),
            ..BoxBodyDef::default()
        });
        let faller = world.spawn_box(&BoxBodyDef {
            position: Vec2::new(0.0, 2.0),
            fixed_rotation: true,
            ..BoxBodyDef::default()
        });
        for _ in 0..300 {
            world.step(1.0 / 60.0);
        }
        let floor_pos = world.body_position(floor).unwrap();
        let faller_pos = world.body_position(faller).unwrap();
        // Resting on the floor surface: floor top at -0.5, half extent 0.5.
        assert!((faller_pos.y - 0.0).abs() < 0.1);
        assert!((floor_pos.y - -1.0).abs() < 1e-6);
    }
}
