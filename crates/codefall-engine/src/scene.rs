//! The scene: physics world, generated bodies, and the frame loop.
//!
//! [`Scene::new`] assembles everything in a fixed order -- the two bumpers,
//! then the control layout, then the first variable -- so body ids and RNG
//! draws are reproducible for a given seed. Each [`Scene::tick`]:
//!
//! 1. Advances the spawn timer and drops in any variables that are due.
//! 2. Steps rapier by the fixed dt.
//! 3. Removes variables that have fallen past the cull line.
//!
//! Drawing is separate: [`Scene::draw_items`] describes what is on screen and
//! [`Scene::render`] paints it into a [`Canvas`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::canvas::Canvas;
use crate::config::{Rgba, SceneConfig};
use crate::controls::{layout_controls, ControlKind};
use crate::physics::{BodyId, BodySpec, PhysicsWorld};
use crate::rng::SceneRng;
use crate::sprite::{SpriteAtlas, SpriteKey};
use crate::variables::{SpawnTimer, VariableKind};
use crate::EngineError;

/// What a body is in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "kind", rename_all = "lowercase")]
pub enum BodyRole {
    Bumper,
    Control(ControlKind),
    Variable(VariableKind),
}

/// How a body is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Visual {
    Sprite(SpriteKey),
    Fill { width: f64, height: f64, color: Rgba },
}

/// One body to draw this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub id: BodyId,
    pub role: BodyRole,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub visual: Visual,
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number after this tick completed.
    pub tick: u64,
    pub spawned: usize,
    pub culled: usize,
    /// Contacts that started during the physics step.
    pub contacts: usize,
}

/// The running animation.
pub struct Scene {
    config: SceneConfig,
    rng: SceneRng,
    physics: PhysicsWorld,
    atlas: SpriteAtlas,
    roles: BTreeMap<BodyId, BodyRole>,
    timer: SpawnTimer,
    tick_counter: u64,
    spawned_total: u64,
    culled_total: u64,
}

impl Scene {
    /// Validate `config` and build the initial scene.
    pub fn new(config: SceneConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let rng = SceneRng::new(config.seed);
        let physics = PhysicsWorld::new(&config.physics);
        let atlas = SpriteAtlas::build(&config);
        let timer = SpawnTimer::new(config.variables.spawn_interval, config.physics.fixed_dt);

        let mut scene = Self {
            config,
            rng,
            physics,
            atlas,
            roles: BTreeMap::new(),
            timer,
            tick_counter: 0,
            spawned_total: 0,
            culled_total: 0,
        };

        scene.add_bumpers();
        let controls = scene.add_controls();
        scene.spawn_variable();

        tracing::info!(
            seed = scene.rng.seed(),
            width = scene.config.width,
            height = scene.config.height,
            controls,
            bodies = scene.physics.body_count(),
            "scene built"
        );
        Ok(scene)
    }

    fn add_bumpers(&mut self) {
        let b = &self.config.bumpers;
        let height = self.config.height * 2.0;
        for x in [b.inset, self.config.width - b.inset] {
            let id = self
                .physics
                .insert(&BodySpec::static_box(x, 0.0, b.thickness, height));
            self.roles.insert(id, BodyRole::Bumper);
        }
    }

    fn add_controls(&mut self) -> usize {
        let placements = layout_controls(&self.config.controls, self.config.width, &mut self.rng);
        for placement in &placements {
            let id = self
                .physics
                .insert(&placement.body_spec(&self.config.controls));
            self.roles.insert(id, BodyRole::Control(placement.kind));
        }
        placements.len()
    }

    fn spawn_variable(&mut self) -> BodyId {
        let kind = VariableKind::pick(&mut self.rng);
        let id = self.physics.insert(&self.config.variables.body_spec());
        self.roles.insert(id, BodyRole::Variable(kind));
        self.spawned_total += 1;
        tracing::debug!(%id, label = kind.label(), tick = self.tick_counter, "variable spawned");
        id
    }

    /// Advance the scene by one fixed step.
    pub fn tick(&mut self) -> TickReport {
        let due = self.timer.advance();
        for _ in 0..due {
            self.spawn_variable();
        }

        let contacts = self.physics.step();
        let culled = self.cull_fallen();
        self.tick_counter += 1;

        TickReport {
            tick: self.tick_counter,
            spawned: due,
            culled,
            contacts: contacts.len(),
        }
    }

    /// Run `count` ticks; returns the number of variables spawned meanwhile.
    pub fn run_ticks(&mut self, count: u64) -> u64 {
        (0..count).map(|_| self.tick().spawned as u64).sum()
    }

    fn cull_fallen(&mut self) -> usize {
        let Some(margin) = self.config.variables.cull_margin else {
            return 0;
        };
        let limit = self.config.height + margin;
        let fallen: Vec<BodyId> = self
            .physics
            .dynamic_transforms()
            .into_iter()
            .filter(|(_, t)| t.y > limit)
            .map(|(id, _)| id)
            .collect();
        for id in &fallen {
            self.physics.remove(*id);
            self.roles.remove(id);
            tracing::trace!(%id, "variable culled");
        }
        self.culled_total += fallen.len() as u64;
        fallen.len()
    }

    // -- drawing --------------------------------------------------------------

    /// Everything visible this frame, in id order (bumpers, controls, then
    /// variables oldest first).
    pub fn draw_items(&self) -> Vec<DrawItem> {
        self.roles
            .iter()
            .filter_map(|(&id, &role)| {
                let t = self.physics.transform(id)?;
                let visual = match role {
                    BodyRole::Bumper => Visual::Fill {
                        width: self.config.bumpers.thickness,
                        height: self.config.height * 2.0,
                        color: self.config.bumpers.color,
                    },
                    BodyRole::Control(kind) => Visual::Sprite(SpriteKey::Control(kind)),
                    BodyRole::Variable(kind) => Visual::Sprite(SpriteKey::Variable(kind)),
                };
                Some(DrawItem {
                    id,
                    role,
                    x: t.x,
                    y: t.y,
                    angle: t.angle,
                    visual,
                })
            })
            .collect()
    }

    /// Blank canvas sized and coloured for this scene.
    pub fn new_canvas(&self) -> Canvas {
        let (w, h) = self.config.pixel_size();
        Canvas::new(w, h, self.config.background)
    }

    /// Clear `canvas` and paint the current frame into it.
    pub fn render(&self, canvas: &mut Canvas) {
        canvas.clear();
        for item in self.draw_items() {
            match item.visual {
                Visual::Sprite(key) => {
                    if let Some(sprite) = self.atlas.get(key) {
                        canvas.draw_sprite(sprite, item.x, item.y, item.angle);
                    }
                }
                Visual::Fill {
                    width,
                    height,
                    color,
                } => canvas.fill_rect(item.x, item.y, width, height, item.angle, color),
            }
        }
    }

    // -- accessors ------------------------------------------------------------

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Seed the scene's RNG started from; replaying it rebuilds this scene.
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Simulated seconds, computed from the tick count to avoid drift.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 * self.physics.fixed_dt()
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn atlas(&self) -> &SpriteAtlas {
        &self.atlas
    }

    /// Bodies and their roles in id order.
    pub fn roles(&self) -> impl Iterator<Item = (BodyId, BodyRole)> + '_ {
        self.roles.iter().map(|(&id, &role)| (id, role))
    }

    pub fn role(&self, id: BodyId) -> Option<BodyRole> {
        self.roles.get(&id).copied()
    }

    pub fn body_count(&self) -> usize {
        self.roles.len()
    }

    pub fn control_count(&self) -> usize {
        self.count_where(|r| matches!(r, BodyRole::Control(_)))
    }

    /// Variables currently in the world.
    pub fn variable_count(&self) -> usize {
        self.count_where(|r| matches!(r, BodyRole::Variable(_)))
    }

    /// Variables spawned since the scene was built, the first one included.
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    pub fn culled_total(&self) -> u64 {
        self.culled_total
    }

    fn count_where(&self, pred: impl Fn(&BodyRole) -> bool) -> usize {
        self.roles.values().filter(|r| pred(r)).count()
    }
}
