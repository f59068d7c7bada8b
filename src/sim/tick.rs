//! Per-frame game loop
//!
//! `Runner` owns the player, the run, the chunk registry and every
//! collaborator. One `tick` runs, strictly in order: kinematics, streaming
//! (plus prop animation), collision and perks, then scoring and the HUD.
//! Nothing suspends mid-tick; chunk generation is synchronous.

use super::collision::{self, Resolution};
use super::difficulty::DifficultyCurve;
use super::generate::ChunkGenerator;
use super::kinematics;
use super::random::{RandomSource, SeededRandom};
use super::scene::{PropFactory, RenderSurface};
use super::state::{GameEvent, GamePhase, PlayerState, RunState};
use super::world::{Streaming, World};
use crate::audio::{AudioSink, NullAudio};
use crate::error::{GameError, Result};
use crate::highscores::HighScore;
use crate::persistence::HighScoreStore;
use crate::renderer::ProceduralProps;
use crate::settings::Settings;
use crate::ui::{HudSink, HudSnapshot, NullHud};

/// Resolved control intent for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// One-shot: true only on the tick after a fresh press
    pub jump_requested: bool,
    pub crouch_held: bool,
}

/// Assembles a `Runner`; the render surface and high score store are required
pub struct RunnerBuilder {
    settings: Settings,
    seed: u64,
    surface: Option<Box<dyn RenderSurface>>,
    store: Option<Box<dyn HighScoreStore>>,
    props: Option<Box<dyn PropFactory>>,
    rng: Option<Box<dyn RandomSource>>,
    hud: Option<Box<dyn HudSink>>,
    audio: Option<Box<dyn AudioSink>>,
}

impl RunnerBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            seed: 0,
            surface: None,
            store: None,
            props: None,
            rng: None,
            hud: None,
            audio: None,
        }
    }

    /// Seed for the default random source
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn surface(mut self, surface: impl RenderSurface + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    pub fn store(mut self, store: impl HighScoreStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn props(mut self, props: impl PropFactory + 'static) -> Self {
        self.props = Some(Box::new(props));
        self
    }

    pub fn rng(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn hud(mut self, hud: impl HudSink + 'static) -> Self {
        self.hud = Some(Box::new(hud));
        self
    }

    pub fn audio(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    pub fn build(self) -> Result<Runner> {
        self.settings.validate()?;
        let surface = self
            .surface
            .ok_or(GameError::MissingCollaborator("render surface"))?;
        let store = self
            .store
            .ok_or(GameError::MissingCollaborator("high score store"))?;

        let settings = self.settings;
        let high = HighScore::load(store);
        let seed = self.seed;
        Ok(Runner {
            player: PlayerState::new(&settings.player),
            run: RunState::new(high.best()),
            world: World::new(settings.world.chunk_size, settings.world.render_radius),
            generator: ChunkGenerator::new(&settings.world, &settings.perks),
            curve: DifficultyCurve::new(&settings.difficulty),
            high,
            surface,
            props: self.props.unwrap_or_else(|| Box::new(ProceduralProps)),
            rng: self.rng.unwrap_or_else(|| Box::new(SeededRandom::new(seed))),
            hud: self.hud.unwrap_or_else(|| Box::new(NullHud)),
            audio: self.audio.unwrap_or_else(|| Box::new(NullAudio)),
            settings,
        })
    }
}

/// The running game
pub struct Runner {
    settings: Settings,
    player: PlayerState,
    run: RunState,
    world: World,
    generator: ChunkGenerator,
    curve: DifficultyCurve,
    high: HighScore,
    surface: Box<dyn RenderSurface>,
    props: Box<dyn PropFactory>,
    rng: Box<dyn RandomSource>,
    hud: Box<dyn HudSink>,
    audio: Box<dyn AudioSink>,
}

impl Runner {
    pub fn builder(settings: Settings) -> RunnerBuilder {
        RunnerBuilder::new(settings)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn phase(&self) -> GamePhase {
        self.run.phase
    }

    pub fn high_score(&self) -> u64 {
        self.high.best()
    }

    /// What the HUD would show right now
    pub fn hud_snapshot(&self, time: f32) -> HudSnapshot {
        HudSnapshot::capture(&self.player, &self.run, time)
    }

    /// Begin a fresh run: the previous run's world is torn down, the high score kept
    pub fn start_run(&mut self) -> GameEvent {
        self.world.clear(self.surface.as_mut());
        self.player = PlayerState::new(&self.settings.player);
        self.run.restart();
        self.run.high_score = self.high.best();

        self.hud.run_started();
        self.hud.update(&HudSnapshot::capture(&self.player, &self.run, 0.0));
        self.audio.run_started();
        log::info!("Run started (high score {})", self.run.high_score);
        GameEvent::RunStarted
    }

    /// Advance one frame; a no-op unless a run is in progress
    pub fn tick(&mut self, input: &TickInput, delta: f32, time: f32) -> Result<Vec<GameEvent>> {
        let mut events = Vec::new();
        if self.run.phase != GamePhase::Running {
            return Ok(events);
        }

        let step = kinematics::integrate(
            &mut self.player,
            input,
            &self.settings.player,
            self.settings.world.lateral_limit,
            self.settings.perks.slow_time_multiplier,
            delta,
            time,
        );
        if step.slow_time_ended {
            events.push(GameEvent::SlowTimeEnded);
        }

        self.world.reconcile(
            self.player.position,
            Streaming {
                generator: &mut self.generator,
                params: DifficultyCurve::params(&self.run),
                props: self.props.as_mut(),
                rng: self.rng.as_mut(),
                surface: self.surface.as_mut(),
            },
        )?;
        self.world.animate(delta, time, self.surface.as_mut());

        let report = collision::check(
            &mut self.player,
            &mut self.world,
            &self.settings.perks,
            time,
            self.surface.as_mut(),
        );
        events.extend(report.perks_collected.iter().map(|k| GameEvent::PerkCollected(*k)));

        self.curve.observe(&mut self.run, self.player.position.z);
        if self.high.observe(self.run.score) {
            self.run.high_score = self.high.best();
            events.push(GameEvent::NewHighScore(self.run.high_score));
        }

        match report.resolution {
            Resolution::Clear => {}
            Resolution::Absorbed { charges_left } => {
                log::debug!("Collision absorbed, {} charges left", charges_left);
                events.push(GameEvent::CollisionAbsorbed { charges_left });
            }
            Resolution::RunOver => {
                self.end_run();
                events.push(GameEvent::RunOver {
                    score: self.run.score,
                });
            }
        }

        self.hud.update(&HudSnapshot::capture(&self.player, &self.run, time));
        Ok(events)
    }

    fn end_run(&mut self) {
        self.run.phase = GamePhase::Over;
        self.hud.run_over(self.run.score, self.run.high_score);
        self.audio.run_stopped();
        log::info!(
            "Run over: {} (high score {})",
            self.run.score,
            self.run.high_score
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::renderer::InstanceBuffer;
    use crate::sim::aabb::Aabb;
    use crate::sim::scene::{ObjectId, Prop, PropKind, SceneObject, StaticProp};
    use crate::sim::state::PerkKind;
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    /// Volume far above the runner's reach
    const OUT_OF_REACH: Aabb = Aabb {
        min: Vec3::new(-0.5, 100.0, -0.5),
        max: Vec3::new(0.5, 101.0, 0.5),
    };

    /// Props whose obstacle volumes are one fixed box; perks are never reachable
    struct BoxProps {
        obstacle: Aabb,
    }

    impl BoxProps {
        /// Nothing ever blocks
        fn open() -> Self {
            Self {
                obstacle: OUT_OF_REACH,
            }
        }

        /// Every obstacle covers its whole chunk
        fn wall() -> Self {
            Self {
                obstacle: Aabb::new(Vec3::new(-100.0, 0.0, -100.0), Vec3::new(100.0, 20.0, 100.0)),
            }
        }

        fn prop(id: ObjectId, kind: PropKind, at: Vec3, collider: Option<Aabb>) -> Prop {
            let object = SceneObject {
                id,
                kind,
                position: at,
                meshes: Vec::new(),
            };
            Prop::new(object, Box::new(StaticProp)).with_colliders(collider.into_iter().collect())
        }
    }

    impl PropFactory for BoxProps {
        fn ground(&mut self, id: ObjectId, _size: f32) -> Prop {
            Self::prop(id, PropKind::Ground, Vec3::ZERO, None)
        }
        fn tree(&mut self, id: ObjectId, at: Vec3, _complex: bool, _rng: &mut dyn RandomSource) -> Prop {
            Self::prop(id, PropKind::Tree, at, Some(self.obstacle))
        }
        fn log(&mut self, id: ObjectId, at: Vec3) -> Prop {
            Self::prop(id, PropKind::Log, at, Some(self.obstacle))
        }
        fn perk(&mut self, id: ObjectId, at: Vec3, kind: PerkKind) -> Prop {
            Self::prop(id, PropKind::Perk(kind), at, Some(OUT_OF_REACH))
        }
        fn bush(&mut self, id: ObjectId, at: Vec3, _rng: &mut dyn RandomSource) -> Prop {
            Self::prop(id, PropKind::Bush, at, None)
        }
        fn rock(&mut self, id: ObjectId, at: Vec3, _rng: &mut dyn RandomSource) -> Prop {
            Self::prop(id, PropKind::Rock, at, None)
        }
        fn grass(&mut self, id: ObjectId, _blades: u32, _radius: f32, _rng: &mut dyn RandomSource) -> Prop {
            Self::prop(id, PropKind::Grass, Vec3::ZERO, None)
        }
    }

    #[derive(Default)]
    struct Entries(Vec<String>);

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Entries>>);

    impl Recorder {
        fn entries(&self) -> Vec<String> {
            self.0.borrow().0.clone()
        }

        fn push(&self, entry: String) {
            self.0.borrow_mut().0.push(entry);
        }
    }

    impl HudSink for Recorder {
        fn update(&mut self, _hud: &HudSnapshot) {}

        fn run_over(&mut self, score: u64, high_score: u64) {
            self.push(format!("over {} {}", score, high_score));
        }
    }

    impl AudioSink for Recorder {
        fn run_started(&mut self) {
            self.push("music on".into());
        }

        fn run_stopped(&mut self) {
            self.push("music off".into());
        }
    }

    struct Rig {
        runner: Runner,
        store: MemoryStore,
        surface: Rc<RefCell<InstanceBuffer>>,
        recorder: Recorder,
    }

    fn rig(props: BoxProps, high: u64) -> Rig {
        let store = MemoryStore::with_value(high);
        let surface = Rc::new(RefCell::new(InstanceBuffer::new()));
        let recorder = Recorder::default();
        let runner = Runner::builder(Settings::default())
            .seed(7)
            .surface(surface.clone())
            .store(store.clone())
            .props(props)
            .hud(recorder.clone())
            .audio(recorder.clone())
            .build()
            .unwrap();
        Rig {
            runner,
            store,
            surface,
            recorder,
        }
    }

    fn run_for(runner: &mut Runner, ticks: u32, start: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for i in 0..ticks {
            let time = start + i as f32 * DT;
            events.extend(runner.tick(&TickInput::default(), DT, time).unwrap());
        }
        events
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let missing_surface = Runner::builder(Settings::default())
            .store(MemoryStore::new())
            .build();
        assert_eq!(
            missing_surface.err(),
            Some(GameError::MissingCollaborator("render surface"))
        );

        let missing_store = Runner::builder(Settings::default())
            .surface(InstanceBuffer::new())
            .build();
        assert_eq!(
            missing_store.err(),
            Some(GameError::MissingCollaborator("high score store"))
        );

        let mut settings = Settings::default();
        settings.world.chunk_size = 0.0;
        let invalid = Runner::builder(settings)
            .surface(InstanceBuffer::new())
            .store(MemoryStore::new())
            .build();
        assert!(matches!(invalid.err(), Some(GameError::InvalidSettings(_))));
    }

    #[test]
    fn test_tick_before_start_is_noop() {
        let mut rig = rig(BoxProps::open(), 0);
        assert_eq!(rig.runner.phase(), GamePhase::Ready);
        let events = rig.runner.tick(&TickInput::default(), DT, 0.0).unwrap();
        assert!(events.is_empty());
        assert!(rig.runner.world().is_empty());
    }

    #[test]
    fn test_run_streams_world_and_scores() {
        let mut rig = rig(BoxProps::open(), 0);
        assert_eq!(rig.runner.start_run(), GameEvent::RunStarted);
        assert_eq!(rig.runner.phase(), GamePhase::Running);

        run_for(&mut rig.runner, 1, 0.0);
        assert_eq!(rig.runner.world().len(), 49);
        assert!(rig.surface.borrow().object_count() > 0);

        // ~10 s at 28 u/s from z = -10
        let events = run_for(&mut rig.runner, 600, DT);
        assert_eq!(rig.runner.phase(), GamePhase::Running);
        let score = rig.runner.run().score;
        assert!(score > 250 && score < 300, "score {}", score);
        assert!(events.contains(&GameEvent::NewHighScore(score)));
        assert_eq!(rig.store.value(), score);
        assert_eq!(rig.runner.high_score(), score);

        // Registry only holds the render square plus the hysteresis band
        assert!(rig.runner.world().len() <= 81);
        assert_eq!(rig.recorder.entries(), vec!["music on".to_string()]);
    }

    #[test]
    fn test_still_scene_skips_uploads() {
        let mut rig = rig(BoxProps::open(), 0);
        rig.runner.start_run();
        run_for(&mut rig.runner, 1, 0.0);
        assert!(rig.surface.borrow_mut().take_upload().is_some());

        // Still inside chunk (0, 0): nothing materializes, evicts or sways
        for i in 1..=10 {
            rig.runner.tick(&TickInput::default(), DT, i as f32 * DT).unwrap();
            assert!(rig.surface.borrow_mut().take_upload().is_none(), "tick {}", i);
        }
    }

    #[test]
    fn test_swaying_trees_refresh_each_tick() {
        let surface = Rc::new(RefCell::new(InstanceBuffer::new()));
        let mut runner = Runner::builder(Settings::default())
            .seed(7)
            .surface(surface.clone())
            .store(MemoryStore::new())
            .build()
            .unwrap();
        runner.start_run();
        run_for(&mut runner, 1, 0.0);
        assert!(surface.borrow_mut().take_upload().is_some());

        runner.tick(&TickInput::default(), DT, DT).unwrap();
        assert!(surface.borrow_mut().take_upload().is_some());
    }

    #[test]
    fn test_blocking_hit_ends_run() {
        let mut rig = rig(BoxProps::wall(), 500);
        rig.runner.start_run();
        let events = rig.runner.tick(&TickInput::default(), DT, 0.0).unwrap();
        assert!(matches!(events.last(), Some(GameEvent::RunOver { score: 0 })));
        assert_eq!(rig.runner.phase(), GamePhase::Over);
        assert_eq!(
            rig.recorder.entries(),
            vec!["music on".to_string(), "over 0 500".into(), "music off".into()]
        );

        // Terminal for this run
        let z = rig.runner.player().position.z;
        assert!(rig.runner.tick(&TickInput::default(), DT, DT).unwrap().is_empty());
        assert_eq!(rig.runner.player().position.z, z);
        assert_eq!(rig.store.value(), 500);
    }

    #[test]
    fn test_skip_charges_absorb_hits() {
        let mut rig = rig(BoxProps::wall(), 0);
        rig.runner.start_run();
        rig.runner.player.skip_charges = 3;

        let events = rig.runner.tick(&TickInput::default(), DT, 0.0).unwrap();
        assert!(events.contains(&GameEvent::CollisionAbsorbed { charges_left: 2 }));
        // Inside the grace window nothing more is spent
        run_for(&mut rig.runner, 10, DT);
        assert_eq!(rig.runner.player().skip_charges, 2);
        assert_eq!(rig.runner.phase(), GamePhase::Running);

        // Past the window each hit costs a charge until the run ends
        let events = run_for(&mut rig.runner, 120, 0.6);
        assert!(events.iter().any(|e| matches!(e, GameEvent::RunOver { .. })));
        assert_eq!(rig.runner.player().skip_charges, 0);
    }

    #[test]
    fn test_restart_resets_run_and_keeps_high_score() {
        let mut rig = rig(BoxProps::open(), 0);
        rig.runner.start_run();
        run_for(&mut rig.runner, 300, 0.0);
        let first = rig.runner.run().score;
        assert!(first > 0);

        rig.runner.start_run();
        assert_eq!(rig.runner.run().score, 0);
        assert_eq!(rig.runner.run().high_score, first);
        assert_eq!(rig.runner.player().position, Vec3::new(0.0, 5.0, -10.0));
        assert!(rig.runner.world().is_empty());
        assert_eq!(rig.surface.borrow().object_count(), 0);

        // A shorter second run leaves the persisted best alone
        run_for(&mut rig.runner, 60, 0.0);
        assert_eq!(rig.store.value(), first);
        assert_eq!(rig.runner.high_score(), first);
    }

    #[test]
    fn test_bad_generation_is_fatal() {
        let mut rig = rig(BoxProps::open(), 0);
        rig.runner.start_run();
        rig.runner.run.obstacle_density = f32::NAN;
        let err = rig.runner.tick(&TickInput::default(), DT, 0.0);
        assert!(matches!(err, Err(GameError::InvalidGeneration(_))));
    }
}
