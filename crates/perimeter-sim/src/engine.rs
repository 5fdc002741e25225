//! Simulation engine: the single owner of all perimeter state.
//!
//! `SimulationEngine` owns the hecs ECS world, validates and applies operator
//! commands, runs all systems, and produces `RenderSnapshot`s. Completely
//! headless (no I/O), enabling deterministic testing.

use std::collections::VecDeque;

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use perimeter_core::commands::OperatorCommand;
use perimeter_core::components::*;
use perimeter_core::constants::DISPLAY_GRID_PRECISION;
use perimeter_core::enums::{NoticeLevel, SimPhase, Zone};
use perimeter_core::error::CommandError;
use perimeter_core::events::{AlertRecord, Notice, SimEvent};
use perimeter_core::persistence::{MissionRecord, PersistRequest};
use perimeter_core::state::RenderSnapshot;
use perimeter_core::types::{normalize_heading, GeoPoint, GridLine, SimTime, Viewport};

use perimeter_geo::{grid_reference_or_unknown, layout_grid};

use crate::scenario::ScenarioConfig;
use crate::systems;
use crate::systems::detection::{AlertLog, DetectionEngine};
use crate::systems::intruders::IntruderMotion;
use crate::systems::navigation::NavigationController;
use crate::systems::scan_schedule::ScanSchedule;
use crate::systems::snapshot::SnapshotInputs;
use crate::validation;
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
    pub scenario: ScenarioConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
            scenario: ScenarioConfig::default(),
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    phase: SimPhase,
    time_scale: f64,
    rng: ChaCha8Rng,
    command_queue: VecDeque<OperatorCommand>,

    navigation: NavigationController,
    motion: IntruderMotion,
    detection: DetectionEngine,
    schedule: ScanSchedule,

    viewport: Viewport,
    grid: Vec<GridLine>,
    last_clicked: Option<GeoPoint>,

    events: Vec<SimEvent>,
    notices: Vec<Notice>,
    outbox: Vec<PersistRequest>,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config. The scenario
    /// is expected to have passed `ScenarioConfig::validate`.
    pub fn new(config: SimConfig) -> Self {
        let scenario = config.scenario;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut world = World::new();
        world_setup::setup_world(&mut world, &mut rng, &scenario);

        let viewport = scenario.initial_viewport();
        Self {
            world,
            time: SimTime::default(),
            phase: SimPhase::default(),
            time_scale: config.time_scale,
            rng,
            command_queue: VecDeque::new(),
            navigation: NavigationController::default(),
            motion: IntruderMotion::new(
                scenario.intruder_max_radius_m,
                scenario.intruder_max_step_m,
                scenario.intruder_move_interval_ms,
            ),
            detection: DetectionEngine::default(),
            schedule: ScanSchedule::new(scenario.scan_mode, scenario.scan_interval_ms, 0.0),
            grid: layout_grid(&viewport),
            viewport,
            last_clicked: None,
            events: Vec::new(),
            notices: Vec::new(),
            outbox: Vec::new(),
        }
    }

    /// Apply the stored mission state read at startup. Nothing changes if
    /// any field is invalid.
    pub fn hydrate(&mut self, record: &MissionRecord) -> Result<(), CommandError> {
        validation::check_point(record.position)?;
        validation::check_positive("altitude", record.altitude)?;
        validation::check_finite("heading", record.heading)?;
        validation::check_positive("asset radius", record.detection_radius)?;

        self.navigation.clear();
        for (_entity, (_own, pos, kin, zone)) in self
            .world
            .query_mut::<(&OwnAsset, &mut GeoPoint, &mut Kinematics, &mut DetectionZone)>()
        {
            *pos = GeoPoint::new(record.position.lat, record.position.lon);
            kin.altitude_m = record.altitude;
            kin.heading_deg = normalize_heading(record.heading);
            zone.radius_m = record.detection_radius;
        }
        self.detection.restore_alerts(record.alerts.clone());
        tracing::debug!(alerts = record.alerts.len(), "hydrated from mission store");
        Ok(())
    }

    /// Queue a command for processing at the next tick boundary. It is
    /// validated then; a rejection shows up as an event and a notice.
    pub fn queue_command(&mut self, command: OperatorCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = OperatorCommand>) {
        self.command_queue.extend(commands);
    }

    /// Validate a command now and queue it if accepted.
    pub fn submit(&mut self, command: OperatorCommand) -> Result<(), CommandError> {
        match validation::validate_command(command) {
            Ok(command) => {
                self.command_queue.push_back(command);
                Ok(())
            }
            Err(err) => {
                self.reject(&err);
                Err(err)
            }
        }
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> RenderSnapshot {
        self.process_commands();

        if self.phase == SimPhase::Running {
            self.run_systems();
            self.time.advance();
        }

        systems::snapshot::build_snapshot(
            &self.world,
            SnapshotInputs {
                time: &self.time,
                phase: self.phase,
                navigation: &self.navigation,
                detection: &self.detection,
                schedule: &self.schedule,
                grid: &self.grid,
                last_clicked: self.last_clicked,
                events: std::mem::take(&mut self.events),
                notices: std::mem::take(&mut self.notices),
            },
        )
    }

    /// Take the persistence writes queued since the last call.
    pub fn drain_persistence(&mut self) -> Vec<PersistRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Get the current simulation phase.
    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get the current time scale.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn scan_schedule(&self) -> &ScanSchedule {
        &self.schedule
    }

    pub fn alert_log(&self) -> &AlertLog {
        self.detection.alert_log()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn grid(&self) -> &[GridLine] {
        &self.grid
    }

    pub fn asset_position(&self) -> GeoPoint {
        self.world
            .query::<(&OwnAsset, &GeoPoint)>()
            .iter()
            .next()
            .map(|(_, (_, pos))| *pos)
            .unwrap_or_default()
    }

    pub fn base_position(&self) -> GeoPoint {
        self.world
            .query::<(&Base, &GeoPoint)>()
            .iter()
            .next()
            .map(|(_, (_, pos))| *pos)
            .unwrap_or_default()
    }

    /// Teleport an intruder and clear its reading (for tests).
    #[cfg(test)]
    pub fn place_intruder(&mut self, id: &str, position: GeoPoint) {
        for (_entity, (intruder, pos, detection)) in self
            .world
            .query_mut::<(&Intruder, &mut GeoPoint, &mut DetectionState)>()
        {
            if intruder.id == id {
                *pos = position;
                detection.reading = None;
            }
        }
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            match validation::validate_command(command) {
                Ok(command) => self.handle_command(command),
                Err(err) => self.reject(&err),
            }
        }
    }

    fn reject(&mut self, err: &CommandError) {
        tracing::warn!(%err, "command rejected");
        self.events.push(SimEvent::CommandRejected {
            reason: err.to_string(),
        });
        self.notify(NoticeLevel::Warning, err.to_string());
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
            tick: self.time.tick,
        });
    }

    /// Handle a single validated command.
    fn handle_command(&mut self, command: OperatorCommand) {
        let now_ms = self.time.now_ms();
        match command {
            OperatorCommand::SetTarget { target } => {
                let destination = match validation::resolve_target(&target) {
                    Ok(point) => point,
                    Err(err) => return self.reject(&err),
                };
                self.navigation
                    .start(&mut self.world, destination, now_ms, &mut self.events);
                self.outbox.push(PersistRequest::Target(destination));
            }
            OperatorCommand::StopTransit => {
                if !self.navigation.stop(&self.world, &mut self.events) {
                    self.notify(NoticeLevel::Info, "The asset is not in transit");
                }
            }
            OperatorCommand::SetAltitude { meters } => {
                for (_entity, (_own, kin)) in
                    self.world.query_mut::<(&OwnAsset, &mut Kinematics)>()
                {
                    kin.altitude_m = meters;
                }
            }
            OperatorCommand::SetHeading { degrees } => {
                for (_entity, (_own, kin)) in
                    self.world.query_mut::<(&OwnAsset, &mut Kinematics)>()
                {
                    kin.heading_deg = normalize_heading(degrees);
                }
            }
            OperatorCommand::SetSpeed { kmh } => {
                // An active transit keeps the duration it was accepted with.
                for (_entity, (_own, kin)) in
                    self.world.query_mut::<(&OwnAsset, &mut Kinematics)>()
                {
                    kin.speed_kmh = kmh;
                }
            }
            OperatorCommand::SetAssetRadius { meters } => self.set_zone_radius(Zone::Asset, meters),
            OperatorCommand::SetBaseRadius { meters } => self.set_zone_radius(Zone::Base, meters),
            OperatorCommand::MoveBase { position } => {
                for (_entity, (_base, pos)) in self.world.query_mut::<(&Base, &mut GeoPoint)>() {
                    *pos = position;
                }
                // Distances to the old site are stale.
                for (_entity, detection) in self.world.query_mut::<&mut DetectionState>() {
                    detection.reading = None;
                }
                let grid = grid_reference_or_unknown(position, DISPLAY_GRID_PRECISION);
                self.notify(NoticeLevel::Info, format!("Base moved to {grid}"));
            }
            OperatorCommand::ScanNow => self.run_scan(now_ms),
            OperatorCommand::RaiseAlert => {
                self.run_scan(now_ms);
                match self.detection.raise_asset_alert(&self.world, now_ms) {
                    Some(record) => self.publish_alert(record),
                    None => self.notify(
                        NoticeLevel::Warning,
                        "No intruders inside the asset detection radius",
                    ),
                }
            }
            OperatorCommand::SetScanMode { mode } => {
                self.schedule.set_mode(mode, now_ms);
                self.events.push(SimEvent::ScanModeChanged {
                    mode,
                    interval_ms: self.schedule.interval_ms(),
                });
            }
            OperatorCommand::SetScanInterval { interval_ms } => {
                self.schedule.set_interval(interval_ms, now_ms);
                self.events.push(SimEvent::ScanModeChanged {
                    mode: self.schedule.mode(),
                    interval_ms,
                });
            }
            OperatorCommand::ViewportChanged { viewport } => {
                self.viewport = viewport;
                self.grid = layout_grid(&viewport);
            }
            OperatorCommand::MapClicked { point } => {
                self.last_clicked = Some(point);
            }
            OperatorCommand::Pause => {
                if self.phase == SimPhase::Running {
                    self.phase = SimPhase::Paused;
                }
            }
            OperatorCommand::Resume => {
                if self.phase == SimPhase::Paused {
                    self.phase = SimPhase::Running;
                }
            }
        }
    }

    fn set_zone_radius(&mut self, which: Zone, radius_m: f64) {
        for (_entity, zone) in self.world.query_mut::<&mut DetectionZone>() {
            if zone.zone == which {
                zone.radius_m = radius_m;
            }
        }
    }

    /// One detection pass, publishing any base breach.
    fn run_scan(&mut self, now_ms: f64) {
        let outcome = self.detection.scan(&mut self.world, now_ms);
        self.events.push(SimEvent::ScanCompleted {
            inside_asset: outcome.inside_asset,
            inside_base: outcome.inside_base,
        });
        if let Some(record) = outcome.base_alert {
            self.events.push(SimEvent::BaseBreach {
                intruder_ids: record.intruders.iter().map(|s| s.id.clone()).collect(),
            });
            self.publish_alert(record);
        }
    }

    fn publish_alert(&mut self, record: AlertRecord) {
        self.events.push(SimEvent::AlertRaised {
            zone: record.zone,
            intruder_count: record.intruders.len() as u32,
        });
        self.outbox.push(PersistRequest::Alert(record));
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let now_ms = self.time.now_ms();
        // 1. Asset transit
        systems::navigation::run(&mut self.world, &mut self.navigation, now_ms, &mut self.events);
        // 2. Intruder random walk
        let base = self.base_position();
        systems::intruders::run(&mut self.world, &mut self.rng, &mut self.motion, base, now_ms);
        // 3. Periodic scan
        if self.schedule.poll(now_ms) {
            self.run_scan(now_ms);
        }
    }
}
