//! Loop thread: runs the simulation engine at 30Hz and presents snapshots.
//!
//! The engine is moved into this thread and never shared. Commands arrive
//! via `mpsc` channel, persistence writes leave via another, and snapshots
//! go to the render sink and to shared state for polling.

use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use perimeter_core::constants::TICK_RATE;
use perimeter_core::persistence::PersistRequest;
use perimeter_core::state::RenderSnapshot;
use perimeter_sim::SimulationEngine;

use crate::render::RenderSink;
use crate::state::{AppState, LoopCommand};

/// Nominal duration of one tick at 1x speed.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

#[derive(Debug, Clone, Copy, Default)]
pub struct LoopOptions {
    /// Stop after this many loop iterations.
    pub max_ticks: Option<u64>,
    /// Skip pacing and tick as fast as possible.
    pub unpaced: bool,
}

/// Where the loop sends its output.
pub struct LoopOutputs {
    pub sink: Box<dyn RenderSink>,
    /// Absent when no mission store is configured.
    pub persistence: Option<mpsc::Sender<PersistRequest>>,
    pub latest_snapshot: Arc<Mutex<Option<RenderSnapshot>>>,
}

/// Spawns the loop in a new thread.
///
/// Returns the handles the input side uses, and the thread handle, which
/// yields the number of ticks run.
pub fn spawn_game_loop(
    engine: SimulationEngine,
    sink: Box<dyn RenderSink>,
    persistence: Option<mpsc::Sender<PersistRequest>>,
    options: LoopOptions,
) -> io::Result<(AppState, JoinHandle<u64>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<LoopCommand>();
    let latest_snapshot = Arc::new(Mutex::new(None));
    let outputs = LoopOutputs {
        sink,
        persistence,
        latest_snapshot: latest_snapshot.clone(),
    };

    let handle = std::thread::Builder::new()
        .name("perimeter-game-loop".into())
        .spawn(move || run_game_loop(engine, cmd_rx, outputs, options))?;

    Ok((
        AppState {
            command_tx: cmd_tx,
            latest_snapshot,
        },
        handle,
    ))
}

/// The loop. Runs until Shutdown, channel disconnect or the tick limit.
pub fn run_game_loop(
    mut engine: SimulationEngine,
    cmd_rx: mpsc::Receiver<LoopCommand>,
    mut outputs: LoopOutputs,
    options: LoopOptions,
) -> u64 {
    let mut next_tick_time = Instant::now();
    let mut ticks = 0u64;

    loop {
        if options.max_ticks.is_some_and(|max| ticks >= max) {
            return ticks;
        }

        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(LoopCommand::Operator(cmd)) => {
                    // Rejections are reported through the next snapshot.
                    let _ = engine.submit(cmd);
                }
                Ok(LoopCommand::Shutdown) => return ticks,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return ticks,
            }
        }

        // 2. Advance one tick (engine handles pause semantics internally)
        let snapshot = engine.tick();
        ticks += 1;

        // 3. Hand queued writes to the persistence thread
        for request in engine.drain_persistence() {
            if let Some(tx) = &outputs.persistence {
                if tx.send(request).is_err() {
                    tracing::debug!("persistence writer gone; dropping writes");
                    outputs.persistence = None;
                }
            }
        }

        // 4. Present, then store for synchronous polling
        if let Err(err) = outputs.sink.present(&snapshot) {
            tracing::warn!(%err, "render sink failed; stopping");
            return ticks;
        }
        if let Ok(mut lock) = outputs.latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        if options.unpaced {
            continue;
        }

        // 5. Sleep until next tick, adjusting for time_scale
        let time_scale = engine.time_scale();
        let effective_tick_duration = if time_scale > 0.001 {
            TICK_DURATION.div_f64(time_scale)
        } else {
            TICK_DURATION
        };

        next_tick_time += effective_tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > effective_tick_duration * 2 {
            // Too far behind; reset to avoid catch-up spiral
            next_tick_time = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perimeter_core::commands::{OperatorCommand, TargetInput};
    use perimeter_core::enums::SimPhase;
    use perimeter_core::events::SimEvent;
    use perimeter_sim::SimConfig;

    /// Sink that counts snapshots and collects their events.
    struct Recorder {
        seen: Arc<Mutex<Vec<SimEvent>>>,
    }

    impl RenderSink for Recorder {
        fn present(&mut self, snapshot: &RenderSnapshot) -> io::Result<()> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.extend(snapshot.events.iter().cloned());
            }
            Ok(())
        }
    }

    fn recording_outputs(
        persistence: Option<mpsc::Sender<PersistRequest>>,
    ) -> (LoopOutputs, Arc<Mutex<Vec<SimEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            LoopOutputs {
                sink: Box::new(Recorder { seen: seen.clone() }),
                persistence,
                latest_snapshot: Arc::new(Mutex::new(None)),
            },
            seen,
        )
    }

    fn unpaced(max_ticks: u64) -> LoopOptions {
        LoopOptions {
            max_ticks: Some(max_ticks),
            unpaced: true,
        }
    }

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<LoopCommand>();

        tx.send(LoopCommand::Operator(OperatorCommand::ScanNow))
            .unwrap();
        tx.send(LoopCommand::Operator(OperatorCommand::Pause))
            .unwrap();
        tx.send(LoopCommand::Shutdown).unwrap();

        let mut commands = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            commands.push(cmd);
        }

        assert_eq!(commands.len(), 3);
        assert!(matches!(
            commands[0],
            LoopCommand::Operator(OperatorCommand::ScanNow)
        ));
        assert!(matches!(
            commands[1],
            LoopCommand::Operator(OperatorCommand::Pause)
        ));
        assert!(matches!(commands[2], LoopCommand::Shutdown));
    }

    #[test]
    fn test_loop_stops_at_tick_limit() {
        let (_tx, rx) = mpsc::channel::<LoopCommand>();
        let (outputs, _) = recording_outputs(None);
        let latest = outputs.latest_snapshot.clone();
        let engine = SimulationEngine::new(SimConfig::default());

        let ticks = run_game_loop(engine, rx, outputs, unpaced(45));
        assert_eq!(ticks, 45);
        let snapshot = latest.lock().unwrap().clone().unwrap();
        assert_eq!(snapshot.time.tick, 45);
    }

    #[test]
    fn test_shutdown_stops_loop() {
        let (tx, rx) = mpsc::channel::<LoopCommand>();
        tx.send(LoopCommand::Shutdown).unwrap();
        let (outputs, _) = recording_outputs(None);
        let engine = SimulationEngine::new(SimConfig::default());
        assert_eq!(run_game_loop(engine, rx, outputs, unpaced(100)), 0);
    }

    #[test]
    fn test_pause_via_channel() {
        let (tx, rx) = mpsc::channel::<LoopCommand>();
        tx.send(LoopCommand::Operator(OperatorCommand::Pause))
            .unwrap();
        let (outputs, _) = recording_outputs(None);
        let latest = outputs.latest_snapshot.clone();
        let engine = SimulationEngine::new(SimConfig::default());

        run_game_loop(engine, rx, outputs, unpaced(10));
        let snapshot = latest.lock().unwrap().clone().unwrap();
        assert_eq!(snapshot.phase, SimPhase::Paused);
        assert_eq!(snapshot.time.tick, 0);
    }

    #[test]
    fn test_target_forwarded_to_persistence() {
        let (tx, rx) = mpsc::channel::<LoopCommand>();
        let (persist_tx, persist_rx) = mpsc::channel::<PersistRequest>();
        tx.send(LoopCommand::Operator(OperatorCommand::SetTarget {
            target: TargetInput::LatLon {
                lat: 14.21,
                lon: 101.22,
            },
        }))
        .unwrap();
        let (outputs, seen) = recording_outputs(Some(persist_tx));
        let engine = SimulationEngine::new(SimConfig::default());

        run_game_loop(engine, rx, outputs, unpaced(3));
        let requests: Vec<PersistRequest> = persist_rx.try_iter().collect();
        assert!(requests.iter().any(|r| matches!(
            r,
            PersistRequest::Target(p) if (p.lat - 14.21).abs() < 1e-12
        )));
        assert!(seen
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, SimEvent::TransitStarted { .. })));
    }

    #[test]
    fn test_rejected_command_reaches_sink() {
        let (tx, rx) = mpsc::channel::<LoopCommand>();
        tx.send(LoopCommand::Operator(OperatorCommand::SetSpeed { kmh: 0.0 }))
            .unwrap();
        let (outputs, seen) = recording_outputs(None);
        let engine = SimulationEngine::new(SimConfig::default());

        run_game_loop(engine, rx, outputs, unpaced(2));
        assert!(seen
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, SimEvent::CommandRejected { .. })));
    }

    #[test]
    fn test_spawned_loop_joins() {
        let engine = SimulationEngine::new(SimConfig::default());
        let (state, handle) = spawn_game_loop(
            engine,
            Box::new(crate::render::LogSink),
            None,
            unpaced(5),
        )
        .unwrap();
        assert_eq!(handle.join().unwrap(), 5);
        assert_eq!(state.snapshot().unwrap().time.tick, 5);
    }

    #[test]
    fn test_tick_duration_constant() {
        // 30Hz = 33.333ms per tick
        let expected_nanos = 1_000_000_000u64 / 30;
        assert_eq!(TICK_DURATION.as_nanos(), expected_nanos as u128);
    }
}
