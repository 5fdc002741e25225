//! Render adapters. They only read snapshots; nothing flows back into the
//! engine from here.

use std::io::{self, Write};

use perimeter_core::constants::TICK_RATE;
use perimeter_core::enums::NoticeLevel;
use perimeter_core::events::SimEvent;
use perimeter_core::state::RenderSnapshot;

/// Consumer of per-tick snapshots.
pub trait RenderSink: Send {
    fn present(&mut self, snapshot: &RenderSnapshot) -> io::Result<()>;
}

/// Writes events and notices to the tracing log, plus a status line once
/// per simulated second.
#[derive(Debug, Default)]
pub struct LogSink;

impl RenderSink for LogSink {
    fn present(&mut self, snapshot: &RenderSnapshot) -> io::Result<()> {
        let tick = snapshot.time.tick;
        for event in &snapshot.events {
            log_event(tick, event);
        }
        for notice in &snapshot.notices {
            match notice.level {
                NoticeLevel::Info => tracing::info!(tick, "{}", notice.message),
                NoticeLevel::Warning => tracing::warn!(tick, "{}", notice.message),
            }
        }

        if tick % u64::from(TICK_RATE) == 0 {
            let asset = &snapshot.asset;
            let breaches = snapshot.intruders.iter().filter(|i| i.breach).count();
            tracing::debug!(
                tick,
                grid = %asset.grid_reference,
                heading = %asset.heading_text,
                from_base_m = asset.distance_from_base_m.round(),
                navigation = ?asset.navigation,
                breaches,
                "status"
            );
        }
        Ok(())
    }
}

fn log_event(tick: u64, event: &SimEvent) {
    match event {
        SimEvent::BaseBreach { intruder_ids } => {
            tracing::info!(tick, intruders = ?intruder_ids, "base perimeter breached");
        }
        SimEvent::AlertRaised {
            zone,
            intruder_count,
        } => {
            tracing::info!(tick, %zone, intruder_count, "alert raised");
        }
        SimEvent::CommandRejected { reason } => {
            tracing::warn!(tick, %reason, "command rejected");
        }
        other => tracing::debug!(tick, event = ?other),
    }
}

/// Writes snapshots as JSON lines.
///
/// Every snapshot carrying events or notices is written; quiet ones only
/// every `stride` ticks.
pub struct JsonLinesSink<W: Write> {
    out: W,
    stride: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W, stride: u64) -> Self {
        Self {
            out,
            stride: stride.max(1),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> RenderSink for JsonLinesSink<W> {
    fn present(&mut self, snapshot: &RenderSnapshot) -> io::Result<()> {
        let eventful = !snapshot.events.is_empty() || !snapshot.notices.is_empty();
        if !eventful && snapshot.time.tick % self.stride != 0 {
            return Ok(());
        }
        serde_json::to_writer(&mut self.out, snapshot)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}
