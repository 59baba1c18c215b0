use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::capture::domain::frame_encoder::FrameEncoder;
use crate::capture::domain::frame_source::FrameSource;
use crate::capture::domain::landmark_source::LandmarkSource;
use crate::capture::domain::roi_selector::select_region;
use crate::render::domain::drawing_surface::DrawingSurface;
use crate::render::domain::label_table::LabelTable;
use crate::render::domain::scene::{build_scene, SceneInput};
use crate::render::domain::viewport::{Fit, Viewport};
use crate::shared::frame::Frame;
use crate::shared::landmarks::LandmarkSet;
use crate::shared::settings::{ResolvedSettings, StreamProfile};
use crate::stream::domain::stream_client::StreamClient;
use crate::tracking::domain::presence_debouncer::PresenceDebouncer;
use crate::tracking::domain::track::Track;
use crate::tracking::domain::track_smoother::DisplaySmoother;
use crate::tracking::domain::track_store::TrackStore;

use super::pipeline_logger::PipelineLogger;
use super::send_gate::{GateDecision, GateInput, SendGate};

/// How tracks are placed on the drawing surface.
#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    /// Viewport size in display pixels. `None` draws in source pixels.
    pub viewport_size: Option<(f64, f64)>,
    pub fit: Fit,
    pub mirrored: bool,
    pub labels: LabelTable,
}

impl RenderOptions {
    pub(crate) fn viewport_for(&self, frame: &Frame) -> Viewport {
        match self.viewport_size {
            Some((width, height)) => Viewport::new(width, height, self.fit, self.mirrored),
            None => Viewport::native(frame.width(), frame.height(), self.mirrored),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    SourceExhausted,
}

/// Cooperative, tick-driven session: one frame, one gate decision and one
/// render per tick.
///
/// Per tick: read a frame and its landmarks, drain detector replies into
/// the track store, decide whether to send (or connect), then prune, smooth
/// and draw. Detector replies arrive on their own schedule; only the render
/// cadence is fixed.
pub struct DriveLoop {
    frames: Box<dyn FrameSource>,
    landmarks: Box<dyn LandmarkSource>,
    encoder: Box<dyn FrameEncoder>,
    client: StreamClient,
    smoother: Box<dyn DisplaySmoother>,
    surface: Box<dyn DrawingSurface>,
    logger: Box<dyn PipelineLogger>,
    store: TrackStore,
    gate: SendGate,
    debouncer: PresenceDebouncer,
    profile: StreamProfile,
    tick_interval: Duration,
    render: RenderOptions,
    active: bool,
    last_tick: Option<Instant>,
}

impl DriveLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        frames: Box<dyn FrameSource>,
        landmarks: Box<dyn LandmarkSource>,
        encoder: Box<dyn FrameEncoder>,
        client: StreamClient,
        smoother: Box<dyn DisplaySmoother>,
        surface: Box<dyn DrawingSurface>,
        logger: Box<dyn PipelineLogger>,
        settings: &ResolvedSettings,
        render: RenderOptions,
    ) -> Self {
        Self {
            frames,
            landmarks,
            encoder,
            client,
            smoother,
            surface,
            logger,
            store: TrackStore::new(settings.tracker),
            gate: SendGate::new(settings.profile.min_send_interval),
            debouncer: PresenceDebouncer::new(settings.debounce),
            profile: settings.profile,
            tick_interval: settings.tick_interval,
            render,
            active: false,
            last_tick: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn tracks(&self) -> &[Track] {
        self.store.tracks()
    }

    pub fn stream(&self) -> &StreamClient {
        &self.client
    }

    /// Starts a fresh session. The connection itself opens lazily on the
    /// first send attempt.
    pub fn activate(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        self.last_tick = None;
        self.logger.info("Session started");
    }

    /// Ends the session: closes the connection without reporting it as a
    /// failure and forgets tracks, counters and pending requests.
    pub fn deactivate(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.client.stop();
        self.store.clear();
        self.gate.reset();
        self.debouncer.reset();
        self.last_tick = None;
        self.logger.info("Session stopped");
        self.surface.clear()
    }

    pub fn tick(&mut self, now: Instant) -> Result<TickOutcome, Box<dyn std::error::Error>> {
        if !self.active {
            return Ok(TickOutcome::Continue);
        }
        let started = Instant::now();

        let Some(frame) = self.frames.next_frame()? else {
            return Ok(TickOutcome::SourceExhausted);
        };
        let signal = self.landmarks.detect(&frame);
        let presence = self.debouncer.update(signal.presence);

        let poll = self.client.poll(now);
        for batch in &poll.batches {
            self.store.ingest(batch, now);
        }
        if let Some(message) = poll.failure {
            self.surface.connection_failed(&message)?;
        }

        let decision = self.gate.evaluate(&GateInput {
            active: self.active,
            presence,
            awaiting_reply: self.client.is_awaiting_reply(),
            connected: self.client.is_open(),
            now,
        });
        match decision {
            GateDecision::Send => self.send_frame(&frame, &signal.sets, now),
            GateDecision::Connect => {
                self.client.ensure_connected();
                if let Some(message) = self.client.take_failure() {
                    self.surface.connection_failed(&message)?;
                }
            }
            refused => log::trace!("Frame {} not sent: {refused:?}", frame.index()),
        }

        self.store.prune_expired(now);
        let dt = self
            .last_tick
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_tick = Some(now);
        self.smoother.advance(self.store.tracks_mut(), dt);

        let viewport = self.render.viewport_for(&frame);
        let scene = build_scene(
            &SceneInput {
                frame_index: frame.index(),
                frame_width: frame.width(),
                frame_height: frame.height(),
                tracks: self.store.tracks(),
                hands: &signal.sets,
            },
            &viewport,
            &self.render.labels,
        );
        self.surface.draw(&scene)?;

        self.logger.metric("tracks", self.store.len() as f64);
        self.logger
            .metric("replies_per_sec", f64::from(self.client.replies_per_second()));
        self.logger
            .timing("tick", started.elapsed().as_secs_f64() * 1000.0);
        self.logger.tick(frame.index());
        Ok(TickOutcome::Continue)
    }

    fn send_frame(
        &mut self,
        frame: &Frame,
        sets: &[LandmarkSet],
        now: Instant,
    ) {
        let region = select_region(frame.width(), frame.height(), sets);
        let started = Instant::now();
        let encoded = match self.encoder.encode(frame, &region, self.profile.target_width) {
            Ok(encoded) => encoded,
            Err(e) => {
                log::warn!("Skipping frame {}: {e}", frame.index());
                return;
            }
        };
        self.logger
            .timing("encode", started.elapsed().as_secs_f64() * 1000.0);
        if self.client.send(&encoded) {
            self.gate.record_send(now);
        }
    }

    /// Runs a session at a fixed tick cadence until the frame source is
    /// exhausted or `cancelled` is set. The session is always torn down.
    pub fn run(&mut self, cancelled: Arc<AtomicBool>) -> Result<(), Box<dyn std::error::Error>> {
        self.activate();
        let result = loop {
            if cancelled.load(Ordering::Relaxed) {
                log::info!("Session cancelled");
                break Ok(());
            }
            let tick_start = Instant::now();
            match self.tick(tick_start) {
                Ok(TickOutcome::Continue) => {}
                Ok(TickOutcome::SourceExhausted) => {
                    log::info!("Frame source exhausted");
                    break Ok(());
                }
                Err(e) => break Err(e),
            }
            if let Some(rest) = self.tick_interval.checked_sub(tick_start.elapsed()) {
                std::thread::sleep(rest);
            }
        };

        let teardown = self.deactivate();
        self.logger.summary();
        result.and(teardown)
    }
}
