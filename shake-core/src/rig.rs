//! The simulation loop.
//!
//! [`ShakeRig`] owns an engine, a clock, and the recording setup, and
//! drives the fixed-step loop: record every tracked stream at the current
//! time, advance the clock, stop once the clock has passed the configured
//! stop time, otherwise step the engine. Because the sample is taken
//! before the clock advances, a run with `stop_time = 3` and
//! `timestep = 1` records samples at t = 0, 1, 2 and 3, and the engine
//! never steps past the stop time.

use crate::engine::DynamicsEngine;
use crate::recorder::DataRecorder;
use crate::sampler::{relative_frame, Sample, SampleKind};
use nalgebra::Vector3;
use shake_types::{BodyId, Excitation, Result, RigConfig};
use tracing::{error, info, warn};

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Ticks keep advancing time.
    Running,
    /// The stop time has been passed; output is not yet flushed.
    Stopping,
    /// The run is over and all output is flushed.
    Stopped,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReport {
    /// Number of samples recorded per stream.
    pub samples: usize,
    /// Time of the last recorded sample, in seconds.
    pub final_time: f64,
}

#[derive(Debug)]
struct ExcitationTrace {
    stream: String,
    excitation: Excitation,
}

#[derive(Debug)]
struct TrackedPair {
    stream: String,
    reference: BodyId,
    body: BodyId,
    offset: Vector3<f64>,
    kind: SampleKind,
}

/// The excitation rig: an engine plus the loop that drives and records it.
#[derive(Debug)]
pub struct ShakeRig<E: DynamicsEngine> {
    engine: E,
    config: RigConfig,
    clock: f64,
    state: RunState,
    samples: usize,
    last_sample_time: f64,
    recorder: Option<DataRecorder>,
    traces: Vec<ExcitationTrace>,
    tracked: Vec<TrackedPair>,
}

impl<E: DynamicsEngine> ShakeRig<E> {
    /// Create a rig around an already-configured engine.
    ///
    /// # Errors
    ///
    /// Returns [`shake_types::RigError::InvalidConfig`] if the configuration is
    /// invalid.
    pub fn new(engine: E, config: RigConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine,
            config,
            clock: 0.0,
            state: RunState::Running,
            samples: 0,
            last_sample_time: 0.0,
            recorder: None,
            traces: Vec::new(),
            tracked: Vec::new(),
        })
    }

    /// Attach a recorder; tracked streams will be written through it.
    #[must_use]
    pub fn with_recorder(mut self, recorder: DataRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Record an excitation's value over time under `stream`.
    pub fn trace_excitation(&mut self, stream: impl Into<String>, excitation: Excitation) {
        self.traces.push(ExcitationTrace {
            stream: stream.into(),
            excitation,
        });
    }

    /// Track the offset of a point on `body` relative to `reference`.
    ///
    /// `offset` is expressed in `body`'s local frame; pass zeros to track
    /// the body origin. The stream records `x y z`.
    pub fn track_offset(
        &mut self,
        stream: impl Into<String>,
        reference: BodyId,
        body: BodyId,
        offset: Vector3<f64>,
    ) {
        self.tracked.push(TrackedPair {
            stream: stream.into(),
            reference,
            body,
            offset,
            kind: SampleKind::Offset,
        });
    }

    /// Track `body`'s rotation relative to `reference`: `axis_z angle`.
    pub fn track_rotation(&mut self, stream: impl Into<String>, reference: BodyId, body: BodyId) {
        self.tracked.push(TrackedPair {
            stream: stream.into(),
            reference,
            body,
            offset: Vector3::zeros(),
            kind: SampleKind::Rotation,
        });
    }

    /// Track `body`'s full relative pose: offset, axis and angle.
    pub fn track_pose(&mut self, stream: impl Into<String>, reference: BodyId, body: BodyId) {
        self.tracked.push(TrackedPair {
            stream: stream.into(),
            reference,
            body,
            offset: Vector3::zeros(),
            kind: SampleKind::Full,
        });
    }

    /// The loop state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The rig clock in seconds.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.clock
    }

    /// The engine, for queries between ticks.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Consume the rig and return the engine.
    #[must_use]
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Open one output stream per registered track and trace.
    ///
    /// Called by [`ShakeRig::run`]; call it yourself before driving the
    /// loop manually with [`ShakeRig::tick`].
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a stream file cannot be created.
    pub fn prepare(&mut self) -> Result<()> {
        let Some(recorder) = self.recorder.as_mut() else {
            return Ok(());
        };
        for trace in &self.traces {
            recorder.open_stream(&trace.stream)?;
        }
        for pair in &self.tracked {
            recorder.open_stream(&pair.stream)?;
        }
        Ok(())
    }

    fn record_samples(&mut self) -> Result<()> {
        let time = self.clock;
        if let Some(recorder) = self.recorder.as_mut() {
            for trace in &self.traces {
                recorder.append(&trace.stream, time, &[trace.excitation.value(time)])?;
            }
            for pair in &self.tracked {
                let reference = self.engine.get_pose(pair.reference)?;
                let body = self.engine.get_pose(pair.body)?.translated_local(&pair.offset);
                let frame = relative_frame(&reference, &body);
                let sample = Sample {
                    time,
                    values: frame.values(pair.kind),
                };
                recorder.append_sample(&pair.stream, &sample)?;
            }
        }
        self.samples += 1;
        self.last_sample_time = time;
        Ok(())
    }

    /// Run one cycle: record, advance the clock, check the stop
    /// condition, step the engine.
    ///
    /// The stop check happens before the step, so the last recorded
    /// sample is also the engine's last stepped state; the engine never
    /// runs past the stop time.
    ///
    /// Does nothing once the run has stopped.
    ///
    /// # Errors
    ///
    /// Propagates recording I/O errors and engine failures. After an
    /// engine failure the rig is stopped; already-recorded samples remain
    /// in the output streams once flushed.
    pub fn tick(&mut self) -> Result<RunState> {
        if self.state != RunState::Running {
            return Ok(self.state);
        }
        self.record_samples()?;
        self.clock += self.config.timestep;
        if self.clock > self.config.stop_time {
            self.state = RunState::Stopping;
            return Ok(self.state);
        }
        if let Err(err) = self.engine.step(self.config.timestep) {
            self.state = RunState::Stopping;
            return Err(err.into());
        }
        Ok(self.state)
    }

    /// Flush all output and mark the run stopped.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error from flushing.
    pub fn finish(&mut self) -> Result<()> {
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.flush_all()?;
        }
        self.state = RunState::Stopped;
        Ok(())
    }

    /// Run the loop from the current clock until past the stop time.
    ///
    /// # Errors
    ///
    /// On an engine failure the run aborts: recorded output is flushed,
    /// the rig is stopped, and the failure is returned. I/O errors abort
    /// the same way.
    pub fn run(&mut self) -> Result<RunReport> {
        self.prepare()?;
        info!(
            timestep = self.config.timestep,
            stop_time = self.config.stop_time,
            streams = self.traces.len() + self.tracked.len(),
            "starting run"
        );
        while self.state == RunState::Running {
            if let Err(err) = self.tick() {
                error!(time = self.clock, %err, "run aborted");
                // Keep the samples recorded so far; a flush failure must
                // not mask the abort cause.
                if let Err(flush_err) = self.finish() {
                    warn!(%flush_err, "failed to flush output after abort");
                }
                return Err(err);
            }
        }
        self.finish()?;
        info!(
            samples = self.samples,
            final_time = self.last_sample_time,
            "run complete"
        );
        Ok(RunReport {
            samples: self.samples,
            final_time: self.last_sample_time,
        })
    }

    /// The recorder, if one is attached.
    #[must_use]
    pub fn recorder(&self) -> Option<&DataRecorder> {
        self.recorder.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::kinematic::KinematicEngine;
    use approx::assert_relative_eq;

    fn bare_rig(timestep: f64, stop_time: f64) -> ShakeRig<KinematicEngine> {
        let config = RigConfig::new()
            .with_timestep(timestep)
            .with_stop_time(stop_time);
        ShakeRig::new(KinematicEngine::new(), config).unwrap()
    }

    #[test]
    fn sample_count_includes_both_endpoints() {
        let mut rig = bare_rig(1.0, 3.0);
        let report = rig.run().unwrap();
        assert_eq!(report.samples, 4);
        assert_relative_eq!(report.final_time, 3.0);
    }

    #[test]
    fn engine_never_steps_past_stop_time() {
        let mut rig = bare_rig(1.0, 3.0);
        let report = rig.run().unwrap();
        assert_relative_eq!(rig.engine().current_time(), report.final_time);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = RigConfig::new().with_timestep(-1.0);
        assert!(ShakeRig::new(KinematicEngine::new(), config).is_err());
    }

    #[test]
    fn tick_after_stop_is_a_no_op() {
        let mut rig = bare_rig(1.0, 1.0);
        rig.run().unwrap();
        let clock = rig.time();
        assert_eq!(rig.tick().unwrap(), RunState::Stopped);
        assert_relative_eq!(rig.time(), clock);
    }

    #[test]
    fn engine_failure_aborts_run() {
        let mut engine = KinematicEngine::new();
        engine.inject_divergence_after(0.5);
        let config = RigConfig::new().with_timestep(0.2).with_stop_time(3.0);
        let mut rig = ShakeRig::new(engine, config).unwrap();
        let err = rig.run().unwrap_err();
        assert!(matches!(
            err,
            shake_types::RigError::Engine(shake_types::EngineError::Diverged { .. })
        ));
        assert_eq!(rig.state(), RunState::Stopped);
    }
}
