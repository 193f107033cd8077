//! Shake-table runner.
//!
//! Builds the reference scene (a fixed floor, a driven table, a brick
//! standing on the table), drives the table along X with either a sine
//! wave or a recorded motion profile, and records the excitation, the
//! table's motion, and the brick's relative offset and tilt as text
//! streams plus a gnuplot script.

use anyhow::{Context, Result};
use clap::Parser;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use shake_core::{DataRecorder, DynamicsEngine, KinematicEngine, ShakeRig};
use shake_types::{BodyGeometry, Excitation, MassProperties, Pose, RigConfig};
use std::path::PathBuf;
use tracing::{info, warn};

// The reference scene, sized in meters with densities in kg/m^3.
const FLOOR_SIZE: (f64, f64, f64) = (20.0, 2.0, 20.0);
const TABLE_SIZE: (f64, f64, f64) = (17.0, 1.0, 15.0);
const BRICK_SIZE: (f64, f64, f64) = (0.5, 1.0, 0.5);
const CONCRETE_DENSITY: f64 = 3000.0;
const BRICK_DENSITY: f64 = 2670.0;
const BRICK_TILT_DEG: f64 = 2.0;

/// Drive a shake table and record how a brick standing on it responds.
#[derive(Parser, Debug)]
#[command(name = "shake")]
#[command(version, about)]
struct Cli {
    /// Recorded motion profile (whitespace-separated time/value pairs).
    /// Without it the table is driven by a sine wave.
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Seconds added to every profile sample time.
    #[arg(long, default_value_t = 0.0)]
    time_offset: f64,

    /// Factor applied to every profile sample value.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Sine frequency in Hz (ignored with --profile).
    #[arg(long, default_value_t = 1.5)]
    frequency: f64,

    /// Sine amplitude in meters (ignored with --profile).
    #[arg(long, default_value_t = 0.001)]
    amplitude: f64,

    /// Integration timestep in seconds.
    #[arg(long, default_value_t = 1e-3)]
    timestep: f64,

    /// Simulated time at which the run stops, in seconds.
    #[arg(long, default_value_t = 3.0)]
    stop_time: f64,

    /// Directory receiving the output streams.
    #[arg(long, default_value = "output")]
    output: PathBuf,
}

fn load_excitation(cli: &Cli) -> Result<Excitation> {
    let Some(path) = &cli.profile else {
        return Ok(Excitation::sine(0.0, cli.frequency, cli.amplitude));
    };
    let outcome = shake_types::MotionProfile::load(path, cli.time_offset, cli.scale)
        .with_context(|| format!("loading motion profile {}", path.display()))?;
    match &outcome.stop {
        shake_types::StopReason::EndOfStream => {
            info!(points = outcome.points_read, "loaded motion profile");
        }
        stop => {
            warn!(
                points = outcome.points_read,
                ?stop,
                "motion profile truncated; using the prefix"
            );
        }
    }
    Ok(Excitation::Profile(outcome.profile))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let excitation = load_excitation(&cli)?;

    let mut engine = KinematicEngine::new();
    let floor = engine.add_body(
        BodyGeometry::box_with_extents(FLOOR_SIZE.0, FLOOR_SIZE.1, FLOOR_SIZE.2),
        MassProperties::box_from_density(FLOOR_SIZE.0, FLOOR_SIZE.1, FLOOR_SIZE.2, CONCRETE_DENSITY),
        Pose::from_position(Point3::new(0.0, -2.0, 0.0)),
        true,
    );
    let table = engine.add_body(
        BodyGeometry::box_with_extents(TABLE_SIZE.0, TABLE_SIZE.1, TABLE_SIZE.2),
        MassProperties::box_from_density(TABLE_SIZE.0, TABLE_SIZE.1, TABLE_SIZE.2, CONCRETE_DENSITY),
        Pose::from_position(Point3::new(0.0, -0.5, 0.0)),
        false,
    );
    let brick = engine.add_body(
        BodyGeometry::box_with_extents(BRICK_SIZE.0, BRICK_SIZE.1, BRICK_SIZE.2),
        MassProperties::box_from_density(BRICK_SIZE.0, BRICK_SIZE.1, BRICK_SIZE.2, BRICK_DENSITY),
        Pose::from_position_rotation(
            Point3::new(0.0, 0.5, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), BRICK_TILT_DEG.to_radians()),
        ),
        false,
    );
    let mut config = RigConfig::new()
        .with_timestep(cli.timestep)
        .with_stop_time(cli.stop_time)
        .with_output_dir(cli.output.clone());
    config.profile_path = cli.profile.clone();

    let constraint = engine
        .bind_constraint(floor, table)
        .context("binding the table to the floor")?;
    for axis in &config.excited_axes {
        engine
            .set_axis_motion(constraint, *axis, excitation.clone())
            .with_context(|| format!("driving the table along {axis}"))?;
    }
    let recorder = DataRecorder::new(&cli.output).context("creating the output directory")?;

    let mut rig = ShakeRig::new(engine, config)
        .context("configuring the rig")?
        .with_recorder(recorder);
    rig.trace_excitation("data_excitation_x", excitation);
    rig.track_offset("data_table", floor, table, Vector3::zeros());
    rig.track_offset("data_brick_offset", table, brick, Vector3::zeros());
    rig.track_rotation("data_brick_rotation", table, brick);

    let report = rig.run().context("running the rig")?;
    if let Some(recorder) = rig.recorder() {
        recorder.write_plot_script(
            "plots",
            &[
                "data_excitation_x",
                "data_table",
                "data_brick_offset",
                "data_brick_rotation",
            ],
        )?;
    }

    info!(
        samples = report.samples,
        final_time = report.final_time,
        output = %cli.output.display(),
        "done"
    );
    Ok(())
}
