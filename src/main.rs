//! Swellfloat - drops a box onto an FFT ocean and lets it float
//!
//! Runs the ocean pipeline and the buoyancy loop at a fixed time step,
//! logging the body's state as it settles.

mod cli;

use anyhow::Context;
use clap::Parser;
use glam::Vec3;
use log::{debug, info, warn};

use cli::Args;
use swellfloat::buoyancy::{BoxBody, BuoyancySampler, ForceIntegrator, QueuedReadback};
use swellfloat::export;
use swellfloat::ocean::OceanSystem;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args
        .simulation_config()
        .context("failed to load configuration")?;

    let mut ocean = OceanSystem::new(config.ocean.clone()).context("invalid ocean configuration")?;
    let mut sampler =
        BuoyancySampler::new(config.buoyancy.grid).context("invalid voxel grid")?;
    let integrator = ForceIntegrator::new(config.buoyancy.force);
    let mut readback = QueuedReadback::new(args.latency);
    let mut body = BoxBody::new(
        args.body_size(),
        args.body_mass,
        Vec3::new(0.0, args.drop_height, 0.0),
    );

    info!(
        "Body: {:?} m, mass {}, {} voxels, readback latency {} ticks",
        args.body_size(),
        args.body_mass,
        config.buoyancy.grid.voxel_count(),
        args.latency
    );

    for tick in 0..args.ticks {
        let time_s = tick as f32 * args.dt;

        // Buoyancy reads the field assembled on the previous tick
        readback.pump();
        let samples = sampler.update(ocean.height_field(), &mut readback, &body);
        if !samples.resource_available {
            debug!("Tick {}: height field not ready", tick);
        }

        let forces = sampler
            .voxels()
            .map(|voxels| integrator.step(voxels, &mut body));
        body.integrate(args.dt, config.buoyancy.force.gravity);

        ocean.update(time_s);

        if tick % args.log_every.max(1) == 0 {
            let water = ocean
                .height_field()
                .map(|field| field.sample_world(body.position))
                .unwrap_or(0.0);
            match forces {
                Some(report) => info!(
                    "t={:6.2}s body y={:6.3} water={:6.3} submerged={:.2} damping={:.2}/{:.2}",
                    time_s,
                    body.position.y,
                    water,
                    report.submerged_fraction,
                    report.linear_damping,
                    report.angular_damping
                ),
                None => info!("t={:6.2}s body y={:6.3} (no voxels yet)", time_s, body.position.y),
            }
        }

        if !body.position.is_finite() {
            warn!("Body state diverged at tick {}, stopping", tick);
            break;
        }
    }

    if let Some(path) = &args.export_height {
        if let Some(field) = ocean.height_field() {
            export::write_height_png(field, path).context("failed to export height field")?;
        }
    }
    if let Some(path) = &args.export_displacement {
        if let Some(fields) = ocean.fields() {
            export::write_displacement_raw(fields.displacement(0), path)
                .context("failed to export displacement")?;
        }
    }

    Ok(())
}
