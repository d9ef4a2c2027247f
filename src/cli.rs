//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;

use swellfloat::params::SimulationConfig;

/// Field resolution used when neither a config file nor an override is given
pub const DEMO_RESOLUTION: usize = 256;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "swellfloat")]
#[command(about = "FFT ocean wave field with voxel buoyancy", long_about = None)]
pub struct Args {
    /// TOML configuration file (defaults are used for missing keys)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of simulation ticks to run
    #[arg(long, value_name = "TICKS", default_value = "600")]
    pub ticks: u32,

    /// Fixed time step (seconds)
    #[arg(long, value_name = "SECONDS", default_value = "0.0166667")]
    pub dt: f32,

    /// Override the field resolution (power of two). Without a config file
    /// the demo runs at 256; the library default of 1024 costs about 140 MB
    /// of FFT layers and a slow CPU transform per tick
    #[arg(long, value_name = "TEXELS")]
    pub resolution: Option<usize>,

    /// Override the random seed
    #[arg(long)]
    pub seed: Option<u32>,

    /// Readback latency in ticks
    #[arg(long, value_name = "TICKS", default_value = "2")]
    pub latency: u32,

    /// Log body state every N ticks
    #[arg(long, value_name = "TICKS", default_value = "60")]
    pub log_every: u32,

    /// Body size along x, y, z (meters)
    #[arg(long, value_name = "METERS", num_args = 3, default_values_t = [4.0, 1.0, 2.0])]
    pub body_size: Vec<f32>,

    /// Body mass; the buoyancy model is non-dimensional, so floating
    /// requires mass below the bounding volume
    #[arg(long, default_value = "3.0")]
    pub body_mass: f32,

    /// Initial body height above the mean surface (meters)
    #[arg(long, value_name = "METERS", default_value = "2.0")]
    pub drop_height: f32,

    /// Write the final height field as a 16-bit PNG
    #[arg(long, value_name = "PATH")]
    pub export_height: Option<PathBuf>,

    /// Write the final cascade-0 displacement texels as raw f32
    #[arg(long, value_name = "PATH")]
    pub export_displacement: Option<PathBuf>,
}

impl Args {
    /// Load the configuration file, if any, and apply command-line overrides
    pub fn simulation_config(&self) -> anyhow::Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => {
                let mut config = SimulationConfig::default();
                config.ocean.resolution = DEMO_RESOLUTION;
                config
            }
        };

        if let Some(resolution) = self.resolution {
            config.ocean.resolution = resolution;
        }
        if let Some(seed) = self.seed {
            config.ocean.seed = seed;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn body_size(&self) -> Vec3 {
        match self.body_size.as_slice() {
            [x, y, z] => Vec3::new(*x, *y, *z),
            _ => Vec3::new(4.0, 1.0, 2.0),
        }
    }
}
