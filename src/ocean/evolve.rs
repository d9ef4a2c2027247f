//! Per-tick phase evolution of the packed spectra.

use std::f32::consts::PI;

use rustfft::num_complex::Complex32;

use super::ifft::FourierStack;
use super::spectrum::{dispersion, wavevector, PackedSpectrum};
use crate::params::OceanConfig;

/// Complex channels written per cascade
pub const CHANNELS_PER_CASCADE: usize = 4;

/// Precomputed per-bin wave data of one cascade
struct CascadeBins {
    spectrum: PackedSpectrum,
    /// (kx, ky) per bin
    wavevectors: Vec<(f32, f32)>,
    /// Dispersion frequency quantised to the repeat period
    omegas: Vec<f32>,
}

/// Advances every bin by ω(k)·t and expands the height amplitude into
/// displacement and derivative channels for the inverse FFT.
pub struct TimeEvolver {
    size: usize,
    speed: f32,
    repeat_time_s: f32,
    height_cascade: usize,
    variation_range_m: f32,
    cascades: Vec<CascadeBins>,
}

impl TimeEvolver {
    pub fn new(config: &OceanConfig, spectra: Vec<PackedSpectrum>) -> Self {
        let n = config.resolution;
        let base_omega = 2.0 * PI / config.repeat_time_s;

        let cascades = spectra
            .into_iter()
            .map(|spectrum| {
                let mut wavevectors = Vec::with_capacity(n * n);
                let mut omegas = Vec::with_capacity(n * n);
                for y in 0..n {
                    for x in 0..n {
                        let (kx, ky) = wavevector(x, y, n, spectrum.length_scale());
                        let k = (kx * kx + ky * ky).sqrt();
                        let omega = dispersion(k, config.gravity, config.depth);
                        wavevectors.push((kx, ky));
                        omegas.push((omega / base_omega).floor() * base_omega);
                    }
                }
                CascadeBins {
                    spectrum,
                    wavevectors,
                    omegas,
                }
            })
            .collect();

        Self {
            size: n,
            speed: config.speed,
            repeat_time_s: config.repeat_time_s,
            height_cascade: config.height_cascade,
            variation_range_m: config.foam.variation_range_m,
            cascades,
        }
    }

    pub fn cascade_count(&self) -> usize {
        self.cascades.len()
    }

    /// Layers the Fourier stack must hold: four per cascade plus the variation mask
    pub fn layer_count(&self) -> usize {
        self.cascades.len() * CHANNELS_PER_CASCADE + 1
    }

    /// Phase time: simulation time scaled by speed, wrapped to the repeat period
    pub fn phase_time(&self, time_s: f32) -> f32 {
        (time_s * self.speed).rem_euclid(self.repeat_time_s)
    }

    /// Time-evolved height amplitude h̃(k, t) of one cascade
    pub fn height_spectrum(&self, cascade: usize, time_s: f32) -> Vec<Complex32> {
        let t = self.phase_time(time_s);
        let bins = &self.cascades[cascade];
        bins.spectrum
            .bins()
            .iter()
            .zip(&bins.omegas)
            .map(|(bin, &omega)| evolve_bin(bin.h0, bin.h0_mirror_conj, omega * t))
            .collect()
    }

    /// Write all frequency-domain channels for time `time_s` into `stack`
    pub fn evolve(&self, time_s: f32, stack: &mut FourierStack) {
        debug_assert_eq!(stack.layers(), self.layer_count());
        let t = self.phase_time(time_s);
        let n = self.size;
        let aux_layer = self.layer_count() - 1;
        let i = Complex32::i();

        for (c, bins) in self.cascades.iter().enumerate() {
            for index in 0..n * n {
                let bin = bins.spectrum.bins()[index];
                let (kx, ky) = bins.wavevectors[index];
                let k = (kx * kx + ky * ky).sqrt();
                let k_rcp = if k < 0.0001 { 1.0 } else { 1.0 / k };

                let h = evolve_bin(bin.h0, bin.h0_mirror_conj, bins.omegas[index] * t);
                let ih = i * h;

                let dx = ih * kx * k_rcp;
                let dy = h;
                let dz = ih * ky * k_rcp;
                let dx_dx = -h * kx * kx * k_rcp;
                let dy_dx = ih * kx;
                let dz_dx = -h * kx * ky * k_rcp;
                let dy_dz = ih * ky;
                let dz_dz = -h * ky * ky * k_rcp;

                // Two real fields per complex channel: A + i·B
                let base = c * CHANNELS_PER_CASCADE;
                stack.layer_mut(base)[index] = dx + i * dz;
                stack.layer_mut(base + 1)[index] = dy + i * dz_dx;
                stack.layer_mut(base + 2)[index] = dy_dx + i * dy_dz;
                stack.layer_mut(base + 3)[index] = dx_dx + i * dz_dz;

                if c == self.height_cascade {
                    let cutoff = k * self.variation_range_m / (2.0 * PI);
                    stack.layer_mut(aux_layer)[index] = h * (-cutoff * cutoff).exp();
                }
            }
        }
    }
}

/// S0(k)·e^{iφ} + conj(S0(−k))·e^{−iφ}
fn evolve_bin(h0: Complex32, h0_mirror_conj: Complex32, phase: f32) -> Complex32 {
    let rotation = Complex32::from_polar(1.0, phase);
    h0 * rotation + h0_mirror_conj * rotation.conj()
}
