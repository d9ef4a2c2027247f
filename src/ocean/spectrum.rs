//! Initial wave spectrum synthesis (JONSWAP + directional spreading).
//!
//! Builds, per cascade, an N×N grid of complex Gaussian amplitudes h0(k)
//! and packs each bin with the conjugate of its mirror so later stages can
//! form Hermitian spectra without revisiting −k.

use std::f32::consts::PI;

use rustfft::num_complex::Complex32;

use crate::params::{CascadeConfig, OceanConfig, SpectrumSettings};

/// Per-set parameters derived once from wind statistics
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpectrumParameters {
    pub scale: f32,
    /// Wind direction (radians)
    pub angle: f32,
    pub spread_blend: f32,
    pub swell: f32,
    pub alpha: f32,
    pub peak_omega: f32,
    pub gamma: f32,
    pub short_waves_fade: f32,
}

impl SpectrumParameters {
    pub fn from_settings(settings: &SpectrumSettings, gravity: f32) -> Self {
        Self {
            scale: settings.scale,
            angle: settings.wind_direction_deg.to_radians(),
            spread_blend: settings.spread_blend.clamp(0.0, 1.0),
            swell: settings.swell.clamp(0.01, 1.0),
            alpha: jonswap_alpha(gravity, settings.fetch, settings.wind_speed),
            peak_omega: jonswap_peak_frequency(gravity, settings.fetch, settings.wind_speed),
            gamma: settings.peak_enhancement,
            short_waves_fade: settings.short_waves_fade,
        }
    }
}

/// Fetch-limited Phillips constant
pub fn jonswap_alpha(gravity: f32, fetch: f32, wind_speed: f32) -> f32 {
    0.076 * (gravity * fetch / wind_speed / wind_speed).powf(-0.22)
}

/// Fetch-limited peak angular frequency (rad/s)
pub fn jonswap_peak_frequency(gravity: f32, fetch: f32, wind_speed: f32) -> f32 {
    22.0 * (wind_speed * fetch / gravity / gravity).powf(-0.33)
}

/// Finite-depth dispersion relation ω(k) = sqrt(g k tanh(k h))
pub fn dispersion(k: f32, gravity: f32, depth: f32) -> f32 {
    (gravity * k * (k * depth).min(20.0).tanh()).sqrt()
}

/// dω/dk of the finite-depth dispersion relation
pub fn dispersion_derivative(k: f32, gravity: f32, depth: f32) -> f32 {
    let kh = (k * depth).min(20.0);
    let th = kh.tanh();
    let ch = kh.cosh();
    gravity * (depth * k / ch / ch + th) / dispersion(k, gravity, depth) / 2.0
}

/// Shallow-water (TMA) attenuation of the deep-water spectrum
fn tma_correction(omega: f32, gravity: f32, depth: f32) -> f32 {
    let omega_h = omega * (depth / gravity).sqrt();
    if omega_h <= 1.0 {
        0.5 * omega_h * omega_h
    } else if omega_h < 2.0 {
        1.0 - 0.5 * (2.0 - omega_h) * (2.0 - omega_h)
    } else {
        1.0
    }
}

/// JONSWAP spectral energy density S(ω)
pub fn jonswap(omega: f32, params: &SpectrumParameters, gravity: f32, depth: f32) -> f32 {
    let peak = params.peak_omega;
    let sigma = if omega <= peak { 0.07 } else { 0.09 };
    let r = (-(omega - peak) * (omega - peak) / (2.0 * sigma * sigma * peak * peak)).exp();

    let inv_omega = 1.0 / omega;
    let peak_ratio = peak / omega;
    params.scale
        * tma_correction(omega, gravity, depth)
        * params.alpha
        * gravity
        * gravity
        * inv_omega.powi(5)
        * (-1.25 * peak_ratio.powi(4)).exp()
        * params.gamma.abs().powf(r)
}

/// Normalisation of the cos-2s spreading function
fn cosine_2s_normalization(s: f32) -> f32 {
    let s2 = s * s;
    let s3 = s2 * s;
    let s4 = s3 * s;
    if s < 5.0 {
        -0.000564 * s4 + 0.00776 * s3 - 0.044 * s2 + 0.192 * s + 0.163
    } else {
        -4.80e-08 * s4 + 1.07e-05 * s3 - 9.53e-04 * s2 + 5.90e-02 * s + 3.93e-01
    }
}

fn spread_power(omega: f32, peak_omega: f32) -> f32 {
    let ratio = (omega / peak_omega).abs();
    if omega > peak_omega {
        9.77 * ratio.powf(-2.5)
    } else {
        6.97 * ratio.powf(5.0)
    }
}

/// Directional spread D(θ): wide cos² lobe blended with a swell-narrowed cos-2s lobe
pub fn direction_spectrum(theta: f32, omega: f32, params: &SpectrumParameters) -> f32 {
    let relative = theta - params.angle;
    let s = spread_power(omega, params.peak_omega)
        + 16.0 * (omega / params.peak_omega).min(20.0).tanh() * params.swell * params.swell;

    let wide = 2.0 / PI * relative.cos() * relative.cos();
    let narrow = cosine_2s_normalization(s) * (0.5 * relative).cos().abs().powf(2.0 * s);
    wide + (narrow - wide) * params.spread_blend
}

fn short_waves_fade(k: f32, params: &SpectrumParameters) -> f32 {
    (-params.short_waves_fade * params.short_waves_fade * k * k).exp()
}

/// Integer hash mapped to [0, 1]
fn hash(n: u32) -> f32 {
    let n = (n << 13) ^ n;
    let n = n
        .wrapping_mul(
            n.wrapping_mul(n)
                .wrapping_mul(15731)
                .wrapping_add(789_221),
        )
        .wrapping_add(1_376_312_589);
    (n & 0x7fff_ffff) as f32 / 0x7fff_ffff as f32
}

/// Box-Muller transform of two uniforms into two unit normals
fn uniform_to_gaussian(u1: f32, u2: f32) -> (f32, f32) {
    let r = (-2.0 * u1.max(1e-7).ln()).sqrt();
    let theta = 2.0 * PI * u2;
    (r * theta.cos(), r * theta.sin())
}

/// Wavevector of bin (x, y); the zero frequency sits at (N/2, N/2)
pub fn wavevector(x: usize, y: usize, size: usize, length_scale: f32) -> (f32, f32) {
    let half = (size / 2) as f32;
    let delta_k = 2.0 * PI / length_scale;
    ((x as f32 - half) * delta_k, (y as f32 - half) * delta_k)
}

/// Index of the bin holding −k
pub fn mirror(x: usize, y: usize, size: usize) -> (usize, usize) {
    ((size - x) % size, (size - y) % size)
}

/// Bin amplitude packed with the conjugate of its mirror
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PackedBin {
    /// h0(k)
    pub h0: Complex32,
    /// conj(h0(−k))
    pub h0_mirror_conj: Complex32,
}

impl PackedBin {
    /// h0(k) + conj(h0(−k)): the Hermitian rest amplitude
    pub fn combined(&self) -> Complex32 {
        self.h0 + self.h0_mirror_conj
    }
}

/// Packed initial spectrum of one cascade
#[derive(Clone, Debug, PartialEq)]
pub struct PackedSpectrum {
    size: usize,
    length_scale: f32,
    bins: Vec<PackedBin>,
}

impl PackedSpectrum {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn length_scale(&self) -> f32 {
        self.length_scale
    }

    pub fn bin(&self, x: usize, y: usize) -> PackedBin {
        self.bins[y * self.size + x]
    }

    pub fn bins(&self) -> &[PackedBin] {
        &self.bins
    }
}

/// Builds the packed initial spectra of every cascade
pub struct SpectrumSynthesizer {
    size: usize,
    gravity: f32,
    depth: f32,
    low_cutoff: f32,
    high_cutoff: f32,
    seed: u32,
}

impl SpectrumSynthesizer {
    pub fn new(config: &OceanConfig) -> Self {
        Self {
            size: config.resolution,
            gravity: config.gravity,
            depth: config.depth,
            low_cutoff: config.low_cutoff,
            high_cutoff: config.high_cutoff,
            seed: config.seed,
        }
    }

    /// Synthesize and pack all cascades
    pub fn synthesize(&self, cascades: &[CascadeConfig]) -> Vec<PackedSpectrum> {
        let initial = self.initial_amplitudes(cascades);
        initial
            .into_iter()
            .zip(cascades)
            .map(|(h0, cascade)| self.pack(h0, cascade.length_scale_m))
            .collect()
    }

    /// First pass: unpaired Gaussian amplitudes h0(k) per cascade
    pub fn initial_amplitudes(&self, cascades: &[CascadeConfig]) -> Vec<Vec<Complex32>> {
        let n = self.size;
        let params: Vec<[SpectrumParameters; 2]> = cascades
            .iter()
            .map(|c| {
                [
                    SpectrumParameters::from_settings(&c.spectra[0], self.gravity),
                    SpectrumParameters::from_settings(&c.spectra[1], self.gravity),
                ]
            })
            .collect();

        let mut layers = vec![vec![Complex32::new(0.0, 0.0); n * n]; cascades.len()];

        for y in 0..n {
            for x in 0..n {
                let mut seed = (x as u32)
                    .wrapping_add((n as u32).wrapping_mul(y as u32))
                    .wrapping_add(n as u32)
                    .wrapping_add(self.seed);

                for (i, cascade) in cascades.iter().enumerate() {
                    // Seed advances for every cascade so layers stay uncorrelated
                    seed = seed
                        .wrapping_add(i as u32)
                        .wrapping_add((hash(seed) * 10.0) as u32);
                    let (g1, _) = uniform_to_gaussian(hash(seed), hash(seed.wrapping_mul(2)));
                    let (_, g2) = uniform_to_gaussian(
                        hash(seed.wrapping_mul(3)),
                        hash(seed.wrapping_mul(4)),
                    );

                    // Nyquist row and column stay empty
                    if x == 0 || y == 0 {
                        continue;
                    }

                    let (kx, ky) = wavevector(x, y, n, cascade.length_scale_m);
                    let k = (kx * kx + ky * ky).sqrt();
                    // k = 0 has no direction and zero frequency
                    if k <= 0.0 || k < self.low_cutoff || k > self.high_cutoff {
                        continue;
                    }

                    let density = self.density(kx, ky, k, &params[i]);
                    let delta_k = 2.0 * PI / cascade.length_scale_m;
                    let amplitude = (density * delta_k * delta_k / 2.0).sqrt();
                    layers[i][y * n + x] = Complex32::new(g1, g2) * amplitude;
                }
            }
        }

        layers
    }

    /// Wavevector-space energy density summed over a cascade's two sets
    fn density(&self, kx: f32, ky: f32, k: f32, sets: &[SpectrumParameters; 2]) -> f32 {
        let theta = ky.atan2(kx);
        let omega = dispersion(k, self.gravity, self.depth);
        let jacobian = dispersion_derivative(k, self.gravity, self.depth).abs() / k;

        sets.iter()
            .enumerate()
            .filter(|(index, set)| *index == 0 || set.scale > 0.0)
            .map(|(_, set)| {
                jonswap(omega, set, self.gravity, self.depth)
                    * direction_spectrum(theta, omega, set)
                    * short_waves_fade(k, set)
            })
            .sum::<f32>()
            * jacobian
    }

    /// Second pass: pair every bin with conj(h0(−k))
    fn pack(&self, h0: Vec<Complex32>, length_scale: f32) -> PackedSpectrum {
        let n = self.size;
        let mut bins = Vec::with_capacity(n * n);
        for y in 0..n {
            for x in 0..n {
                let (mx, my) = mirror(x, y, n);
                bins.push(PackedBin {
                    h0: h0[y * n + x],
                    h0_mirror_conj: h0[my * n + mx].conj(),
                });
            }
        }
        PackedSpectrum {
            size: n,
            length_scale,
            bins,
        }
    }
}
