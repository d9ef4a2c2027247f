//! Two-pass separable inverse FFT over a stack of frequency-domain layers.

use std::sync::Arc;

use rustfft::{num_complex::Complex32, Fft, FftPlanner};

/// Contiguous N×N complex layers, row-major, transformed together
#[derive(Clone, Debug, PartialEq)]
pub struct FourierStack {
    size: usize,
    layers: usize,
    data: Vec<Complex32>,
}

impl FourierStack {
    pub fn new(size: usize, layers: usize) -> Self {
        Self {
            size,
            layers,
            data: vec![Complex32::new(0.0, 0.0); size * size * layers],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn layers(&self) -> usize {
        self.layers
    }

    pub fn layer(&self, index: usize) -> &[Complex32] {
        let len = self.size * self.size;
        &self.data[index * len..(index + 1) * len]
    }

    pub fn layer_mut(&mut self, index: usize) -> &mut [Complex32] {
        let len = self.size * self.size;
        &mut self.data[index * len..(index + 1) * len]
    }
}

/// Inverse 2D FFT: horizontal pass over every row of every layer in one batch,
/// then a vertical pass, then the (−1)^(x+y) recentering.
///
/// Bin (x, y) holds wavenumber index (x − N/2, y − N/2). The output is
/// unnormalised: f(p) = Σ_k F(k)·e^{+i k·p}.
pub struct InverseFftEngine {
    size: usize,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex32>,
}

impl InverseFftEngine {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_inverse(size);
        let scratch = vec![Complex32::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self { size, fft, scratch }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Transform every layer of `stack` in place
    pub fn transform(&mut self, stack: &mut FourierStack) {
        debug_assert_eq!(stack.size(), self.size);
        self.horizontal_pass(stack);
        self.vertical_pass(stack);
        apply_checkerboard(stack);
    }

    /// Row transforms across all layers as a single batch
    fn horizontal_pass(&mut self, stack: &mut FourierStack) {
        self.fft.process_with_scratch(&mut stack.data, &mut self.scratch);
    }

    /// Column transforms: transpose, reuse the row plan, transpose back
    fn vertical_pass(&mut self, stack: &mut FourierStack) {
        for layer in 0..stack.layers() {
            let data = stack.layer_mut(layer);
            transpose_square(data, self.size);
            self.fft.process_with_scratch(data, &mut self.scratch);
            transpose_square(data, self.size);
        }
    }
}

fn transpose_square(data: &mut [Complex32], size: usize) {
    for y in 0..size {
        for x in (y + 1)..size {
            data.swap(y * size + x, x * size + y);
        }
    }
}

/// Undo the N/2 shift of the zero frequency: multiply texel (x, y) by (−1)^(x+y)
fn apply_checkerboard(stack: &mut FourierStack) {
    let n = stack.size();
    for layer in 0..stack.layers() {
        let data = stack.layer_mut(layer);
        for y in 0..n {
            for x in 0..n {
                if (x + y) % 2 == 1 {
                    data[y * n + x] = -data[y * n + x];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    /// Deterministic pseudo-random values in [-1, 1]
    fn noise(count: usize, mut state: u32) -> Vec<f32> {
        (0..count)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0
            })
            .collect()
    }

    fn random_layer(n: usize, seed: u32) -> Vec<Complex32> {
        let values = noise(2 * n * n, seed);
        values
            .chunks(2)
            .map(|pair| Complex32::new(pair[0], pair[1]))
            .collect()
    }

    /// Direct O(N⁴) evaluation with centered wavenumbers
    fn reference_idft(spectrum: &[Complex32], n: usize) -> Vec<Complex32> {
        let half = (n / 2) as f64;
        let mut out = vec![Complex32::new(0.0, 0.0); n * n];
        for y in 0..n {
            for x in 0..n {
                let (mut re, mut im) = (0.0f64, 0.0f64);
                for ky in 0..n {
                    for kx in 0..n {
                        let value = spectrum[ky * n + kx];
                        let phase = 2.0 * std::f64::consts::PI
                            * ((kx as f64 - half) * x as f64 + (ky as f64 - half) * y as f64)
                            / n as f64;
                        let (s, c) = phase.sin_cos();
                        re += value.re as f64 * c - value.im as f64 * s;
                        im += value.re as f64 * s + value.im as f64 * c;
                    }
                }
                out[y * n + x] = Complex32::new(re as f32, im as f32);
            }
        }
        out
    }

    fn max_norm(values: &[Complex32]) -> f32 {
        values.iter().map(|c| c.norm()).fold(0.0, f32::max)
    }

    #[test]
    fn test_matches_reference_dft_16x16() {
        let n = 16;
        let spectrum = random_layer(n, 7);
        let expected = reference_idft(&spectrum, n);

        let mut stack = FourierStack::new(n, 1);
        stack.layer_mut(0).copy_from_slice(&spectrum);
        InverseFftEngine::new(n).transform(&mut stack);

        let scale = max_norm(&expected);
        for (got, want) in stack.layer(0).iter().zip(&expected) {
            assert!((got - want).norm() <= 1e-3 * scale);
        }
    }

    #[test]
    fn test_batched_layers_match_single_layers() {
        let n = 16;
        let a = random_layer(n, 1);
        let b = random_layer(n, 2);

        let mut batch = FourierStack::new(n, 2);
        batch.layer_mut(0).copy_from_slice(&a);
        batch.layer_mut(1).copy_from_slice(&b);
        let mut engine = InverseFftEngine::new(n);
        engine.transform(&mut batch);

        let mut single = FourierStack::new(n, 1);
        single.layer_mut(0).copy_from_slice(&b);
        engine.transform(&mut single);

        for (x, y) in batch.layer(1).iter().zip(single.layer(0)) {
            assert!((x - y).norm() < 1e-5);
        }
    }

    #[test]
    fn test_single_wave_is_real_cosine() {
        let n = 16;
        let half = n / 2;
        let mut stack = FourierStack::new(n, 1);
        // Wavenumber index (+2, 0) and its mirror (−2, 0)
        stack.layer_mut(0)[half * n + half + 2] = Complex32::new(0.5, 0.0);
        stack.layer_mut(0)[half * n + half - 2] = Complex32::new(0.5, 0.0);
        InverseFftEngine::new(n).transform(&mut stack);

        for y in 0..n {
            for x in 0..n {
                let value = stack.layer(0)[y * n + x];
                let expected = (2.0 * PI * 2.0 * x as f32 / n as f32).cos();
                assert!((value.re - expected).abs() < 1e-4);
                assert!(value.im.abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_transpose_roundtrip() {
        let n = 8;
        let original = random_layer(n, 3);
        let mut data = original.clone();
        transpose_square(&mut data, n);
        assert_eq!(data[n + 2], original[2 * n + 1]);
        transpose_square(&mut data, n);
        assert_eq!(data, original);
    }
}
