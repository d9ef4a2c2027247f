//! Spectral ocean synthesis: spectrum → phase evolution → inverse FFT → fields.

mod assemble;
mod evolve;
mod field;
mod ifft;
mod spectrum;
mod system;

// Re-export public types
pub use assemble::{CascadeLayout, FieldAssembler, OceanFields};
pub use evolve::{TimeEvolver, CHANNELS_PER_CASCADE};
pub use field::{DisplacementTexel, Field2, Filterable, HeightField, SlopeTexel, Texel};
pub use ifft::{FourierStack, InverseFftEngine};
pub use spectrum::{
    dispersion, jonswap_alpha, jonswap_peak_frequency, PackedBin, PackedSpectrum,
    SpectrumParameters, SpectrumSynthesizer,
};
pub use system::OceanSystem;
