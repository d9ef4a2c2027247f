//! Writing assembled fields to disk for inspection.

use std::fs;
use std::path::Path;

use image::{ImageBuffer, Luma};
use log::info;

use crate::error::ExportError;
use crate::ocean::{DisplacementTexel, Field2, HeightField};

/// Height texels rescaled so the field's minimum maps to 0 and maximum to 65535
pub fn normalized_heights(field: &HeightField) -> Vec<u16> {
    let values = field.texels().as_slice();
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;

    values
        .iter()
        .map(|&v| {
            if range > 0.0 {
                (((v - min) / range) * f32::from(u16::MAX)).round() as u16
            } else {
                0
            }
        })
        .collect()
}

/// Save the height field as a 16-bit grayscale PNG
pub fn write_height_png(field: &HeightField, path: &Path) -> Result<(), ExportError> {
    let size = field.resolution();
    let image: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_raw(size as u32, size as u32, normalized_heights(field))
            .ok_or(ExportError::SizeMismatch { size })?;
    image.save(path)?;
    info!("Export: height field -> {}", path.display());
    Ok(())
}

/// Save displacement texels as packed little-endian f32 (x, y, z, foam)
pub fn write_displacement_raw(
    field: &Field2<DisplacementTexel>,
    path: &Path,
) -> Result<(), ExportError> {
    let bytes: &[u8] = bytemuck::cast_slice(field.as_slice());
    fs::write(path, bytes)?;
    info!(
        "Export: {} displacement bytes -> {}",
        bytes.len(),
        path.display()
    );
    Ok(())
}
