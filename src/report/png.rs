//! PNG export of rendered maps
//!
//! Files are named `<stem>_<layer>.png`, e.g. `photo_prediction.png`. The
//! overlay layer is written as-is (transparent except for the highlights)
//! so it can be stacked on the original image by any viewer.

use super::Rendering;
use crate::render::{PixelBuffer, RenderedMaps};
use image::{ImageFormat, RgbaImage};
use std::io::{self, Cursor};
use std::path::Path;

fn to_image(buffer: &PixelBuffer) -> io::Result<RgbaImage> {
    RgbaImage::from_raw(
        buffer.width() as u32,
        buffer.height() as u32,
        buffer.as_bytes().to_vec(),
    )
    .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "pixel buffer size mismatch"))
}

/// Encode a buffer as PNG bytes
pub fn encode(buffer: &PixelBuffer) -> io::Result<Vec<u8>> {
    let img = to_image(buffer)?;
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    Ok(bytes)
}

/// Write a buffer to `path` as PNG
pub fn write_file(path: &Path, buffer: &PixelBuffer) -> io::Result<()> {
    std::fs::write(path, encode(buffer)?)
}

/// Write every present layer into `dir`, returning what was written
pub fn export(dir: &Path, stem: &str, maps: &RenderedMaps) -> io::Result<Vec<Rendering>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for (layer, buffer) in maps.layers() {
        let path = dir.join(format!("{}_{}.png", stem, layer));
        write_file(&path, buffer)?;
        written.push(Rendering { layer, path });
    }
    Ok(written)
}
