use std::error::Error;
use std::fs;
use std::num::NonZeroU32;
use std::path::Path;

use crate::media::render;

/// Reads an image file and returns its ASCII rendering.
pub fn render_file(path: &Path, width: NonZeroU32) -> Result<String, Box<dyn Error>> {
    let bytes =
        fs::read(path).map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
    Ok(render(&bytes, width)?)
}
