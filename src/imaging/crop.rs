use crate::error::CropError;
use image::{GenericImageView, ImageFormat};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Pixels to trim from each edge of a fetched frame.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CropInsets {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropInsets {
    /// All-zero insets leave the frame untouched, so the decode and
    /// re-encode pass can be skipped entirely.
    pub fn is_noop(&self) -> bool {
        self.left == 0 && self.top == 0 && self.right == 0 && self.bottom == 0
    }
}

impl fmt::Display for CropInsets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"left\":{},\"top\":{},\"right\":{},\"bottom\":{}}}",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Crops the image at `path` by the given insets, replacing the file.
///
/// The crop box is `(left, top) - (width - right, height - bottom)` and
/// must stay a non-empty rectangle inside the frame; otherwise
/// `InvalidBox` is returned and the file is left unmodified. The output
/// format follows the file extension.
///
/// The cropped frame is encoded to a sibling temp file and renamed over
/// the target, so concurrent readers of `path` always see a complete
/// frame and an encode failure cannot corrupt it.
pub fn crop_in_place(path: &Path, insets: &CropInsets) -> Result<(), CropError> {
    if insets.is_noop() {
        return Ok(());
    }

    let format = ImageFormat::from_path(path)?;
    let img = image::open(path)?;
    let width = img.width();
    let height = img.height();

    let left = insets.left;
    let top = insets.top;
    let right = width.saturating_sub(insets.right);
    let bottom = height.saturating_sub(insets.bottom);

    if left >= right || top >= bottom {
        return Err(CropError::InvalidBox {
            left,
            top,
            right,
            bottom,
            width,
            height,
        });
    }

    let cropped = img.crop_imm(left, top, right - left, bottom - top);

    let tmp = temp_path(path);
    if let Err(e) = cropped.save_with_format(&tmp, format) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}
