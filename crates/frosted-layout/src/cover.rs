#![forbid(unsafe_code)]

//! `background-size: cover` geometry.
//!
//! Scales an image so it fully covers a container while keeping its aspect
//! ratio. The overflowing axis is cropped; there are never gaps.

use serde::Serialize;

/// Scaled image size that covers a container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverSize {
    pub width: f64,
    pub height: f64,
    /// Factor applied to the intrinsic image size.
    pub scale: f64,
}

/// Compute the cover size of an `image_width` x `image_height` image inside
/// a `container_width` x `container_height` box.
///
/// Returns `None` when any extent is not a positive finite number.
#[must_use]
pub fn compute_cover(
    image_width: f64,
    image_height: f64,
    container_width: f64,
    container_height: f64,
) -> Option<CoverSize> {
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if ![image_width, image_height, container_width, container_height]
        .into_iter()
        .all(usable)
    {
        return None;
    }

    let image_ratio = image_width / image_height;
    let container_ratio = container_width / container_height;

    Some(if image_ratio >= container_ratio {
        // Height binds; width overflows.
        let scale = container_height / image_height;
        CoverSize {
            width: image_width * scale,
            height: container_height,
            scale,
        }
    } else {
        let scale = container_width / image_width;
        CoverSize {
            width: container_width,
            height: image_height * scale,
            scale,
        }
    })
}
