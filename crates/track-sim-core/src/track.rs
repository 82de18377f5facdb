//! Immutable boundary oracle over a rasterized track.

use image::imageops::FilterType;
use std::path::Path;
use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq)]
pub enum TrackError {
    ZeroSize,
    MaskSizeMismatch { expected: usize, actual: usize },
    PixelBufferSizeMismatch { expected: usize, actual: usize },
    Image(String),
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::ZeroSize => write!(f, "track width and height must be greater than 0"),
            TrackError::MaskSizeMismatch { expected, actual } => write!(
                f,
                "boundary mask has {actual} cells, expected width * height ({expected})"
            ),
            TrackError::PixelBufferSizeMismatch { expected, actual } => write!(
                f,
                "pixel buffer has {actual} bytes, expected width * height * 4 ({expected})"
            ),
            TrackError::Image(msg) => write!(f, "failed to load track image: {msg}"),
        }
    }
}

impl Error for TrackError {}

/// Boundary/drivable classification grid addressed by integer pixel coordinates.
///
/// Every coordinate outside `[0, width) x [0, height)` classifies as boundary.
#[derive(Clone, Debug)]
pub struct TrackMap {
    width: u32,
    height: u32,
    // Row-major, `true` = boundary.
    boundary: Vec<bool>,
}

impl TrackMap {
    pub fn from_mask(width: u32, height: u32, boundary: Vec<bool>) -> Result<Self, TrackError> {
        if width == 0 || height == 0 {
            return Err(TrackError::ZeroSize);
        }
        let expected = width as usize * height as usize;
        if boundary.len() != expected {
            return Err(TrackError::MaskSizeMismatch {
                expected,
                actual: boundary.len(),
            });
        }
        Ok(Self {
            width,
            height,
            boundary,
        })
    }

    /// Build the mask by classifying every pixel with `is_boundary(x, y)`.
    pub fn from_fn<F>(width: u32, height: u32, mut is_boundary: F) -> Result<Self, TrackError>
    where
        F: FnMut(u32, u32) -> bool,
    {
        let mut boundary = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                boundary.push(is_boundary(x, y));
            }
        }
        Self::from_mask(width, height, boundary)
    }

    /// A track with no boundary pixels inside the frame.
    pub fn open(width: u32, height: u32) -> Result<Self, TrackError> {
        Self::from_fn(width, height, |_, _| false)
    }

    /// Classify an RGBA8 buffer: a pixel is boundary iff its RGB matches `border_color`.
    /// Alpha is ignored, track images are treated as opaque.
    pub fn from_rgba(
        width: u32,
        height: u32,
        pixels: &[u8],
        border_color: [u8; 3],
    ) -> Result<Self, TrackError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(TrackError::PixelBufferSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        let boundary = pixels
            .chunks_exact(4)
            .map(|px| px[..3] == border_color)
            .collect();
        Self::from_mask(width, height, boundary)
    }

    /// Decode a track image and scale it to `width x height` (nearest neighbour) before
    /// classifying it against `border_color`.
    pub fn load(
        path: impl AsRef<Path>,
        width: u32,
        height: u32,
        border_color: [u8; 3],
    ) -> Result<Self, TrackError> {
        if width == 0 || height == 0 {
            return Err(TrackError::ZeroSize);
        }
        let path = path.as_ref();
        let decoded = image::open(path)
            .map_err(|e| TrackError::Image(format!("{}: {e}", path.display())))?
            .to_rgba8();
        let scaled = if decoded.dimensions() == (width, height) {
            decoded
        } else {
            image::imageops::resize(&decoded, width, height, FilterType::Nearest)
        };
        let track = Self::from_rgba(width, height, scaled.as_raw(), border_color)?;
        log::debug!(
            "loaded track {} ({width}x{height}, {} boundary pixels)",
            path.display(),
            track.boundary_count()
        );
        Ok(track)
    }

    /// Procedural oval circuit centred in the frame. Pixels outside the outer ellipse or
    /// inside the inner ellipse are boundary.
    pub fn ellipse_ring(
        width: u32,
        height: u32,
        outer_radii: [f64; 2],
        inner_radii: [f64; 2],
    ) -> Result<Self, TrackError> {
        let cx = width as f64 / 2.0;
        let cy = height as f64 / 2.0;
        let norm = |x: f64, y: f64, radii: [f64; 2]| {
            ((x - cx) / radii[0]).powi(2) + ((y - cy) / radii[1]).powi(2)
        };
        Self::from_fn(width, height, |x, y| {
            let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
            norm(px, py, outer_radii) > 1.0 || norm(px, py, inner_radii) < 1.0
        })
    }

    /// Convert a continuous coordinate to its pixel index by truncation toward zero.
    pub fn pixel_of(v: f64) -> i64 {
        v.trunc() as i64
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        (0..self.width as i64).contains(&x) && (0..self.height as i64).contains(&y)
    }

    pub fn is_boundary(&self, x: i64, y: i64) -> bool {
        if !self.in_bounds(x, y) {
            return true;
        }
        self.boundary[y as usize * self.width as usize + x as usize]
    }

    /// Boundary test for a continuous point, using [`Self::pixel_of`] on both axes.
    pub fn is_boundary_at(&self, point: [f64; 2]) -> bool {
        self.is_boundary(Self::pixel_of(point[0]), Self::pixel_of(point[1]))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn boundary_count(&self) -> usize {
        self.boundary.iter().filter(|&&b| b).count()
    }
}
