//! In-memory surface provider.
//!
//! [`GridSurface`] is the concrete provider hosts hand to the importer: a
//! dense height grid plus up to four lazily allocated weight channels. It is
//! also the workhorse of the test suite, including an [`invalidate`] switch
//! that emulates the host destroying the surface while an import is running.
//!
//! [`invalidate`]: GridSurface::invalidate

use std::sync::atomic::{AtomicBool, Ordering};

use crate::provider::{RgbaChannel, SurfaceError, SurfaceProvider};

/// Dense in-memory terrain surface.
///
/// Heights and weights are stored row-major (`y * width + x`). Weight
/// channels are allocated on first write; unpainted channels read as `0.0`.
pub struct GridSurface {
    /// Width in texels.
    width: u32,
    /// Height in texels.
    height: u32,
    /// Vertical scale applied to raw heights.
    scale: f32,
    /// Vertical offset applied after scaling.
    offset: f32,
    /// Raw height samples, row-major.
    heights: Vec<f32>,
    /// Packed weight channels, allocated on first write.
    channels: [Option<Vec<f32>>; 4],
    /// One-way validity switch. Cleared by [`GridSurface::invalidate`].
    valid: AtomicBool,
}

impl GridSurface {
    /// Creates a flat surface of the given dimensions with all heights `0.0`
    /// and identity vertical transform (`scale = 1`, `offset = 0`).
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
            offset: 0.0,
            heights: vec![0.0; (width as usize) * (height as usize)],
            channels: [None, None, None, None],
            valid: AtomicBool::new(true),
        }
    }

    /// Creates a surface from an existing row-major height buffer.
    ///
    /// # Panics
    ///
    /// Panics if `heights.len() != width * height`.
    #[must_use]
    pub fn from_heights(width: u32, height: u32, heights: Vec<f32>) -> Self {
        assert_eq!(
            heights.len(),
            (width as usize) * (height as usize),
            "height buffer does not match dimensions"
        );
        Self {
            width,
            height,
            scale: 1.0,
            offset: 0.0,
            heights,
            channels: [None, None, None, None],
            valid: AtomicBool::new(true),
        }
    }

    /// Sets the vertical `(scale, offset)` pair.
    #[must_use]
    pub fn with_scale_offset(mut self, scale: f32, offset: f32) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    /// Fills every height sample with `value`.
    #[must_use]
    pub fn with_uniform_height(mut self, value: f32) -> Self {
        self.heights.fill(value);
        self
    }

    /// Fills one weight channel with `value`, allocating it if needed.
    #[must_use]
    pub fn with_uniform_weight(mut self, channel: RgbaChannel, value: f32) -> Self {
        let len = self.heights.len();
        let grid = self.channels[channel.index()].get_or_insert_with(|| vec![0.0; len]);
        grid.fill(value);
        self
    }

    /// Sets a single height sample. Out-of-bounds writes are ignored.
    pub fn set_height(&mut self, x: u32, y: u32, value: f32) {
        if x < self.width && y < self.height {
            let idx = self.texel_index(x, y);
            self.heights[idx] = value;
        }
    }

    /// Sets a single weight sample, allocating the channel if needed.
    /// Out-of-bounds writes are ignored.
    pub fn set_weight(&mut self, channel: RgbaChannel, x: u32, y: u32, value: f32) {
        if x < self.width && y < self.height {
            let len = self.heights.len();
            let idx = self.texel_index(x, y);
            let grid = self.channels[channel.index()].get_or_insert_with(|| vec![0.0; len]);
            grid[idx] = value;
        }
    }

    /// Marks the surface as destroyed. Every later sampling call returns
    /// [`SurfaceError::Invalidated`]. The switch is one-way.
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::Relaxed);
    }

    /// Row-major index of a texel. Caller has already bounds-checked.
    #[inline]
    fn texel_index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Validity gate shared by every sampling method.
    fn ensure_valid(&self) -> Result<(), SurfaceError> {
        if self.valid.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(SurfaceError::Invalidated)
        }
    }

    /// Bounds gate shared by every per-texel sampling method.
    fn ensure_in_bounds(&self, x: u32, y: u32) -> Result<(), SurfaceError> {
        if x < self.width && y < self.height {
            Ok(())
        } else {
            Err(SurfaceError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }
}

impl SurfaceProvider for GridSurface {
    fn get_dimensions(&self) -> Result<(u32, u32), SurfaceError> {
        self.ensure_valid()?;
        Ok((self.width, self.height))
    }

    fn get_scale_offset(&self) -> Result<(f32, f32), SurfaceError> {
        self.ensure_valid()?;
        Ok((self.scale, self.offset))
    }

    fn get_height(&self, x: u32, y: u32) -> Result<f32, SurfaceError> {
        self.ensure_valid()?;
        self.ensure_in_bounds(x, y)?;
        Ok(self.heights[self.texel_index(x, y)])
    }

    fn get_weight(&self, channel: RgbaChannel, x: u32, y: u32) -> Result<f32, SurfaceError> {
        self.ensure_valid()?;
        self.ensure_in_bounds(x, y)?;
        Ok(self.channels[channel.index()]
            .as_ref()
            .map_or(0.0, |grid| grid[self.texel_index(x, y)]))
    }
}
