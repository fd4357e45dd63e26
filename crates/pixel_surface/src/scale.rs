//! Nearest-neighbor pixel resampling and the viewport-sized cache it
//! writes into
//!
//! The resampler is deliberately simple: a fixed-point source walk with 16
//! fractional bits, one copy per destination pixel, no filtering and no
//! allocation. That keeps a full-frame rescale cheap enough to run every
//! frame of a real-time loop.

use crate::error::{SurfaceError, SurfaceResult};
use crate::surface::Size;

/// Fractional bits of the fixed-point accumulators.
const FP_SHIFT: u32 = 16;

/// Resample `src` into `dst` with nearest-neighbor sampling
///
/// Each destination pixel copies the source pixel at the truncated
/// fixed-point position; the horizontal step is `(src_w << 16) / dst_w` and
/// the vertical step `(src_h << 16) / dst_h`. A destination with a zero
/// dimension is a no-op. The source is never written; writes stay within
/// the first `dst_size.area()` elements of `dst`.
///
/// # Panics
/// Panics if either slice is shorter than its declared dimensions require.
pub fn scale_nearest(src: &[u32], src_size: Size, dst: &mut [u32], dst_size: Size) {
    if dst_size.is_empty() || src_size.is_empty() {
        return;
    }
    debug_assert!(src.len() >= src_size.area());
    debug_assert!(dst.len() >= dst_size.area());

    let src_pitch = src_size.width as usize;
    let dst_pitch = dst_size.width as usize;

    let delta_x = ((src_size.width as u64) << FP_SHIFT) / u64::from(dst_size.width);
    let delta_y = ((src_size.height as u64) << FP_SHIFT) / u64::from(dst_size.height);

    let mut src_oy: u64 = 0;
    let mut src_row = 0usize;
    for dst_row in 0..dst_size.height as usize {
        let src_line = &src[src_row * src_pitch..(src_row + 1) * src_pitch];
        let dst_line = &mut dst[dst_row * dst_pitch..(dst_row + 1) * dst_pitch];

        let mut src_ox: u64 = 0;
        for out in dst_line.iter_mut() {
            *out = src_line[(src_ox >> FP_SHIFT) as usize];
            src_ox += delta_x;
        }

        src_oy += delta_y;
        if src_oy >= 1 << FP_SHIFT {
            src_row += (src_oy >> FP_SHIFT) as usize;
            src_oy &= (1 << FP_SHIFT) - 1;
        }
    }
}

/// Reusable buffer holding the most recently resampled frame
///
/// The cache is rebuilt whenever its dimensions no longer match the
/// viewport and dropped entirely on resize, so a populated cache is always
/// exactly viewport-sized.
#[derive(Debug, Default)]
pub(crate) struct ScalerCache {
    size: Size,
    pixels: Vec<u32>,
}

impl ScalerCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Dimensions the cache currently holds, `Size::ZERO` when empty
    pub(crate) fn size(&self) -> Size {
        self.size
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Make the cache exactly `size` pixels, rebuilding if stale
    ///
    /// Allocation failure is recoverable: the cache is left empty and the
    /// caller may retry on a later frame.
    pub(crate) fn ensure(&mut self, size: Size) -> SurfaceResult<()> {
        if self.size == size && !self.pixels.is_empty() {
            return Ok(());
        }

        self.invalidate();
        let len = size.area();
        self.pixels
            .try_reserve_exact(len)
            .map_err(|_| SurfaceError::CacheAlloc {
                width: size.width,
                height: size.height,
            })?;
        self.pixels.resize(len, 0);
        self.size = size;
        log::debug!("scaler cache rebuilt at {size}");
        Ok(())
    }

    /// Drop the cached buffer; the next `ensure` rebuilds from scratch
    pub(crate) fn invalidate(&mut self) {
        self.pixels = Vec::new();
        self.size = Size::ZERO;
    }

    pub(crate) fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(size: Size) -> Vec<u32> {
        (0..size.area())
            .map(|i| {
                let x = i % size.width as usize;
                let y = i / size.width as usize;
                if (x + y) % 2 == 0 {
                    0x00ff_ffff
                } else {
                    0x0000_0000
                }
            })
            .collect()
    }

    #[test]
    fn test_identity_scale_copies_pixel_for_pixel() {
        let size = Size::new(7, 5);
        let src: Vec<u32> = (0..size.area() as u32).collect();
        let mut dst = vec![0u32; size.area()];

        scale_nearest(&src, size, &mut dst, size);
        assert_eq!(src, dst);
    }

    #[test]
    fn test_every_output_pixel_exists_in_input() {
        let src_size = Size::new(13, 9);
        let src: Vec<u32> = (0..src_size.area() as u32).map(|i| i * 31 + 7).collect();

        for (dw, dh) in [(1, 1), (4, 4), (13, 9), (26, 18), (40, 3), (3, 40)] {
            let dst_size = Size::new(dw, dh);
            let mut dst = vec![u32::MAX; dst_size.area()];
            scale_nearest(&src, src_size, &mut dst, dst_size);
            for px in &dst {
                assert!(src.contains(px), "output {px:#x} not found in source");
            }
        }
    }

    #[test]
    fn test_upscale_duplicates_in_order() {
        // 2x1 source doubled horizontally: each source pixel appears twice,
        // left half before right half.
        let src = [0xaa, 0xbb];
        let mut dst = [0u32; 4];
        scale_nearest(&src, Size::new(2, 1), &mut dst, Size::new(4, 1));
        assert_eq!(dst, [0xaa, 0xaa, 0xbb, 0xbb]);
    }

    #[test]
    fn test_downscale_samples_truncated_positions() {
        // 4x1 -> 2x1 with delta 2.0: positions 0 and 2.
        let src = [10, 20, 30, 40];
        let mut dst = [0u32; 2];
        scale_nearest(&src, Size::new(4, 1), &mut dst, Size::new(2, 1));
        assert_eq!(dst, [10, 30]);
    }

    #[test]
    fn test_vertical_walk_advances_rows() {
        // 1x4 -> 1x2: rows 0 and 2.
        let src = [1, 2, 3, 4];
        let mut dst = [0u32; 2];
        scale_nearest(&src, Size::new(1, 4), &mut dst, Size::new(1, 2));
        assert_eq!(dst, [1, 3]);
    }

    #[test]
    fn test_degenerate_destination_is_noop() {
        let src = checker(Size::new(8, 8));
        let mut dst = vec![0xdead_beef; 16];
        scale_nearest(&src, Size::new(8, 8), &mut dst, Size::new(0, 4));
        scale_nearest(&src, Size::new(8, 8), &mut dst, Size::new(4, 0));
        assert!(dst.iter().all(|&px| px == 0xdead_beef));
    }

    #[test]
    fn test_writes_stay_within_destination_area() {
        let src = checker(Size::new(5, 5));
        // Slice longer than the declared destination; the tail must survive.
        let mut dst = vec![0x7777_7777u32; 3 * 3 + 4];
        scale_nearest(&src, Size::new(5, 5), &mut dst, Size::new(3, 3));
        assert!(dst[9..].iter().all(|&px| px == 0x7777_7777));
    }

    #[test]
    fn test_cache_ensure_and_invalidate() {
        let mut cache = ScalerCache::new();
        assert!(cache.is_empty());

        cache.ensure(Size::new(640, 480)).unwrap();
        assert_eq!(cache.size(), Size::new(640, 480));
        assert_eq!(cache.pixels().len(), 640 * 480);

        // Same size: no rebuild needed, contents preserved.
        cache.pixels_mut()[0] = 42;
        cache.ensure(Size::new(640, 480)).unwrap();
        assert_eq!(cache.pixels()[0], 42);

        // New size: rebuilt to match.
        cache.ensure(Size::new(100, 50)).unwrap();
        assert_eq!(cache.pixels().len(), 100 * 50);

        cache.invalidate();
        assert!(cache.is_empty());
        assert_eq!(cache.size(), Size::ZERO);
    }
}
