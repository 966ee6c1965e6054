//! Nearest-neighbor block scaling.
//!
//! `scale = n` dithers at `1/n` resolution so each output dot becomes an
//! `n x n` block. Both directions sample, never average, so a down-then-up
//! round trip leaves hard pixel edges.

/// Dimensions after block downscaling (rounded up so edge pixels survive).
#[inline]
pub fn scaled_dims(width: usize, height: usize, block: usize) -> (usize, usize) {
    let block = block.max(1);
    (width.div_ceil(block), height.div_ceil(block))
}

/// Keep the top-left pixel of each `block x block` cell.
pub fn downscale<T: Copy>(pixels: &[T], width: usize, height: usize, block: usize) -> Vec<T> {
    if block <= 1 {
        return pixels.to_vec();
    }
    let (w, h) = scaled_dims(width, height, block);
    let mut out = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            out.push(pixels[(y * block) * width + x * block]);
        }
    }
    out
}

/// Expand a downscaled image back to `width x height`.
pub fn upscale<T: Copy>(small: &[T], width: usize, height: usize, block: usize) -> Vec<T> {
    if block <= 1 {
        return small.to_vec();
    }
    let (w, _) = scaled_dims(width, height, block);
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = (y / block) * w;
        for x in 0..width {
            out.push(small[row + x / block]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_dims_round_up() {
        assert_eq!(scaled_dims(10, 7, 3), (4, 3));
        assert_eq!(scaled_dims(10, 7, 1), (10, 7));
        assert_eq!(scaled_dims(1, 1, 8), (1, 1));
    }

    #[test]
    fn test_downscale_samples_block_origin() {
        let px: Vec<u32> = (0..16).collect();
        assert_eq!(downscale(&px, 4, 4, 2), vec![0, 2, 8, 10]);
    }

    #[test]
    fn test_upscale_restores_dimensions() {
        let small = vec![1u8, 2, 3, 4];
        let big = upscale(&small, 3, 3, 2);
        assert_eq!(big, vec![1, 1, 2, 1, 1, 2, 3, 3, 4]);
    }

    #[test]
    fn test_round_trip_on_block_aligned_image() {
        let px: Vec<u8> = vec![5, 5, 9, 9, 5, 5, 9, 9];
        let small = downscale(&px, 4, 2, 2);
        assert_eq!(upscale(&small, 4, 2, 2), px);
    }
}
