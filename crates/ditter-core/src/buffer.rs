//! RGBA8 raster type.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("pixel data has {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A row-major RGBA8 image with straight (non-premultiplied) alpha.
///
/// The length invariant `pixels.len() == width * height * 4` is checked on
/// construction and cannot be broken afterwards: pixel storage is only
/// reachable through slices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap existing RGBA bytes.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BufferError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(BufferError::LengthMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A buffer filled with a single RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let n = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(n * 4);
        for _ in 0..n {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// True when either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Give up the buffer and return the raw RGBA bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    /// RGBA value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics when the coordinates are out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Iterate over RGBA pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.pixels
            .chunks_exact(4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Alpha channel, row-major.
    pub(crate) fn alpha(&self) -> Vec<u8> {
        self.pixels.chunks_exact(4).map(|p| p[3]).collect()
    }

    /// Assemble a buffer from color channels and a matching alpha plane.
    pub(crate) fn from_rgb_alpha(width: u32, height: u32, rgb: &[[u8; 3]], alpha: &[u8]) -> Self {
        debug_assert_eq!(rgb.len(), alpha.len());
        let mut pixels = Vec::with_capacity(rgb.len() * 4);
        for (c, &a) in rgb.iter().zip(alpha) {
            pixels.extend_from_slice(&[c[0], c[1], c[2], a]);
        }
        Self {
            width,
            height,
            pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_is_validated() {
        assert!(PixelBuffer::new(2, 2, vec![0; 16]).is_ok());
        assert_eq!(
            PixelBuffer::new(2, 2, vec![0; 15]),
            Err(BufferError::LengthMismatch {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn test_zero_area_is_empty() {
        let buf = PixelBuffer::new(0, 10, vec![]).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.pixel_count(), 0);
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let buf = PixelBuffer::from_fn(3, 2, |x, y| [x as u8, y as u8, 0, 255]);
        assert_eq!(buf.pixel(2, 0), [2, 0, 0, 255]);
        assert_eq!(buf.pixel(0, 1), [0, 1, 0, 255]);
        assert_eq!(&buf.as_bytes()[12..16], &[0, 1, 0, 255]);
    }

    #[test]
    fn test_rgb_alpha_split_and_join() {
        let buf = PixelBuffer::from_fn(2, 1, |x, _| [10, 20, 30, x as u8 * 100]);
        let rgb: Vec<[u8; 3]> = buf.pixels().map(|p| [p[0], p[1], p[2]]).collect();
        let joined = PixelBuffer::from_rgb_alpha(2, 1, &rgb, &buf.alpha());
        assert_eq!(joined, buf);
    }
}
