//! PNG file I/O for the command-line front-end.
//!
//! Decoding accepts any non-animated PNG and normalizes it to RGBA8.
//! Encoding writes a packed indexed PNG when the image is opaque and uses at
//! most 256 colors, which is the common case for dithered output, and falls
//! back to plain RGBA8 otherwise.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use ditter_core::PixelBuffer;

use crate::error::ImageError;

/// Decode PNG bytes into an RGBA8 buffer.
pub fn decode_png(data: &[u8]) -> Result<PixelBuffer, ImageError> {
    let mut decoder = png::Decoder::new(Cursor::new(data));
    // Palette and sub-byte gray expand to 8 bits, tRNS becomes alpha.
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    if info.bit_depth != png::BitDepth::Eight {
        return Err(ImageError::UnsupportedFormat {
            color: info.color_type,
            depth: info.bit_depth,
        });
    }

    let rgba: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        color => {
            return Err(ImageError::UnsupportedFormat {
                color,
                depth: info.bit_depth,
            })
        }
    };

    Ok(PixelBuffer::new(info.width, info.height, rgba)?)
}

/// Encode a buffer as PNG bytes.
pub fn encode_png(image: &PixelBuffer) -> Result<Vec<u8>, ImageError> {
    match index_colors(image) {
        Some((plte, indices)) => {
            let (depth, bits) = match plte.len() / 3 {
                0..=2 => (png::BitDepth::One, 1),
                3..=4 => (png::BitDepth::Two, 2),
                5..=16 => (png::BitDepth::Four, 4),
                _ => (png::BitDepth::Eight, 8),
            };
            let packed = if bits == 8 {
                indices
            } else {
                pack_nbits(&indices, image.width(), bits)
            };
            encode_with(image, png::ColorType::Indexed, depth, Some(&plte), &packed)
        }
        None => encode_with(
            image,
            png::ColorType::Rgba,
            png::BitDepth::Eight,
            None,
            image.as_bytes(),
        ),
    }
}

pub fn read_png(path: &Path) -> Result<PixelBuffer, ImageError> {
    decode_png(&std::fs::read(path)?)
}

pub fn write_png(path: &Path, image: &PixelBuffer) -> Result<(), ImageError> {
    std::fs::write(path, encode_png(image)?)?;
    Ok(())
}

/// Palette bytes and per-pixel indices, or `None` when the image has
/// transparency or more than 256 colors.
fn index_colors(image: &PixelBuffer) -> Option<(Vec<u8>, Vec<u8>)> {
    let mut lookup: HashMap<[u8; 3], u8> = HashMap::new();
    let mut plte = Vec::new();
    let mut indices = Vec::with_capacity(image.pixel_count());

    for p in image.pixels() {
        if p[3] != 255 {
            return None;
        }
        let rgb = [p[0], p[1], p[2]];
        let index = match lookup.get(&rgb) {
            Some(&i) => i,
            None => {
                let i = u8::try_from(lookup.len()).ok()?;
                lookup.insert(rgb, i);
                plte.extend_from_slice(&rgb);
                i
            }
        };
        indices.push(index);
    }
    Some((plte, indices))
}

fn encode_with(
    image: &PixelBuffer,
    color_type: png::ColorType,
    bit_depth: png::BitDepth,
    plte: Option<&[u8]>,
    data: &[u8],
) -> Result<Vec<u8>, ImageError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
        encoder.set_color(color_type);
        encoder.set_depth(bit_depth);
        if let Some(plte) = plte {
            encoder.set_palette(plte);
        }
        let mut writer = encoder.write_header()?;
        writer.write_image_data(data)?;
        writer.finish()?;
    }
    Ok(buf.into_inner())
}

/// Pack indices into N-bit PNG row data (1, 2, or 4 bits per pixel).
fn pack_nbits(indices: &[u8], width: u32, bits: u8) -> Vec<u8> {
    let pixels_per_byte = 8 / bits as usize;
    let bytes_per_row = (width as usize).div_ceil(pixels_per_byte);
    let height = indices.len() / width as usize;
    let mask = (1u8 << bits) - 1;
    let mut packed = Vec::with_capacity(bytes_per_row * height);

    for row in indices.chunks(width as usize) {
        let mut byte = 0u8;
        for (i, &idx) in row.iter().enumerate() {
            let shift = (8 - bits) - (i % pixels_per_byte) as u8 * bits;
            byte |= (idx & mask) << shift;

            if (i % pixels_per_byte) == pixels_per_byte - 1 || i == row.len() - 1 {
                packed.push(byte);
                byte = 0;
            }
        }
    }

    packed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pack_two_bit_rows() {
        // 5 pixels per row: two bytes, the second padded with zeros.
        let packed = pack_nbits(&[0, 1, 2, 3, 1, 3, 3, 3, 3, 3], 5, 2);
        assert_eq!(packed, vec![0b00_01_10_11, 0b01_000000, 0xff, 0b11_000000]);
    }

    #[test]
    fn test_index_colors_rejects_transparency() {
        let image = PixelBuffer::filled(2, 2, [10, 20, 30, 128]);
        assert!(index_colors(&image).is_none());
    }

    #[test]
    fn test_index_colors_in_first_seen_order() {
        let image = PixelBuffer::from_fn(3, 1, |x, _| match x {
            0 => [255, 255, 255, 255],
            1 => [0, 0, 0, 255],
            _ => [255, 255, 255, 255],
        });
        let (plte, indices) = index_colors(&image).unwrap();
        assert_eq!(plte, vec![255, 255, 255, 0, 0, 0]);
        assert_eq!(indices, vec![0, 1, 0]);
    }

    #[test]
    fn test_too_many_colors_falls_back_to_rgba() {
        let image = PixelBuffer::from_fn(32, 16, |x, y| [(x * 8) as u8, (y * 16) as u8, 0, 255]);
        assert!(index_colors(&image).is_none(), "512 colors cannot be indexed");
        let decoded = decode_png(&encode_png(&image).unwrap()).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_png(b"not a png"),
            Err(ImageError::PngDecode(_))
        ));
    }
}
