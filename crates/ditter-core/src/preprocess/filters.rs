//! Separable box blur and unsharp "depth".

/// Box blur with edge clamping, horizontal then vertical.
pub fn box_blur(pixels: &[[f32; 3]], width: usize, height: usize, radius: usize) -> Vec<[f32; 3]> {
    if radius == 0 || pixels.is_empty() {
        return pixels.to_vec();
    }
    let horizontal = blur_pass(pixels, width, height, radius, true);
    blur_pass(&horizontal, width, height, radius, false)
}

fn blur_pass(
    src: &[[f32; 3]],
    width: usize,
    height: usize,
    radius: usize,
    horizontal: bool,
) -> Vec<[f32; 3]> {
    let (len, lines) = if horizontal {
        (width, height)
    } else {
        (height, width)
    };
    let at = |line: usize, i: usize| {
        if horizontal {
            line * width + i
        } else {
            i * width + line
        }
    };
    let window = (2 * radius + 1) as f32;
    let last = len - 1;
    let mut out = vec![[0.0f32; 3]; src.len()];

    for line in 0..lines {
        // Running sum over the clamped window centered on index 0.
        let mut sum = [0.0f32; 3];
        for k in 0..=2 * radius {
            let i = k.saturating_sub(radius).min(last);
            let p = src[at(line, i)];
            for c in 0..3 {
                sum[c] += p[c];
            }
        }
        for i in 0..len {
            out[at(line, i)] = sum.map(|s| s / window);
            let leaving = src[at(line, i.saturating_sub(radius))];
            let entering = src[at(line, (i + radius + 1).min(last))];
            for c in 0..3 {
                sum[c] += entering[c] - leaving[c];
            }
        }
    }
    out
}

/// `out = in + (in - blurred) * amount`, clamped to `0..=255`.
pub fn unsharp(pixels: &[[f32; 3]], blurred: &[[f32; 3]], amount: f32) -> Vec<[f32; 3]> {
    pixels
        .iter()
        .zip(blurred)
        .map(|(p, b)| {
            [
                (p[0] + (p[0] - b[0]) * amount).clamp(0.0, 255.0),
                (p[1] + (p[1] - b[1]) * amount).clamp(0.0, 255.0),
                (p[2] + (p[2] - b[2]) * amount).clamp(0.0, 255.0),
            ]
        })
        .collect()
}
