use crate::foundation::core::Affine;
use crate::render::frame::FrameRGBA;

/// Warp `src` into a `width x height` buffer through `matrix` (source -> destination pixels).
///
/// Sampling is bilinear with pixel centers on integer coordinates; samples falling outside the
/// source read as transparent. A non-invertible matrix yields a transparent buffer.
pub(crate) fn warp_affine_bilinear(
    src: &FrameRGBA,
    matrix: Affine,
    width: u32,
    height: u32,
) -> FrameRGBA {
    let mut out = FrameRGBA::transparent(width, height);
    let det = matrix.determinant();
    if src.is_empty() || width == 0 || height == 0 || det == 0.0 || !det.is_finite() {
        return out;
    }

    let [a, b, c, d, e, f] = matrix.inverse().as_coeffs();
    let row_bytes = (width as usize) * 4;
    for (y, row) in out.data.chunks_exact_mut(row_bytes).enumerate() {
        let yf = y as f64;
        let base_x = c * yf + e;
        let base_y = d * yf + f;
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let xf = x as f64;
            let sx = a * xf + base_x;
            let sy = b * xf + base_y;
            px.copy_from_slice(&sample_bilinear(src, sx, sy));
        }
    }
    out
}

fn sample_bilinear(src: &FrameRGBA, sx: f64, sy: f64) -> [u8; 4] {
    let (w, h) = (f64::from(src.width), f64::from(src.height));
    if !(sx > -1.0 && sy > -1.0 && sx < w && sy < h) {
        return [0, 0, 0, 0];
    }

    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = (sx - x0) as f32;
    let fy = (sy - y0) as f32;
    let (x0, y0) = (x0 as i32, y0 as i32);

    let p00 = sample_px(src, x0, y0);
    let p10 = sample_px(src, x0 + 1, y0);
    let p01 = sample_px(src, x0, y0 + 1);
    let p11 = sample_px(src, x0 + 1, y0 + 1);

    let w00 = (1.0 - fx) * (1.0 - fy);
    let w10 = fx * (1.0 - fy);
    let w01 = (1.0 - fx) * fy;
    let w11 = fx * fy;

    let mut out = [0u8; 4];
    for i in 0..4 {
        let v = f32::from(p00[i]) * w00
            + f32::from(p10[i]) * w10
            + f32::from(p01[i]) * w01
            + f32::from(p11[i]) * w11;
        out[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn sample_px(src: &FrameRGBA, x: i32, y: i32) -> [u8; 4] {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return [0, 0, 0, 0];
    }
    let idx = ((y as usize) * (src.width as usize) + (x as usize)) * 4;
    [
        src.data[idx],
        src.data[idx + 1],
        src.data[idx + 2],
        src.data[idx + 3],
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/render/warp.rs"]
mod tests;
