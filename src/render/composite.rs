use crate::foundation::error::{StrataError, StrataResult};
use crate::foundation::math::{mul_div255_u8, opacity_u8};
use crate::render::frame::FrameRGBA;
use std::str::FromStr;

/// Per-layer blending mode applied when compositing onto the background.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Porter-Duff source-over.
    #[default]
    Normal,
    /// `s * d`
    Multiply,
    /// `s + d - s * d`
    Screen,
    /// Hard light with layers swapped.
    Overlay,
    /// `min(s, d)`
    Darken,
    /// `max(s, d)`
    Lighten,
    /// `d / (1 - s)`
    ColorDodge,
    /// `1 - (1 - d) / s`
    ColorBurn,
    /// W3C soft light.
    SoftLight,
    /// Multiply or screen depending on the source.
    HardLight,
    /// `|d - s|`
    Difference,
    /// `d + s - 2 * d * s`
    Exclusion,
}

impl BlendMode {
    pub(crate) fn tag(self) -> u8 {
        self as u8
    }
}

impl FromStr for BlendMode {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "normal" => Self::Normal,
            "multiply" => Self::Multiply,
            "screen" => Self::Screen,
            "overlay" => Self::Overlay,
            "darken" => Self::Darken,
            "lighten" => Self::Lighten,
            "color_dodge" => Self::ColorDodge,
            "color_burn" => Self::ColorBurn,
            "soft_light" => Self::SoftLight,
            "hard_light" => Self::HardLight,
            "difference" => Self::Difference,
            "exclusion" => Self::Exclusion,
            other => return Err(StrataError::invalid(format!("unknown blend mode '{other}'"))),
        })
    }
}

/// Composite `fg` onto `bg` with its top-left corner at `position` (background pixel space).
///
/// Placements partially or fully outside the background are clipped; a fully clipped
/// foreground leaves `bg` untouched. Both frames must be premultiplied RGBA8.
pub fn alpha_composite(
    bg: &mut FrameRGBA,
    fg: &FrameRGBA,
    position: (i32, i32),
    opacity: f32,
    blend: BlendMode,
) -> StrataResult<()> {
    bg.validate()?;
    fg.validate()?;
    if !bg.premultiplied || !fg.premultiplied {
        return Err(StrataError::evaluation(
            "alpha_composite expects premultiplied rgba8 frames",
        ));
    }
    if opacity_u8(opacity) == 0 && blend == BlendMode::Normal {
        return Ok(());
    }

    // Blend dispatch happens once per composite, never per pixel.
    match blend {
        BlendMode::Normal => for_each_row(bg, fg, position, |d, s| over_row(d, s, opacity)),
        BlendMode::Multiply => {
            for_each_row(bg, fg, position, |d, s| blend_row(d, s, opacity, |s, d| s * d))
        }
        BlendMode::Screen => for_each_row(bg, fg, position, |d, s| {
            blend_row(d, s, opacity, |s, d| s + d - s * d)
        }),
        BlendMode::Overlay => for_each_row(bg, fg, position, |d, s| {
            blend_row(d, s, opacity, |s, d| {
                if d <= 0.5 {
                    2.0 * s * d
                } else {
                    1.0 - 2.0 * (1.0 - s) * (1.0 - d)
                }
            })
        }),
        BlendMode::Darken => {
            for_each_row(bg, fg, position, |d, s| blend_row(d, s, opacity, f32::min))
        }
        BlendMode::Lighten => {
            for_each_row(bg, fg, position, |d, s| blend_row(d, s, opacity, f32::max))
        }
        BlendMode::ColorDodge => for_each_row(bg, fg, position, |d, s| {
            blend_row(d, s, opacity, |s, d| {
                if s >= 1.0 {
                    1.0
                } else {
                    (d / (1.0 - s)).min(1.0)
                }
            })
        }),
        BlendMode::ColorBurn => for_each_row(bg, fg, position, |d, s| {
            blend_row(d, s, opacity, |s, d| {
                if s <= 0.0 {
                    0.0
                } else {
                    1.0 - ((1.0 - d) / s).min(1.0)
                }
            })
        }),
        BlendMode::SoftLight => for_each_row(bg, fg, position, |d, s| {
            blend_row(d, s, opacity, |s, d| {
                if s <= 0.5 {
                    d - (1.0 - 2.0 * s) * d * (1.0 - d)
                } else {
                    let g = if d <= 0.25 {
                        ((16.0 * d - 12.0) * d + 4.0) * d
                    } else {
                        d.sqrt()
                    };
                    d + (2.0 * s - 1.0) * (g - d)
                }
            })
        }),
        BlendMode::HardLight => for_each_row(bg, fg, position, |d, s| {
            blend_row(d, s, opacity, |s, d| {
                if s <= 0.5 {
                    2.0 * s * d
                } else {
                    1.0 - 2.0 * (1.0 - s) * (1.0 - d)
                }
            })
        }),
        BlendMode::Difference => {
            for_each_row(bg, fg, position, |d, s| blend_row(d, s, opacity, |s, d| (d - s).abs()))
        }
        BlendMode::Exclusion => for_each_row(bg, fg, position, |d, s| {
            blend_row(d, s, opacity, |s, d| d + s - 2.0 * d * s)
        }),
    }
    Ok(())
}

/// Visit the overlapping rows of `bg` and `fg` placed at `position`.
fn for_each_row<F>(bg: &mut FrameRGBA, fg: &FrameRGBA, position: (i32, i32), mut row_fn: F)
where
    F: FnMut(&mut [u8], &[u8]),
{
    let (px, py) = (i64::from(position.0), i64::from(position.1));
    let (bw, bh) = (i64::from(bg.width), i64::from(bg.height));
    let (fw, fh) = (i64::from(fg.width), i64::from(fg.height));

    let x0 = px.max(0);
    let x1 = (px + fw).min(bw);
    let y0 = py.max(0);
    let y1 = (py + fh).min(bh);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let span = ((x1 - x0) * 4) as usize;
    for y in y0..y1 {
        let d_start = ((y * bw + x0) * 4) as usize;
        let s_start = (((y - py) * fw + (x0 - px)) * 4) as usize;
        row_fn(
            &mut bg.data[d_start..d_start + span],
            &fg.data[s_start..s_start + span],
        );
    }
}

fn over_row(dst: &mut [u8], src: &[u8], opacity: f32) {
    let op = opacity_u8(opacity);
    if op == 0 {
        return;
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = mul_div255_u8(u16::from(s[3]), op);
        if sa == 0 {
            continue;
        }
        let inv = 255u16 - u16::from(sa);

        d[3] = sa.saturating_add(mul_div255_u8(u16::from(d[3]), inv));
        for c in 0..3 {
            let sc = mul_div255_u8(u16::from(s[c]), op);
            let dc = mul_div255_u8(u16::from(d[c]), inv);
            d[c] = sc.saturating_add(dc);
        }
    }
}

#[inline(always)]
fn blend_row<F>(dst: &mut [u8], src: &[u8], opacity: f32, blend_fn: F)
where
    F: Fn(f32, f32) -> f32,
{
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        // out_a = sa + da * (1 - sa)
        // out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da
        let sa = (f32::from(s[3]) / 255.0) * opacity;
        if sa <= 0.0 {
            continue;
        }
        let da = f32::from(d[3]) / 255.0;
        let out_a = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);

        for c in 0..3 {
            let sp = (f32::from(s[c]) / 255.0) * opacity;
            let dp = f32::from(d[c]) / 255.0;
            let sc = (sp / sa).clamp(0.0, 1.0);
            let dc = if da > 0.0 { (dp / da).clamp(0.0, 1.0) } else { 0.0 };
            let b = blend_fn(sc, dc).clamp(0.0, 1.0);
            let out_p = (sp * (1.0 - da) + dp * (1.0 - sa) + b * sa * da).clamp(0.0, 1.0);
            d[c] = (out_p * 255.0).round() as u8;
        }
        d[3] = (out_a * 255.0).round() as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
