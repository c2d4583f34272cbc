pub type PremulRgba8 = [u8; 4];

/// Source-over in premultiplied space.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Additive ("plus") compositing in premultiplied space, saturating per
/// channel. The noise octave accumulation layers crops with this.
pub fn plus(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;

    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = add_sat_u8(dst[i], mul_div255(u16::from(src[i]), op));
    }
    out
}

/// Luminosity blend (compositing-1 non-separable mode): the source's
/// lightness replaces the destination's while hue and saturation stay put,
/// then the blended color is composited source-over with the source alpha.
pub fn luminosity(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    let sa = f32::from(src[3]) / 255.0 * opacity;
    if sa <= 0.0 {
        return dst;
    }
    let da = f32::from(dst[3]) / 255.0;

    let cs = unpremul_f32(src);
    let cb = unpremul_f32(dst);
    let blended = set_lum(cb, lum(cs));

    let ao = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for i in 0..3 {
        let co = sa * (1.0 - da) * cs[i] + sa * da * blended[i] + (1.0 - sa) * da * cb[i];
        out[i] = to_u8(co);
    }
    out[3] = to_u8(ao);
    out
}

fn lum(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let d = l - lum(c);
    clip_color([c[0] + d, c[1] + d, c[2] + d])
}

fn clip_color(c: [f32; 3]) -> [f32; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 {
        for v in &mut out {
            *v = l + (*v - l) * l / (l - n);
        }
    }
    if x > 1.0 {
        for v in &mut out {
            *v = l + (*v - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

fn unpremul_f32(px: PremulRgba8) -> [f32; 3] {
    if px[3] == 0 {
        return [0.0; 3];
    }
    let a = f32::from(px[3]);
    [
        f32::from(px[0]) / a,
        f32::from(px[1]) / a,
        f32::from(px[2]) / a,
    ]
}

fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_opacity_0_is_noop() {
        let dst = [1, 2, 3, 4];
        let src = [200, 200, 200, 200];
        assert_eq!(over(dst, src, 0.0), dst);
    }

    #[test]
    fn over_src_alpha_0_is_noop() {
        let dst = [10, 20, 30, 40];
        let src = [255, 255, 255, 0];
        assert_eq!(over(dst, src, 1.0), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let dst = [0, 0, 0, 255];
        let src = [255, 0, 0, 255];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn over_dst_transparent_returns_scaled_src() {
        let dst = [0, 0, 0, 0];
        let src = [100, 110, 120, 200];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn plus_adds_and_saturates() {
        let dst = [200, 10, 0, 100];
        let src = [100, 10, 0, 200];
        assert_eq!(plus(dst, src, 1.0), [255, 20, 0, 255]);
    }

    #[test]
    fn plus_scales_source_by_opacity() {
        let dst = [0, 0, 0, 0];
        let src = [100, 50, 20, 255];
        let out = plus(dst, src, 0.5);
        assert!(out[0].abs_diff(50) <= 1);
        assert!(out[1].abs_diff(25) <= 1);
        assert!(out[2].abs_diff(10) <= 1);
    }

    #[test]
    fn luminosity_of_gray_over_gray_tracks_source_lightness() {
        let dst = [100, 100, 100, 255];
        let src = [200, 200, 200, 255];
        let out = luminosity(dst, src, 1.0);
        assert_eq!(out[3], 255);
        assert!(out[0].abs_diff(200) <= 1);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
    }

    #[test]
    fn luminosity_preserves_destination_hue_ordering() {
        // Red-dominant destination keeps its channel ordering after a gray
        // source changes only its lightness.
        let dst = [200, 50, 50, 255];
        let src = [120, 120, 120, 255];
        let out = luminosity(dst, src, 1.0);
        assert!(out[0] > out[1]);
        assert_eq!(out[1], out[2]);
    }

    #[test]
    fn luminosity_zero_source_alpha_is_noop() {
        let dst = [10, 20, 30, 40];
        assert_eq!(luminosity(dst, [255, 255, 255, 0], 1.0), dst);
    }
}
