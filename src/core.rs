pub use kurbo::{Affine, BezPath, Ellipse, Point, Rect, Vec2};

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_straight_rgba(self) -> [u8; 4] {
        if self.a == 0 {
            return [0, 0, 0, 0];
        }
        fn unpremul(c: u8, a: u8) -> u8 {
            let c = u32::from(c);
            let a = u32::from(a);
            (((c * 255) + (a / 2)) / a).min(255) as u8
        }
        [
            unpremul(self.r, self.a),
            unpremul(self.g, self.a),
            unpremul(self.b, self.a),
            self.a,
        ]
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_array(px: [u8; 4]) -> Self {
        Self {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premul_of_opaque_is_identity() {
        let c = Rgba8Premul::from_straight_rgba(10, 20, 30, 255);
        assert_eq!(c.to_array(), [10, 20, 30, 255]);
    }

    #[test]
    fn premul_halves_at_half_alpha() {
        let c = Rgba8Premul::from_straight_rgba(200, 100, 0, 128);
        assert_eq!(c.a, 128);
        assert!(c.r.abs_diff(100) <= 1);
        assert!(c.g.abs_diff(50) <= 1);
        assert_eq!(c.b, 0);
    }

    #[test]
    fn straight_roundtrip_is_close() {
        let c = Rgba8Premul::from_straight_rgba(180, 90, 45, 60);
        let s = c.to_straight_rgba();
        assert_eq!(s[3], 60);
        assert!(s[0].abs_diff(180) <= 3);
        assert!(s[1].abs_diff(90) <= 3);
        assert!(s[2].abs_diff(45) <= 3);
    }

    #[test]
    fn zero_alpha_unpremultiplies_to_zero() {
        assert_eq!(Rgba8Premul::transparent().to_straight_rgba(), [0, 0, 0, 0]);
    }
}
