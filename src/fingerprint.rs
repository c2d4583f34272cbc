use crate::surface::Surface;

/// 128-bit content fingerprint of a rendered surface. Lets tests and the
/// CLI compare renders without shipping golden pixel buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceFingerprint {
    pub hi: u64,
    pub lo: u64,
}

pub fn fingerprint_surface(surface: &Surface) -> SurfaceFingerprint {
    let mut a = Fnv1a64::new(0xcbf29ce484222325);
    let mut b = Fnv1a64::new(0x9ae16a3b2f90404f);

    for h in [&mut a, &mut b] {
        h.write_u64(u64::from(surface.width()));
        h.write_u64(u64::from(surface.height()));
        h.write_bytes(surface.data());
    }

    SurfaceFingerprint {
        hi: a.finish(),
        lo: b.finish(),
    }
}

#[derive(Clone, Copy)]
struct Fnv1a64(u64);

impl Fnv1a64 {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        self.0 = h;
    }

    fn finish(self) -> u64 {
        self.0
    }
}
