//! Seeded multi-octave noise synthesis.
//!
//! The texture starts as a per-pixel random gray fill and then accumulates
//! scaled-up crops of itself at doubling block sizes, each composited
//! additively with strength `4/size`. Both the pixel output and the number of
//! values drawn from the random stream are part of the contract: downstream
//! code keeps consuming the same stream, so call order and count must never
//! change.

use kurbo::Affine;

use crate::{
    core::{Rect, Rgba8Premul},
    error::FragmentaResult,
    rng::RandomStream,
    surface::{BlendMode, Surface},
};

/// Alpha of the base noise fill, out of 255.
pub const NOISE_ALPHA: u8 = 60;

/// Number of accumulation passes for a target of the given width: block
/// sizes double from 4 while strictly below `width` (width 64 gives four
/// passes at 4, 8, 16 and 32).
pub fn octave_count(width: u32) -> u32 {
    let mut count = 0;
    let mut size = 4u32;
    while size < width {
        count += 1;
        size *= 2;
    }
    count
}

/// Random values consumed by [`synthesize`] for a target of this size.
pub fn random_call_count(width: u32, height: u32) -> u64 {
    u64::from(width) * u64::from(height) + 2 * u64::from(octave_count(width))
}

/// Fills `target` with reproducible band-limited grayscale noise.
///
/// Draw order: one `random()` per pixel in row-major order for the base
/// fill, then two per octave (x offset, then y offset).
pub fn synthesize(target: &mut Surface, random: &mut dyn RandomStream) -> FragmentaResult<()> {
    let w = target.width();
    let h = target.height();

    for y in 0..h {
        for x in 0..w {
            let gray = (200.0 + random.next() * 55.0) as u8;
            target.put_pixel(
                x,
                y,
                Rgba8Premul::from_straight_rgba(gray, gray, gray, NOISE_ALPHA),
            );
        }
    }

    let full = Rect::new(0.0, 0.0, f64::from(w), f64::from(h));
    let mut size = 4u32;
    while size < w {
        let crop_h = size.min(h);
        let max_x = w - size;
        let max_y = h - crop_h;
        let x = (random.next() * f64::from(max_x)) as u32;
        let y = (random.next() * f64::from(max_y)) as u32;

        let crop = target.extract(x, y, size, crop_h)?;
        target.save();
        target.set_transform(Affine::IDENTITY);
        target.set_blend(BlendMode::Plus);
        target.set_alpha(4.0 / size as f32);
        target.draw_bitmap(
            &crop,
            Rect::new(0.0, 0.0, f64::from(size), f64::from(crop_h)),
            full,
        );
        target.restore();

        size *= 2;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededStream;

    struct Counting<R> {
        inner: R,
        calls: u64,
    }

    impl<R: RandomStream> RandomStream for Counting<R> {
        fn next(&mut self) -> f64 {
            self.calls += 1;
            self.inner.next()
        }
    }

    #[test]
    fn octave_count_boundaries() {
        assert_eq!(octave_count(3), 0);
        assert_eq!(octave_count(4), 0);
        assert_eq!(octave_count(5), 1);
        assert_eq!(octave_count(64), 4);
        assert_eq!(octave_count(65), 5);
    }

    #[test]
    fn consumes_exactly_the_documented_call_count() {
        let mut surface = Surface::new(64, 48).unwrap();
        let mut random = Counting {
            inner: SeededStream::new(1),
            calls: 0,
        };
        synthesize(&mut surface, &mut random).unwrap();
        assert_eq!(random.calls, random_call_count(64, 48));
        assert_eq!(random.calls, 64 * 48 + 2 * 4);
    }

    #[test]
    fn narrow_target_is_base_fill_only() {
        let mut surface = Surface::new(3, 3).unwrap();
        let mut random = Counting {
            inner: SeededStream::new(2),
            calls: 0,
        };
        synthesize(&mut surface, &mut random).unwrap();
        assert_eq!(random.calls, 9);
        for y in 0..3 {
            for x in 0..3 {
                let px = surface.pixel(x, y);
                assert_eq!(px[3], NOISE_ALPHA);
                assert_eq!(px[0], px[1]);
                assert_eq!(px[1], px[2]);
            }
        }
    }

    #[test]
    fn identical_streams_give_identical_textures() {
        let mut a = Surface::new(32, 24).unwrap();
        let mut b = Surface::new(32, 24).unwrap();
        synthesize(&mut a, &mut SeededStream::new(77)).unwrap();
        synthesize(&mut b, &mut SeededStream::new(77)).unwrap();
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn different_streams_give_different_textures() {
        let mut a = Surface::new(32, 24).unwrap();
        let mut b = Surface::new(32, 24).unwrap();
        synthesize(&mut a, &mut SeededStream::new(1)).unwrap();
        synthesize(&mut b, &mut SeededStream::new(2)).unwrap();
        assert_ne!(a.data(), b.data());
    }
}
