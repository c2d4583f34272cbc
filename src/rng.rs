/// A deterministic stream of floats in `[0, 1)`.
///
/// The renderer consumes values in a fixed, documented order and never seeds
/// or re-seeds the stream; reproducibility is the supplier's responsibility.
pub trait RandomStream {
    fn next(&mut self) -> f64;
}

impl<T: RandomStream + ?Sized> RandomStream for &mut T {
    fn next(&mut self) -> f64 {
        (**self).next()
    }
}

/// Splitmix64-backed [`RandomStream`].
///
/// Hosts derive one stream per (seed, iteration) pair so that every iteration
/// of a collage renders a distinct but reproducible draw sequence.
#[derive(Clone, Copy, Debug)]
pub struct SeededStream {
    state: u64,
}

impl SeededStream {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn for_iteration(seed: u64, iteration: u64) -> Self {
        Self::new(seed ^ mix64(iteration.wrapping_add(0x9E37_79B9_7F4A_7C15)))
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        mix64(self.state)
    }
}

impl RandomStream for SeededStream {
    fn next(&mut self) -> f64 {
        // 53 high bits, the exact spacing of representable doubles in [0,1).
        (self.next_u64() >> 11) as f64 * (1.0 / 9_007_199_254_740_992.0)
    }
}

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
