//! Render orchestration: one call, one reproducible frame.

use crate::{
    compositor,
    error::{FragmentaError, FragmentaResult},
    model::FragmentSet,
    noise,
    rng::RandomStream,
    surface::Surface,
};

/// Renders one collage frame: validates preconditions, clears the surface,
/// paints the background noise, then runs the compositing loop.
///
/// Mutating `surface` is the only side effect. Rendering is a pure function
/// of (surface size, fragment set, random stream): identical inputs give
/// byte-identical pixels. On any precondition violation the call fails
/// before touching pixels; there are no retries or partial draws.
#[tracing::instrument(skip(surface, fragments, random))]
pub fn render_frame(
    surface: &mut Surface,
    fragments: &FragmentSet,
    random: &mut dyn RandomStream,
) -> FragmentaResult<()> {
    // Surface::new already rejects zero-area buffers, so every reachable
    // surface here has nonzero dimensions.
    if fragments.is_empty() {
        return Err(FragmentaError::invalid_fragment_set(
            "fragment list is empty",
        ));
    }
    for fragment in fragments.fragments() {
        fragment.attributes.validate()?;
    }

    tracing::debug!(
        width = surface.width(),
        height = surface.height(),
        fragments = fragments.len(),
        "rendering frame"
    );

    surface.clear();
    noise::synthesize(surface, random)?;
    compositor::composite(surface, fragments, random)
}

/// Total random values one [`render_frame`] call consumes: the background
/// noise plus the compositing loop. A deterministic function of canvas size
/// and fragment count, usable for contract tests with a counting stub.
pub fn random_call_count(canvas_width: u32, canvas_height: u32, fragment_count: usize) -> u64 {
    noise::random_call_count(canvas_width, canvas_height)
        + compositor::random_call_count(canvas_width, canvas_height, fragment_count)
}
