//! The compositing loop: each fragment gets a horizontal slice of the
//! canvas, laid out right to left in descending size order so larger
//! fragments sit behind smaller ones.

use kurbo::{Affine, Rect};

use crate::{
    error::FragmentaResult,
    layout,
    model::{Fragment, FragmentSet},
    noise,
    rng::RandomStream,
    surface::{BlendMode, Surface},
};

/// Renders the fragment set onto `surface` as clipped, textured, rotated
/// slices. Caller guarantees a non-empty, validated set (the orchestrator
/// enforces this).
pub fn composite(
    surface: &mut Surface,
    fragments: &FragmentSet,
    random: &mut dyn RandomStream,
) -> FragmentaResult<()> {
    let sorted = fragments.sorted_by_size_desc();
    let slice_width = layout::slice_width(surface.width(), sorted.len());
    let mut position_x = f64::from(surface.width());

    for fragment in sorted {
        position_x -= slice_width;
        draw_fragment(surface, fragment, position_x, slice_width, random)?;
    }
    Ok(())
}

fn draw_fragment(
    surface: &mut Surface,
    fragment: &Fragment,
    position_x: f64,
    slice_width: f64,
    random: &mut dyn RandomStream,
) -> FragmentaResult<()> {
    let attrs = &fragment.attributes;
    let canvas_w = surface.width();
    let canvas_h = surface.height();

    let (frag_w, frag_h) =
        layout::clamped_display_size(attrs.display_width, attrs.display_height, canvas_w);
    let position_y = layout::vertical_position(canvas_h, attrs.energy);
    tracing::debug!(position_x, position_y, frag_w, frag_h, "placing fragment");

    surface.save();
    surface.translate(position_x, position_y);

    let clip_rotate = (random.next() - 0.5) * layout::CLIP_ROTATE_RANGE;
    surface.rotate(clip_rotate);

    let clip = layout::slice_clip_path(slice_width, canvas_w, canvas_h, position_x, position_y);
    surface.clip_path(&clip);

    surface.fill_clip(attrs.fill_color()?);

    // The quarter-resolution noise modulates the palette fill's lightness.
    // It is drawn in device space stretched over the whole canvas, with the
    // clip still active, before the fragment artwork lands on top.
    let quarter_w = (canvas_w / 4).max(1);
    let quarter_h = (canvas_h / 4).max(1);
    let mut texture = Surface::new(quarter_w, quarter_h)?;
    noise::synthesize(&mut texture, random)?;
    let texture = texture.to_bitmap()?;

    surface.save();
    surface.set_transform(Affine::IDENTITY);
    surface.set_blend(BlendMode::Luminosity);
    surface.draw_bitmap(
        &texture,
        Rect::new(0.0, 0.0, f64::from(quarter_w), f64::from(quarter_h)),
        Rect::new(0.0, 0.0, f64::from(canvas_w), f64::from(canvas_h)),
    );
    surface.restore();

    surface.translate(frag_w / 3.0, 0.0);
    surface.rotate(attrs.direction);
    surface.translate(-frag_w / 2.0, -frag_h / 2.0);

    let shift_x = (random.next() - 0.5) * frag_w * layout::SHIFT_JITTER_SCALE;
    let shift_y = (random.next() - 0.5) * frag_h * layout::SHIFT_JITTER_SCALE;
    surface.translate(shift_x, shift_y);

    surface.draw_bitmap(
        &fragment.image,
        Rect::new(
            0.0,
            0.0,
            f64::from(fragment.image.width()),
            f64::from(fragment.image.height()),
        ),
        Rect::new(0.0, 0.0, frag_w, frag_h),
    );

    surface.restore();
    Ok(())
}

/// Random values the compositing loop consumes for a given canvas size and
/// fragment count: per fragment, one clip jitter, the quarter-resolution
/// noise synthesis, and two draw-position jitters.
pub fn random_call_count(canvas_width: u32, canvas_height: u32, fragment_count: usize) -> u64 {
    let quarter_w = (canvas_width / 4).max(1);
    let quarter_h = (canvas_height / 4).max(1);
    let per_fragment = 1 + noise::random_call_count(quarter_w, quarter_h) + 2;
    fragment_count as u64 * per_fragment
}
