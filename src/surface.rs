use kurbo::{Affine, BezPath, Point, Rect, Shape};

use crate::{
    composite_cpu::{self, PremulRgba8},
    core::Rgba8Premul,
    error::{FragmentaError, FragmentaResult},
};

/// Compositing modes the collage pipeline needs. `Plus` feeds the noise
/// octave accumulation, `Luminosity` the texture pass over palette fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    SourceOver,
    Plus,
    Luminosity,
}

/// Immutable premultiplied-RGBA8 pixel grid, the drawable handle for
/// fragment artwork and noise snapshots.
#[derive(Clone, Debug)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> FragmentaResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| FragmentaError::surface_unavailable("bitmap size overflow"))?;
        if width == 0 || height == 0 {
            return Err(FragmentaError::surface_unavailable(
                "bitmap width/height must be > 0",
            ));
        }
        if data.len() != expected {
            return Err(FragmentaError::surface_unavailable(
                "bitmap data must be width*height*4 bytes",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds from straight-alpha RGBA8 (the layout `image` decodes to).
    pub fn from_straight_rgba8(width: u32, height: u32, data: &[u8]) -> FragmentaResult<Self> {
        let mut premul = Vec::with_capacity(data.len());
        for px in data.chunks_exact(4) {
            let p = Rgba8Premul::from_straight_rgba(px[0], px[1], px[2], px[3]);
            premul.extend_from_slice(&p.to_array());
        }
        Self::from_premul_rgba8(width, height, premul)
    }

    pub fn solid(width: u32, height: u32, color: Rgba8Premul) -> FragmentaResult<Self> {
        let px = color.to_array();
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for _ in 0..(width as usize) * (height as usize) {
            data.extend_from_slice(&px);
        }
        Self::from_premul_rgba8(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied pixel at (x, y); coordinates are clamped to the grid.
    pub fn pixel(&self, x: u32, y: u32) -> PremulRgba8 {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let i = (y * self.width as usize + x) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

#[derive(Clone, Debug)]
struct GState {
    transform: Affine,
    clip: Option<std::sync::Arc<Vec<u8>>>,
    blend: BlendMode,
    alpha: f32,
}

impl Default for GState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            clip: None,
            blend: BlendMode::SourceOver,
            alpha: 1.0,
        }
    }
}

/// A mutable premultiplied-RGBA8 raster with canvas-style graphics state:
/// an affine transform, a clip region, a blend mode and a global alpha,
/// all saved and restored as one unit.
///
/// Rasterization is deliberately unantialiased: coverage is decided at pixel
/// centers with nearest-neighbor sampling, so output is a pure function of
/// the inputs on every platform.
#[derive(Debug)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
    state: GState,
    stack: Vec<GState>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> FragmentaResult<Self> {
        if width == 0 || height == 0 {
            return Err(FragmentaError::surface_unavailable(
                "surface width/height must be > 0",
            ));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| FragmentaError::surface_unavailable("surface size overflow"))?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
            state: GState::default(),
            stack: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Straight-alpha copy of the buffer, for PNG encoding.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            let straight =
                Rgba8Premul::from_array([px[0], px[1], px[2], px[3]]).to_straight_rgba();
            out.extend_from_slice(&straight);
        }
        out
    }

    /// Clears pixels to transparent and resets the whole graphics state.
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.state = GState::default();
        self.stack.clear();
    }

    pub fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    /// Pops the most recent `save`. Unbalanced restores are ignored, as on a
    /// 2D canvas.
    pub fn restore(&mut self) {
        if let Some(prev) = self.stack.pop() {
            self.state = prev;
        }
    }

    pub fn translate(&mut self, x: f64, y: f64) {
        self.state.transform *= Affine::translate((x, y));
    }

    pub fn rotate(&mut self, radians: f64) {
        self.state.transform *= Affine::rotate(radians);
    }

    pub fn set_transform(&mut self, transform: Affine) {
        self.state.transform = transform;
    }

    pub fn transform(&self) -> Affine {
        self.state.transform
    }

    pub fn set_blend(&mut self, blend: BlendMode) {
        self.state.blend = blend;
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    /// Intersects the current clip with `path`, interpreted in local
    /// coordinates under the current transform (nonzero winding).
    pub fn clip_path(&mut self, path: &BezPath) {
        let mut device = path.clone();
        device.apply_affine(self.state.transform);

        let mut mask = vec![0u8; (self.width as usize) * (self.height as usize)];
        let bbox = device.bounding_box();
        let (x0, y0, x1, y1) = self.clamp_bbox(bbox);
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if device.winding(p) != 0 {
                    mask[y * self.width as usize + x] = 255;
                }
            }
        }

        if let Some(existing) = &self.state.clip {
            for (m, e) in mask.iter_mut().zip(existing.iter()) {
                *m = (*m).min(*e);
            }
        }
        self.state.clip = Some(std::sync::Arc::new(mask));
    }

    /// Fills the current clip region (the whole surface when unclipped) with
    /// `color` through the active blend mode and alpha.
    pub fn fill_clip(&mut self, color: Rgba8Premul) {
        let src = color.to_array();
        for y in 0..self.height as usize {
            for x in 0..self.width as usize {
                self.blend_pixel(x, y, src);
            }
        }
    }

    /// Fills `rect` (local coordinates) with `color`.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba8Premul) {
        let mut device = rect.to_path(0.1);
        device.apply_affine(self.state.transform);
        let (x0, y0, x1, y1) = self.clamp_bbox(device.bounding_box());
        let src = color.to_array();
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if device.winding(p) != 0 {
                    self.blend_pixel(x, y, src);
                }
            }
        }
    }

    /// Draws `src_rect` of `bitmap` into `dst_rect` (local coordinates),
    /// nearest-neighbor sampled, through the active transform, clip, blend
    /// mode and alpha.
    pub fn draw_bitmap(&mut self, bitmap: &Bitmap, src_rect: Rect, dst_rect: Rect) {
        if dst_rect.width() <= 0.0 || dst_rect.height() <= 0.0 {
            return;
        }
        if src_rect.width() <= 0.0 || src_rect.height() <= 0.0 {
            return;
        }
        let transform = self.state.transform;
        if transform.determinant().abs() < 1e-12 {
            return;
        }
        let inverse = transform.inverse();

        let mut device = dst_rect.to_path(0.1);
        device.apply_affine(transform);
        let (x0, y0, x1, y1) = self.clamp_bbox(device.bounding_box());

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let local = inverse * p;
                if !dst_rect.contains(local) {
                    continue;
                }
                let u = (local.x - dst_rect.x0) / dst_rect.width();
                let v = (local.y - dst_rect.y0) / dst_rect.height();
                let sx = (src_rect.x0 + u * src_rect.width()).floor();
                let sy = (src_rect.y0 + v * src_rect.height()).floor();
                let sx = sx.clamp(0.0, (bitmap.width() - 1) as f64) as u32;
                let sy = sy.clamp(0.0, (bitmap.height() - 1) as f64) as u32;
                let src = bitmap.pixel(sx, sy);
                self.blend_pixel(x, y, src);
            }
        }
    }

    /// Copies a rectangular region out as a [`Bitmap`]; the region is
    /// clamped to the surface bounds. Zero-size requests are an error.
    pub fn extract(&self, x: u32, y: u32, w: u32, h: u32) -> FragmentaResult<Bitmap> {
        if w == 0 || h == 0 {
            return Err(FragmentaError::surface_unavailable(
                "cannot extract a zero-size region",
            ));
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let w = w.min(self.width - x);
        let h = h.min(self.height - y);
        let mut data = Vec::with_capacity((w as usize) * (h as usize) * 4);
        for row in y..y + h {
            let start = ((row as usize) * (self.width as usize) + x as usize) * 4;
            data.extend_from_slice(&self.data[start..start + (w as usize) * 4]);
        }
        Bitmap::from_premul_rgba8(w, h, data)
    }

    /// Stores a pixel directly, bypassing transform, clip and blending.
    /// The noise base fill writes through this.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba8Premul) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        self.data[i..i + 4].copy_from_slice(&color.to_array());
    }

    pub fn pixel(&self, x: u32, y: u32) -> PremulRgba8 {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let i = (y * self.width as usize + x) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    /// Full-surface snapshot for use as a draw source.
    pub fn to_bitmap(&self) -> FragmentaResult<Bitmap> {
        Bitmap::from_premul_rgba8(self.width, self.height, self.data.clone())
    }

    fn clamp_bbox(&self, bbox: Rect) -> (usize, usize, usize, usize) {
        let x0 = bbox.x0.floor().max(0.0) as usize;
        let y0 = bbox.y0.floor().max(0.0) as usize;
        let x1 = (bbox.x1.ceil().max(0.0) as usize).min(self.width as usize);
        let y1 = (bbox.y1.ceil().max(0.0) as usize).min(self.height as usize);
        (x0, y0, x1.max(x0), y1.max(y0))
    }

    fn blend_pixel(&mut self, x: usize, y: usize, src: PremulRgba8) {
        if let Some(clip) = &self.state.clip
            && clip[y * self.width as usize + x] == 0
        {
            return;
        }
        let i = (y * self.width as usize + x) * 4;
        let dst = [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ];
        let out = match self.state.blend {
            BlendMode::SourceOver => composite_cpu::over(dst, src, self.state.alpha),
            BlendMode::Plus => composite_cpu::plus(dst, src, self.state.alpha),
            BlendMode::Luminosity => composite_cpu::luminosity(dst, src, self.state.alpha),
        };
        self.data[i..i + 4].copy_from_slice(&out);
    }
}
