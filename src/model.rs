use std::sync::Arc;

use crate::{
    core::Rgba8Premul,
    error::{FragmentaError, FragmentaResult},
    surface::Bitmap,
};

/// Palette index used for the slice background fill (the third of the five
/// supplied colors).
pub const PALETTE_FILL_INDEX: usize = 2;

/// Normalized visual attributes supplied by the host for one fragment.
///
/// `width`/`height` are normalized so the longer side equals `size`;
/// `display_width`/`display_height` are the precomputed device dimensions.
/// `speed` and `influence` are accepted for interface completeness but do
/// not drive layout.
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentAttributes {
    pub size: f64,
    pub width: f64,
    pub height: f64,
    pub display_width: f64,
    pub display_height: f64,
    pub width_to_height_ratio: f64,
    pub direction: f64,
    pub energy: f64,
    pub speed: f64,
    pub influence: f64,
    pub colors: Vec<Rgba8Premul>,
}

impl FragmentAttributes {
    pub fn validate(&self) -> FragmentaResult<()> {
        unit_range("size", self.size)?;
        unit_range("width", self.width)?;
        unit_range("height", self.height)?;
        unit_range("energy", self.energy)?;
        unit_range("speed", self.speed)?;
        unit_range("influence", self.influence)?;

        if !self.display_width.is_finite() || self.display_width <= 0.0 {
            return Err(FragmentaError::invalid_fragment_set(
                "displayWidth must be finite and > 0",
            ));
        }
        if !self.display_height.is_finite() || self.display_height <= 0.0 {
            return Err(FragmentaError::invalid_fragment_set(
                "displayHeight must be finite and > 0",
            ));
        }
        if !self.width_to_height_ratio.is_finite() || self.width_to_height_ratio <= 0.0 {
            return Err(FragmentaError::invalid_fragment_set(
                "widthToHeightRatio must be finite and > 0",
            ));
        }
        if !self.direction.is_finite()
            || self.direction < 0.0
            || self.direction > std::f64::consts::TAU
        {
            return Err(FragmentaError::invalid_fragment_set(
                "direction must be within [0, 2*pi]",
            ));
        }
        if self.colors.len() <= PALETTE_FILL_INDEX {
            return Err(FragmentaError::invalid_fragment_set(format!(
                "palette must supply at least {} colors, got {}",
                PALETTE_FILL_INDEX + 1,
                self.colors.len()
            )));
        }
        Ok(())
    }

    pub fn fill_color(&self) -> FragmentaResult<Rgba8Premul> {
        self.colors.get(PALETTE_FILL_INDEX).copied().ok_or_else(|| {
            FragmentaError::invalid_fragment_set("palette is missing the fill color entry")
        })
    }
}

/// One image input with its attributes, composed into the collage.
#[derive(Clone, Debug)]
pub struct Fragment {
    pub image: Arc<Bitmap>,
    pub attributes: FragmentAttributes,
}

impl Fragment {
    pub fn new(image: Arc<Bitmap>, attributes: FragmentAttributes) -> FragmentaResult<Self> {
        attributes.validate()?;
        Ok(Self { image, attributes })
    }
}

/// Non-empty ordered sequence of fragments, validated on construction.
#[derive(Clone, Debug)]
pub struct FragmentSet {
    fragments: Vec<Fragment>,
}

impl FragmentSet {
    pub fn new(fragments: Vec<Fragment>) -> FragmentaResult<Self> {
        if fragments.is_empty() {
            return Err(FragmentaError::invalid_fragment_set(
                "fragment list is empty",
            ));
        }
        for fragment in &fragments {
            fragment.attributes.validate()?;
        }
        Ok(Self { fragments })
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Descending by `size`; the sort is stable, so equal sizes keep their
    /// original relative order (layout depends on this).
    pub fn sorted_by_size_desc(&self) -> Vec<&Fragment> {
        let mut sorted: Vec<&Fragment> = self.fragments.iter().collect();
        sorted.sort_by(|a, b| b.attributes.size.total_cmp(&a.attributes.size));
        sorted
    }
}

fn unit_range(name: &str, value: f64) -> FragmentaResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(FragmentaError::invalid_fragment_set(format!(
            "{name} must be within [0, 1], got {value}"
        )));
    }
    Ok(())
}

/// Parses a `#RRGGBB` or `#RRGGBBAA` palette entry.
pub fn parse_hex_color(s: &str) -> FragmentaResult<Rgba8Premul> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    let bad = || FragmentaError::invalid_fragment_set(format!("malformed palette color '{s}'"));
    let byte = |i: usize| -> FragmentaResult<u8> {
        u8::from_str_radix(hex.get(i..i + 2).ok_or_else(bad)?, 16).map_err(|_| bad())
    };
    match hex.len() {
        6 => Ok(Rgba8Premul::from_straight_rgba(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            255,
        )),
        8 => Ok(Rgba8Premul::from_straight_rgba(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            byte(6)?,
        )),
        _ => Err(bad()),
    }
}
