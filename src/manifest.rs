//! JSON scene manifests: the host-side description the CLI renders from.
//!
//! Attribute keys are camelCase and palette entries are `#RRGGBB` strings,
//! matching the attribute records the hosting platform hands to sketches.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    error::{FragmentaError, FragmentaResult},
    model::{Fragment, FragmentAttributes, FragmentSet, parse_hex_color},
    surface::Bitmap,
};

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneManifest {
    pub canvas: CanvasSize,
    pub seed: u64,
    #[serde(default)]
    pub iteration: u64,
    pub fragments: Vec<ManifestFragment>,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ManifestFragment {
    /// Image path, resolved relative to the manifest file.
    pub image: PathBuf,
    pub attributes: ManifestAttributes,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestAttributes {
    pub size: f64,
    pub width: f64,
    pub height: f64,
    pub display_width: f64,
    pub display_height: f64,
    pub width_to_height_ratio: f64,
    pub direction: f64,
    pub energy: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub influence: f64,
    pub colors: Vec<String>,
}

impl SceneManifest {
    pub fn load(path: &Path) -> FragmentaResult<Self> {
        let file = File::open(path)
            .map_err(|e| FragmentaError::manifest(format!("open '{}': {e}", path.display())))?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader(reader: impl std::io::Read) -> FragmentaResult<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| FragmentaError::manifest(format!("parse scene manifest: {e}")))
    }

    /// Decodes every fragment image and builds the validated set.
    pub fn build_fragment_set(&self, base_dir: &Path) -> FragmentaResult<FragmentSet> {
        let mut fragments = Vec::with_capacity(self.fragments.len());
        for entry in &self.fragments {
            let path = base_dir.join(&entry.image);
            let decoded = image::open(&path)
                .map_err(|e| {
                    FragmentaError::manifest(format!("decode image '{}': {e}", path.display()))
                })?
                .to_rgba8();
            let (w, h) = decoded.dimensions();
            let bitmap = Bitmap::from_straight_rgba8(w, h, decoded.as_raw())?;
            fragments.push(Fragment::new(
                Arc::new(bitmap),
                entry.attributes.to_attributes()?,
            )?);
        }
        FragmentSet::new(fragments)
    }
}

impl ManifestAttributes {
    pub fn to_attributes(&self) -> FragmentaResult<FragmentAttributes> {
        let colors = self
            .colors
            .iter()
            .map(|s| parse_hex_color(s))
            .collect::<FragmentaResult<Vec<_>>>()?;
        let attributes = FragmentAttributes {
            size: self.size,
            width: self.width,
            height: self.height,
            display_width: self.display_width,
            display_height: self.display_height,
            width_to_height_ratio: self.width_to_height_ratio,
            direction: self.direction,
            energy: self.energy,
            speed: self.speed,
            influence: self.influence,
            colors,
        };
        attributes.validate()?;
        Ok(attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rgba8Premul;

    const SCENE: &str = r##"{
        "canvas": { "width": 400, "height": 300 },
        "seed": 12345,
        "iteration": 2,
        "fragments": [
            {
                "image": "leaf.png",
                "attributes": {
                    "size": 0.8,
                    "width": 0.8,
                    "height": 0.4,
                    "displayWidth": 120.0,
                    "displayHeight": 60.0,
                    "widthToHeightRatio": 0.5,
                    "direction": 1.2,
                    "energy": 0.9,
                    "speed": 0.3,
                    "influence": 0.1,
                    "colors": ["#FFFFFF", "#3400FF", "#1EA05A", "#000000", "#808080"]
                }
            }
        ]
    }"##;

    #[test]
    fn parses_camel_case_scene() {
        let manifest = SceneManifest::from_reader(SCENE.as_bytes()).unwrap();
        assert_eq!(manifest.canvas.width, 400);
        assert_eq!(manifest.iteration, 2);
        let attrs = manifest.fragments[0].attributes.to_attributes().unwrap();
        assert_eq!(attrs.display_width, 120.0);
        assert_eq!(
            attrs.fill_color().unwrap(),
            Rgba8Premul::from_straight_rgba(0x1E, 0xA0, 0x5A, 255)
        );
    }

    #[test]
    fn iteration_defaults_to_zero() {
        let scene = SCENE.replace("\"iteration\": 2,", "");
        let manifest = SceneManifest::from_reader(scene.as_bytes()).unwrap();
        assert_eq!(manifest.iteration, 0);
    }

    #[test]
    fn bad_color_is_reported() {
        let scene = SCENE.replace("#3400FF", "#QQQQQQ");
        let manifest = SceneManifest::from_reader(scene.as_bytes()).unwrap();
        let err = manifest.fragments[0].attributes.to_attributes().unwrap_err();
        assert!(err.to_string().contains("malformed palette color"));
    }

    #[test]
    fn parse_error_names_the_manifest() {
        let err = SceneManifest::from_reader("{".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("manifest"));
    }
}
