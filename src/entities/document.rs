//! Wire formats: animation documents and animation-set manifests
//!
//! Animation document (one per scene):
//! ```json
//! { "compData": [ [ [ [ {"x":0,"y":0,"z":0}, ... ] ] ] ] }
//! ```
//! nesting is clips -> frames -> vertex groups -> points.
//!
//! Manifest (one per animation set), scenes in declaration order:
//! ```json
//! { "scenes": { "walk": { "url": "walk.json", "scale": 1.5 } } }
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::LoadError;
use super::frame::RawFrame;

/// Parsed animation document: clips of raw frames
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationDocument {
    #[serde(rename = "compData")]
    pub clips: Vec<Vec<RawFrame>>,
}

impl AnimationDocument {
    /// Parse and validate a document body.
    ///
    /// A scene needs at least one clip and every clip at least one frame;
    /// anything else is reported as `ParseFailed`.
    pub fn parse(body: &str) -> Result<Self, LoadError> {
        let doc: AnimationDocument = serde_json::from_str(body)
            .map_err(|e| LoadError::ParseFailed(format!("JSON parsing failed: {}", e)))?;

        if doc.clips.is_empty() {
            return Err(LoadError::ParseFailed("document has no clips".to_string()));
        }
        if let Some(i) = doc.clips.iter().position(Vec::is_empty) {
            return Err(LoadError::ParseFailed(format!("clip {} has no frames", i)));
        }
        Ok(doc)
    }

    /// Frame count per clip
    pub fn shape(&self) -> Vec<usize> {
        self.clips.iter().map(Vec::len).collect()
    }

    pub fn frame_count(&self) -> usize {
        self.clips.iter().map(Vec::len).sum()
    }
}

/// One scene of an animation set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntry {
    pub url: String,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

impl SceneEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            scale: 1.0,
        }
    }
}

/// Ordered, named list of scene locators
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationSet {
    pub scenes: IndexMap<String, SceneEntry>,
}

impl AnimationSet {
    pub fn parse(body: &str) -> Result<Self, LoadError> {
        serde_json::from_str(body)
            .map_err(|e| LoadError::ParseFailed(format!("manifest parsing failed: {}", e)))
    }

    /// Build a set from bare file locators, named by file stem.
    pub fn from_locators<I, S>(locators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut scenes = IndexMap::new();
        for (i, url) in locators.into_iter().enumerate() {
            let url = url.into();
            let name = Path::new(&url)
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("scene{}", i));
            // Same stem twice: keep both, suffix the later one
            let name = if scenes.contains_key(&name) {
                format!("{}_{}", name, i)
            } else {
                name
            };
            scenes.insert(name, SceneEntry::new(url));
        }
        Self { scenes }
    }

    /// Append `other`'s scenes after ours; clashing names get a numeric suffix.
    pub fn merge(&mut self, other: AnimationSet) {
        for (name, entry) in other.scenes {
            let mut key = name.clone();
            let mut n = 2;
            while self.scenes.contains_key(&key) {
                key = format!("{}_{}", name, n);
                n += 1;
            }
            self.scenes.insert(key, entry);
        }
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn entries(&self) -> Vec<SceneEntry> {
        self.scenes.values().cloned().collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.scenes.keys().cloned().collect()
    }
}
