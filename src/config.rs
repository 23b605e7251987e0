//! Runtime configuration read by the core at startup.
//!
//! A small `serde`-derived struct with a `Default` impl, loadable from a
//! TOML file on disk. The core never parses `argv` itself — a host binary is
//! expected to hand it a `RuntimeConfig`, e.g. after its own CLI parsing.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::generation::GenConfig;

/// Top-level runtime knobs a host binary hands to the core at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Terrain seed, forwarded to the generator.
    pub seed: i64,
    /// `r0`: radius (in chunks) kept at LOD_0.
    pub render_distance_chunks: u32,
    /// `r1`: radius at which chunks step from LOD_1 to LOD_2.
    pub lod_threshold_chunks: u32,
    /// `r_max`: farthest radius a chunk may remain loaded at any LOD.
    pub max_render_distance_chunks: u32,
    /// Directory handed to the persistence adapter.
    pub save_dir: PathBuf,
    /// Named generation config bundle; unknown names fall back to `"default"`.
    pub gen_preset: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            render_distance_chunks: 8,
            lod_threshold_chunks: 12,
            max_render_distance_chunks: 40,
            save_dir: PathBuf::from("./save"),
            gen_preset: "default".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load and parse a TOML config file, falling back to field defaults
    /// for anything the file omits (`#[serde(default)]` on the struct).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// `r2`, the LOD_2/LOD_3 boundary, derived as the midpoint between
    /// `lod_threshold_chunks` and `max_render_distance_chunks`.
    pub fn far_lod_threshold_chunks(&self) -> u32 {
        self.lod_threshold_chunks + (self.max_render_distance_chunks - self.lod_threshold_chunks) / 2
    }

    /// Resolve `gen_preset` into a concrete generator config. Unknown preset
    /// names fall back to the default bundle and log a warning; resolution
    /// happens once here, not per-chunk.
    pub fn resolve_gen_config(&self) -> GenConfig {
        let mut config = match self.gen_preset.as_str() {
            "default" => GenConfig::default(),
            "flat" => GenConfig::flat_preset(),
            "islands" => GenConfig::islands_preset(),
            "caves" => GenConfig::caves_preset(),
            other => {
                log::warn!("unknown gen_preset '{other}', falling back to 'default'");
                GenConfig::default()
            }
        };
        config.seed = self.seed;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_internally_consistent() {
        let config = RuntimeConfig::default();
        assert!(config.render_distance_chunks < config.lod_threshold_chunks);
        assert!(config.lod_threshold_chunks < config.max_render_distance_chunks);
    }

    #[test]
    fn far_lod_threshold_is_midpoint() {
        let config = RuntimeConfig {
            lod_threshold_chunks: 12,
            max_render_distance_chunks: 40,
            ..Default::default()
        };
        assert_eq!(config.far_lod_threshold_chunks(), 26);
    }

    #[test]
    fn load_parses_partial_toml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "seed = 1234\nrender_distance_chunks = 6\n").unwrap();

        let config = RuntimeConfig::load(&path).unwrap();
        assert_eq!(config.seed, 1234);
        assert_eq!(config.render_distance_chunks, 6);
        // everything else falls back to Default
        assert_eq!(config.gen_preset, "default");
    }

    #[test]
    fn unknown_preset_falls_back_to_default() {
        let config = RuntimeConfig {
            gen_preset: "nonexistent".to_string(),
            ..Default::default()
        };
        let resolved = config.resolve_gen_config();
        assert_eq!(resolved.sea_level, GenConfig::default().sea_level);
    }
}
