//! Configuration system
//!
//! Density parameters for the spatial index and the physics engine are
//! construction-time values, so several worlds with different settings can
//! coexist. They can be loaded from TOML or RON files.

use std::path::Path;

pub use serde::{Serialize, Deserialize};

/// On-disk formats a configuration can be stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl Format {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Parse configuration text in the given format
    fn from_str_as(contents: &str, format: Format) -> Result<Self, ConfigError> {
        match format {
            Format::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Format::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Render the configuration in the given format
    fn to_string_as(&self, format: Format) -> Result<String, ConfigError> {
        match format {
            Format::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string())),
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }

    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_as(&contents, format)
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = self.to_string_as(Format::from_path(path)?)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is outside its allowed range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Quadtree density parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadTreeConfig {
    /// Entries a leaf holds before it splits
    pub bucket_size: usize,

    /// Depth at which leaves stop splitting and overflow instead
    pub max_depth: usize,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            bucket_size: 4,
            max_depth: 13,
        }
    }
}

impl QuadTreeConfig {
    /// Check the parameters are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_size == 0 {
            return Err(ConfigError::Invalid("quadtree bucket_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Config for QuadTreeConfig {}

/// Physics engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Parameters of the object index
    pub quadtree: QuadTreeConfig,

    /// Half side of the square searched for neighbours around a moving object
    pub neighbor_window: f32,

    /// Collision events kept between two `step` calls; later ones are dropped
    pub max_collision_events: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            quadtree: QuadTreeConfig::default(),
            neighbor_window: 1.5,
            max_collision_events: 128,
        }
    }
}

impl PhysicsConfig {
    /// Check the parameters are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.quadtree.validate()?;
        if self.neighbor_window.is_nan() || self.neighbor_window <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "neighbor_window must be positive, got {}",
                self.neighbor_window
            )));
        }
        if self.max_collision_events == 0 {
            return Err(ConfigError::Invalid("max_collision_events must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Config for PhysicsConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("tile_engine_{}_{}", std::process::id(), name))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = PhysicsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.quadtree.bucket_size, 4);
        assert_eq!(config.max_collision_events, 128);
    }

    #[test]
    fn test_toml_round_trip() {
        let path = temp_path("physics.toml");
        let config = PhysicsConfig {
            quadtree: QuadTreeConfig { bucket_size: 2, max_depth: 6 },
            neighbor_window: 2.5,
            max_collision_events: 16,
        };

        config.save_to_file(&path).unwrap();
        let loaded = PhysicsConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_partial_file_uses_defaults() {
        let path = temp_path("physics.ron");
        std::fs::write(&path, "(neighbor_window: 3.0)").unwrap();

        let loaded = PhysicsConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.neighbor_window, 3.0);
        assert_eq!(loaded.quadtree, QuadTreeConfig::default());
    }

    #[test]
    fn test_parse_from_str() {
        let config = QuadTreeConfig::from_str_as("bucket_size = 8", Format::Toml).unwrap();
        assert_eq!(config, QuadTreeConfig { bucket_size: 8, max_depth: 13 });

        let text = config.to_string_as(Format::Ron).unwrap();
        assert_eq!(QuadTreeConfig::from_str_as(&text, Format::Ron).unwrap(), config);

        assert!(matches!(
            QuadTreeConfig::from_str_as("bucket_size = \"many\"", Format::Toml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let path = temp_path("physics.json");
        std::fs::write(&path, "{}").unwrap();

        let result = PhysicsConfig::load_from_file(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_bucket = PhysicsConfig {
            quadtree: QuadTreeConfig { bucket_size: 0, max_depth: 4 },
            ..PhysicsConfig::default()
        };
        assert!(matches!(zero_bucket.validate(), Err(ConfigError::Invalid(_))));

        let no_window = PhysicsConfig { neighbor_window: 0.0, ..PhysicsConfig::default() };
        assert!(no_window.validate().is_err());

        let no_events = PhysicsConfig { max_collision_events: 0, ..PhysicsConfig::default() };
        assert!(no_events.validate().is_err());
    }
}
