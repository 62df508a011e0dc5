//! Engine configuration
//!
//! Cache capacities, the readiness retry limit and decoder policy. The type
//! derives serde so a host application can embed it in its own settings file;
//! this crate never reads configuration from disk or the environment.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default capacity of the imported base geometry cache.
pub const DEFAULT_GEOMETRY_CACHE_CAPACITY: usize = 500;
/// Default capacity of the composed mesh cache.
pub const DEFAULT_MESH_CACHE_CAPACITY: usize = 500;
/// Default capacity of the texture pixel cache.
pub const DEFAULT_TEXTURE_CACHE_CAPACITY: usize = 20;
/// Consecutive unsatisfied polls tolerated before readiness gives up.
pub const DEFAULT_READINESS_RETRY_LIMIT: u32 = 500;
/// Default texture gamma.
pub const DEFAULT_TEXTURE_BRIGHTNESS: f64 = 0.8;

/// What a decoder does when it meets an opcode it does not recognise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownOpcodePolicy {
    /// Log it, assume a zero-length payload and keep reading.
    #[default]
    Skip,
    /// Log it and stop decoding the record, keeping the fields read so far.
    Truncate,
}

/// Configuration for a [`crate::ContentEngine`].
///
/// # Example
///
/// ```
/// use jagdef::{EngineConfig, UnknownOpcodePolicy};
///
/// let config = EngineConfig::new()
///     .with_mesh_cache_capacity(1024)
///     .with_unknown_opcodes(UnknownOpcodePolicy::Truncate);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of imported base geometries kept.
    pub geometry_cache_capacity: usize,
    /// Maximum number of composed meshes kept.
    pub mesh_cache_capacity: usize,
    /// Maximum number of brightness-adjusted texture pixel arrays kept.
    pub texture_cache_capacity: usize,
    /// Unsatisfied readiness polls tolerated before escalation.
    pub readiness_retry_limit: u32,
    /// Gamma applied to texture pixels.
    pub texture_brightness: f64,
    /// Decoder behaviour on unknown opcodes.
    pub unknown_opcodes: UnknownOpcodePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            geometry_cache_capacity: DEFAULT_GEOMETRY_CACHE_CAPACITY,
            mesh_cache_capacity: DEFAULT_MESH_CACHE_CAPACITY,
            texture_cache_capacity: DEFAULT_TEXTURE_CACHE_CAPACITY,
            readiness_retry_limit: DEFAULT_READINESS_RETRY_LIMIT,
            texture_brightness: DEFAULT_TEXTURE_BRIGHTNESS,
            unknown_opcodes: UnknownOpcodePolicy::Skip,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base geometry cache capacity.
    #[must_use]
    pub fn with_geometry_cache_capacity(mut self, capacity: usize) -> Self {
        self.geometry_cache_capacity = capacity;
        self
    }

    /// Set the composed mesh cache capacity.
    #[must_use]
    pub fn with_mesh_cache_capacity(mut self, capacity: usize) -> Self {
        self.mesh_cache_capacity = capacity;
        self
    }

    /// Set the texture pixel cache capacity.
    #[must_use]
    pub fn with_texture_cache_capacity(mut self, capacity: usize) -> Self {
        self.texture_cache_capacity = capacity;
        self
    }

    /// Set the readiness retry limit.
    #[must_use]
    pub fn with_readiness_retry_limit(mut self, limit: u32) -> Self {
        self.readiness_retry_limit = limit;
        self
    }

    /// Set the texture gamma.
    #[must_use]
    pub fn with_texture_brightness(mut self, brightness: f64) -> Self {
        self.texture_brightness = brightness;
        self
    }

    /// Set the unknown opcode policy.
    #[must_use]
    pub fn with_unknown_opcodes(mut self, policy: UnknownOpcodePolicy) -> Self {
        self.unknown_opcodes = policy;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.geometry_cache_capacity == 0 {
            return Err(invalid("geometry cache capacity must be non-zero"));
        }
        if self.mesh_cache_capacity == 0 {
            return Err(invalid("mesh cache capacity must be non-zero"));
        }
        if self.texture_cache_capacity == 0 {
            return Err(invalid("texture cache capacity must be non-zero"));
        }
        if self.readiness_retry_limit == 0 {
            return Err(invalid("readiness retry limit must be non-zero"));
        }
        if !(self.texture_brightness > 0.0 && self.texture_brightness <= 2.0) {
            return Err(Error::InvalidConfig {
                message: format!(
                    "texture brightness {} outside (0, 2]",
                    self.texture_brightness
                ),
            });
        }
        Ok(())
    }
}

fn invalid(message: &str) -> Error {
    Error::InvalidConfig {
        message: message.to_string(),
    }
}
