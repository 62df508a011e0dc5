//! Texture pixel cache
//!
//! Textures come from an upstream [`TextureSource`] as ARGB pixels. The
//! renderer wants them gamma-adjusted by the current brightness, which is
//! costly enough to memoize; changing the brightness invalidates the cache.

use std::sync::Arc;

use crate::compose::{CacheStats, LruCache};
use crate::config::{DEFAULT_TEXTURE_BRIGHTNESS, DEFAULT_TEXTURE_CACHE_CAPACITY, EngineConfig};

/// Decoded texture with ARGB pixels in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u32>,
}

impl Texture {
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Whether any pixel is not fully opaque.
    #[must_use]
    pub fn has_alpha(&self) -> bool {
        self.pixels.iter().any(|&p| p >> 24 != 0xFF)
    }
}

/// Upstream texture decoder.
pub trait TextureSource {
    fn texture(&self, id: u32) -> Option<&Texture>;
}

impl TextureSource for std::collections::HashMap<u32, Texture> {
    fn texture(&self, id: u32) -> Option<&Texture> {
        self.get(&id)
    }
}

/// Raise each colour channel of an ARGB pixel to `brightness`, keeping alpha.
#[must_use]
pub fn adjust_brightness(pixel: u32, brightness: f64) -> u32 {
    let channel = |shift: u32| {
        let c = f64::from((pixel >> shift) & 0xFF) / 256.0;
        ((c.powf(brightness) * 256.0) as u32).min(0xFF) << shift
    };
    (pixel & 0xFF00_0000) | channel(16) | channel(8) | channel(0)
}

/// Brightness-adjusted pixels, memoized per texture id.
#[derive(Debug)]
pub struct TexturePixelCache {
    cache: LruCache<u32, Arc<[u32]>>,
    brightness: f64,
}

impl TexturePixelCache {
    #[must_use]
    pub fn new(capacity: usize, brightness: f64) -> Self {
        Self {
            cache: LruCache::new(capacity),
            brightness,
        }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.texture_cache_capacity, config.texture_brightness)
    }

    #[must_use]
    pub fn brightness(&self) -> f64 {
        self.brightness
    }

    /// Adjusted pixels for texture `id`, or `None` if the source lacks it.
    pub fn pixels<S>(&mut self, id: u32, source: &S) -> Option<Arc<[u32]>>
    where
        S: TextureSource + ?Sized,
    {
        if let Some(pixels) = self.cache.get(&id) {
            return Some(Arc::clone(pixels));
        }
        let texture = source.texture(id)?;
        let pixels: Arc<[u32]> = texture
            .pixels
            .iter()
            .map(|&p| adjust_brightness(p, self.brightness))
            .collect();
        self.cache.insert(id, Arc::clone(&pixels));
        Some(pixels)
    }

    /// Whether texture `id` has any translucent pixel. Missing textures are
    /// opaque.
    #[must_use]
    pub fn is_transparent<S>(&self, id: u32, source: &S) -> bool
    where
        S: TextureSource + ?Sized,
    {
        source.texture(id).is_some_and(Texture::has_alpha)
    }

    /// Change the gamma, dropping cached pixels if it differs.
    pub fn set_brightness(&mut self, brightness: f64) {
        if (brightness - self.brightness).abs() > f64::EPSILON {
            tracing::debug!("Texture brightness {} -> {}", self.brightness, brightness);
            self.brightness = brightness;
            self.cache.clear();
        }
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Default for TexturePixelCache {
    fn default() -> Self {
        Self::new(DEFAULT_TEXTURE_CACHE_CAPACITY, DEFAULT_TEXTURE_BRIGHTNESS)
    }
}
