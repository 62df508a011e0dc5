//! Mesh composition
//!
//! Turns an object definition plus a request (role, orientation, animation
//! frame) into a lit, transformed mesh. Imported geometry and finished
//! meshes are memoized in separate LRU tiers owned by [`MeshResolver`].
//!
//! Composition order is fixed: merge parts, pose, diagonal correction,
//! quarter turns, recolour, retexture, scale, translate, light.

mod cache;
mod contour;
mod key;
mod resolver;

pub use cache::{CacheStats, LruCache};
pub use contour::{CornerHeights, contour};
pub use key::{KEY_MULTIPLIER, base_geometry_key, composed_key};
pub use resolver::{MeshOutcome, MeshRequest, MeshResolver, ResolverStats};
