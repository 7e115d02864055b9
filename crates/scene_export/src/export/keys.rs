//! Identity keys for exported geometry and object instances
//!
//! `MeshKey` identifies a unit of exported geometry; every instance sharing
//! unmodified source data maps to the same key so the geometry is converted
//! once. `InstanceKey` identifies one concrete placement and is unique even
//! when many placements reference the same mesh key.

use crate::scene::{Placement, SceneObject};

/// Key for one unit of exported geometry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshKey(String);

impl MeshKey {
    /// Derive the geometry key for an object.
    ///
    /// When `use_instancing` is true and the object has no deforming
    /// modifiers, the key is based on the source data block, so all
    /// instances of that data collapse onto one key. Otherwise the key is
    /// based on the object itself: a baked or deforming mesh is private to
    /// its object and must never be shared.
    ///
    /// The instancing marker keeps an instanced and a non-instanced export
    /// of the same data from ever colliding.
    pub fn for_object(object: &SceneObject, use_instancing: bool) -> Self {
        let shareable = use_instancing && !object.has_deforming_modifiers;
        let mut key = match (&object.data, shareable) {
            (Some(data), true) => format!("data:{data}"),
            _ => format!("obj:{}", object.name),
        };
        if use_instancing {
            key.push_str("_instance");
        }
        Self(key)
    }

    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MeshKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Key for one concrete placement in the scene graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey(String);

impl InstanceKey {
    /// Derive the instance key for a placement.
    ///
    /// Injective over concrete placements: an object inside an instancer
    /// gets a distinct key per instancer placement via the instancer name
    /// and its persistent id.
    pub fn for_placement(placement: &Placement) -> Self {
        match &placement.instancer {
            Some(instancer) => Self(format!(
                "{}@{}#{}",
                placement.object.name, instancer.name, instancer.persistent_id
            )),
            None => Self(placement.object.name.clone()),
        }
    }

    /// Key for a source object outside any instancer (used by the
    /// out-of-band update feed, which reports per object, not per placement)
    pub fn for_object(object: &SceneObject) -> Self {
        Self(object.name.clone())
    }

    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
