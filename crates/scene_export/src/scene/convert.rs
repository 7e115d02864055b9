//! Collaborator traits consumed by the export engine
//!
//! The cache never talks to a concrete host or renderer. Geometry, light and
//! material conversion are seams: the driver supplies implementations, the
//! engine decides when to call them.

use crate::export::{
    ExportLog, ExportedLight, ExportedMesh, InstanceKey, MaterialHandle, MeshKey, SceneProperties,
};
use crate::foundation::math::Mat4;
use crate::scene::{MaterialDesc, SceneObject};

/// Converts source geometry into a renderer-ready mesh
///
/// Must be idempotent: identical inputs yield an equivalent result. Returns
/// `None` when the object produced no exportable geometry; the engine caches
/// that outcome so the conversion is not retried every pass.
pub trait GeometryConverter {
    /// Convert one object's geometry.
    ///
    /// `transform` is present only when the result must bake the placement's
    /// world transform into the vertex data (non-instanced export); instanced
    /// geometry is converted untransformed.
    fn convert(
        &mut self,
        object: &SceneObject,
        key: &MeshKey,
        transform: Option<&Mat4>,
    ) -> Option<ExportedMesh>;
}

/// Converts a light object, placement by placement
///
/// Lights have no transform-only fast path; every re-export goes through
/// here. Returns `None` for lights that produce nothing (zero-sized area
/// lights and the like).
pub trait LightConverter {
    /// Convert one light placement into its scene properties and cache record.
    fn convert(
        &mut self,
        object: &SceneObject,
        key: &InstanceKey,
        transform: &Mat4,
    ) -> Option<(SceneProperties, ExportedLight)>;
}

/// Converts materials and supplies the safe fallback
pub trait MaterialConverter {
    /// Convert a material for the named object, returning its handle and the
    /// property statements defining it.
    fn convert(
        &mut self,
        material: &MaterialDesc,
        object_name: &str,
    ) -> (MaterialHandle, SceneProperties);

    /// Handle of the fallback material used when no valid material resolves
    fn fallback(&mut self) -> MaterialHandle;
}

/// Collaborators and sinks for one export pass, bundled so engine internals
/// don't thread five references through every call.
pub struct ExportContext<'a> {
    /// Geometry conversion seam
    pub geometry: &'a mut dyn GeometryConverter,
    /// Light conversion seam
    pub lights: &'a mut dyn LightConverter,
    /// Material conversion seam
    pub materials: &'a mut dyn MaterialConverter,
    /// Scene-description sink (append/merge only)
    pub props: &'a mut SceneProperties,
    /// Diagnostics sink
    pub log: &'a mut ExportLog,
}
