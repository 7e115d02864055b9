//! Cache records: what one successful export of a mesh or object looks like
//!
//! These are the values stored in the two caches. They hold no host data,
//! only renderer-side handles plus whatever the engine needs to re-emit or
//! update an entity without re-converting it.

use std::sync::Arc;

use crate::export::keys::{InstanceKey, MeshKey};
use crate::export::props::SceneProperties;
use crate::foundation::math::{mat4_to_row_major, Mat4};

/// Opaque renderer-side geometry handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub u64);

/// Opaque renderer-side material handle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub String);

impl MaterialHandle {
    /// The handle as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One named submesh and the material-slot index that shades it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshDefinition {
    /// Renderer-side shape name
    pub shape_name: String,
    /// Index into the source object's material slots
    pub material_index: usize,
}

/// One successfully converted unit of geometry
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedMesh {
    /// Geometry key this mesh was converted under
    pub key: MeshKey,
    /// Ordered submesh/material-slot pairs
    pub mesh_definitions: Vec<MeshDefinition>,
    /// Renderer-side geometry handles, one per submesh
    pub geometry: Vec<GeometryHandle>,
}

/// Mesh cache slot: distinguishes "seen but produced nothing" from a key
/// that was never converted at all (which is simply absent from the cache).
#[derive(Debug, Clone)]
pub enum MeshEntry {
    /// Conversion succeeded
    Exported(Arc<ExportedMesh>),
    /// Conversion ran and produced no geometry; don't retry every pass
    Empty,
}

impl MeshEntry {
    /// The converted mesh, if this entry holds one
    pub fn mesh(&self) -> Option<&Arc<ExportedMesh>> {
        match self {
            Self::Exported(mesh) => Some(mesh),
            Self::Empty => None,
        }
    }
}

/// A converted light, as handed back by the light converter
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedLight {
    /// Renderer-side light name
    pub name: String,
}

/// Type-specific payload of an exported object
#[derive(Debug, Clone)]
pub enum ObjectPayload {
    /// Mesh-like object referencing shared exported geometry
    Mesh {
        /// The geometry this instance references
        mesh: Arc<ExportedMesh>,
        /// Resolved material handles, one per mesh definition, same order
        materials: Vec<MaterialHandle>,
        /// World transform; `Some` only when instanced (non-instanced
        /// objects bake the transform into the geometry)
        transform: Option<Mat4>,
    },
    /// Light object; its properties live with the light converter
    Light(ExportedLight),
}

/// One placement's entry in the object cache
#[derive(Debug, Clone)]
pub struct ExportedObject {
    /// Instance key this entry is stored under
    pub key: InstanceKey,
    /// Type-specific payload
    pub payload: ObjectPayload,
}

impl ExportedObject {
    /// Build a mesh-type entry.
    ///
    /// Returns `None` when the handle count does not match the mesh
    /// definition count; the engine treats that as a per-entity failure.
    pub fn mesh(
        key: InstanceKey,
        mesh: Arc<ExportedMesh>,
        materials: Vec<MaterialHandle>,
        transform: Option<Mat4>,
    ) -> Option<Self> {
        if materials.len() != mesh.mesh_definitions.len() {
            return None;
        }
        Some(Self {
            key,
            payload: ObjectPayload::Mesh {
                mesh,
                materials,
                transform,
            },
        })
    }

    /// Build a light-type entry
    pub fn light(key: InstanceKey, light: ExportedLight) -> Self {
        Self {
            key,
            payload: ObjectPayload::Light(light),
        }
    }

    /// Renderer property statements for this object.
    ///
    /// Mesh objects emit one `shape`/`material` pair per submesh plus the
    /// transform when instanced. Light properties are owned by the light
    /// converter and re-emitted through it, so light entries contribute
    /// nothing here.
    pub fn scene_props(&self) -> SceneProperties {
        let mut props = SceneProperties::new();
        match &self.payload {
            ObjectPayload::Mesh {
                mesh,
                materials,
                transform,
            } => {
                for (index, (definition, material)) in
                    mesh.mesh_definitions.iter().zip(materials).enumerate()
                {
                    let prefix = format!("scene.objects.{}-{index}", self.key);
                    props.set(format!("{prefix}.shape"), definition.shape_name.as_str());
                    props.set(format!("{prefix}.material"), material.as_str());
                    if let Some(transform) = transform {
                        props.set(
                            format!("{prefix}.transformation"),
                            mat4_to_row_major(transform),
                        );
                    }
                }
            }
            ObjectPayload::Light(_) => {}
        }
        props
    }
}
