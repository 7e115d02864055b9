//! Host-facing scene model
//!
//! A host adapter walks its own scene graph and flattens what the export
//! cache needs into these types: one [`Placement`] per concrete occurrence of
//! an object (instances included), plus an out-of-band [`SceneUpdate`] feed
//! describing what changed since the last pass.

pub mod convert;

use bitflags::bitflags;

use crate::foundation::math::Mat4;

/// Effective type tag of a scene object
///
/// Closed set: every branch point in the engine matches exhaustively, so a
/// new category cannot silently fall through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Polygonal mesh
    Mesh,
    /// Curve object, exported through its mesh conversion
    Curve,
    /// Surface object (NURBS etc.)
    Surface,
    /// Metaball
    MetaBall,
    /// Text object
    Text,
    /// Light source
    Light,
    /// Placeholder object carrying no data
    Empty,
    /// Camera; enumerated by hosts but never exported here
    Camera,
}

impl ObjectKind {
    /// Whether this kind goes through the geometry-conversion path
    pub fn is_mesh_like(self) -> bool {
        match self {
            Self::Mesh | Self::Curve | Self::Surface | Self::MetaBall | Self::Text => true,
            Self::Light | Self::Empty | Self::Camera => false,
        }
    }

    /// Whether the export cache handles this kind at all
    pub fn is_exportable(self) -> bool {
        match self {
            Self::Mesh
            | Self::Curve
            | Self::Surface
            | Self::MetaBall
            | Self::Text
            | Self::Light
            | Self::Empty => true,
            Self::Camera => false,
        }
    }
}

/// Stable identity of a source data block (shared by all objects using it)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataId(pub String);

impl std::fmt::Display for DataId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A material as seen from the export cache: enough identity to key the
/// conversion, plus the texture facts the UV validation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    /// Host-side material name
    pub name: String,
    /// Number of image-texture inputs in the material's node tree
    pub image_texture_count: usize,
    /// Whether any of those textures are mapped through UV coordinates
    pub needs_uv: bool,
}

/// One material slot of an object; a slot may exist but hold nothing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialSlot {
    /// Material assigned to the slot, if any
    pub material: Option<MaterialDesc>,
}

/// One object of the host scene graph, flattened for export
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Unique object name within the scene
    pub name: String,
    /// Effective type tag
    pub kind: ObjectKind,
    /// Identity of the underlying source data block, `None` for data-less
    /// objects (which are skipped entirely)
    pub data: Option<DataId>,
    /// Deforming modifiers bake per-object geometry, so sharing is unsound
    pub has_deforming_modifiers: bool,
    /// Whether the host allows this object's data to be shared across
    /// instances at all
    pub can_share_data: bool,
    /// Ordered material slots
    pub material_slots: Vec<MaterialSlot>,
    /// Whether the object carries a valid UV layer
    pub has_uv_layer: bool,
}

impl SceneObject {
    /// Minimal constructor for objects without materials; hosts fill in the
    /// rest field by field.
    pub fn new(name: impl Into<String>, kind: ObjectKind, data: Option<DataId>) -> Self {
        Self {
            name: name.into(),
            kind,
            data,
            has_deforming_modifiers: false,
            can_share_data: false,
            material_slots: Vec::new(),
            has_uv_layer: false,
        }
    }
}

/// Identity of the instancer that produced a placement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstancerRef {
    /// Instancer object name
    pub name: String,
    /// Persistent per-placement id assigned by the host (stable across
    /// passes for the same placement)
    pub persistent_id: u64,
}

/// One concrete occurrence of an object in the scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// The placed object
    pub object: SceneObject,
    /// Visibility flag resolved by the host
    pub visible: bool,
    /// World transform of this placement
    pub world_transform: Mat4,
    /// Present iff the placement was generated by an instancer
    pub instancer: Option<InstancerRef>,
}

impl Placement {
    /// Create a visible, non-instanced placement
    pub fn new(object: SceneObject, world_transform: Mat4) -> Self {
        Self {
            object,
            visible: true,
            world_transform,
            instancer: None,
        }
    }

    /// Create a visible placement generated by an instancer
    pub fn instanced(object: SceneObject, world_transform: Mat4, instancer: InstancerRef) -> Self {
        Self {
            object,
            visible: true,
            world_transform,
            instancer: Some(instancer),
        }
    }

    /// Whether this placement was generated by an instancer
    pub fn is_instance(&self) -> bool {
        self.instancer.is_some()
    }
}

bitflags! {
    /// What changed on an updated entity since the last pass
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UpdateFlags: u8 {
        /// Source geometry changed (mesh edit, modifier edit etc.)
        const GEOMETRY = 1 << 0;
        /// Only the transform changed
        const TRANSFORM = 1 << 1;
    }
}

/// Change notification for one updated source object
///
/// Arrives once per updated source-data identity, not per placement.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneUpdate {
    /// The updated object
    pub object: SceneObject,
    /// Which aspects changed
    pub flags: UpdateFlags,
    /// World transform of the object itself (used for light re-exports)
    pub world_transform: Mat4,
}

/// Everything the driver hands to one export pass
#[derive(Debug, Clone, Default)]
pub struct SceneSnapshot {
    /// All placements, in scene-graph enumeration order
    pub placements: Vec<Placement>,
    /// Out-of-band change notifications (empty on a first run)
    pub updates: Vec<SceneUpdate>,
}

impl SceneSnapshot {
    /// Snapshot with placements only (a first run has no update feed)
    pub fn from_placements(placements: Vec<Placement>) -> Self {
        Self {
            placements,
            updates: Vec::new(),
        }
    }
}
