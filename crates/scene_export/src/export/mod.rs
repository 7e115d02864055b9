//! The export cache proper: identity keys, cache records, the two caches and
//! the reconciliation engine that drives them.

mod cache;
mod cancel;
mod diagnostics;
mod exported;
mod keys;
mod material;
mod props;
mod session;

pub use cache::{MeshCache, ObjectCache};
pub use cancel::CancelToken;
pub use diagnostics::{Diagnostic, ExportLog};
pub use exported::{
    ExportedLight, ExportedMesh, ExportedObject, GeometryHandle, MaterialHandle, MeshDefinition,
    MeshEntry, ObjectPayload,
};
pub use keys::{InstanceKey, MeshKey};
pub use material::{resolve_material, MaterialOutcome, ResolvedMaterial};
pub use props::{PropertyValue, SceneProperties};
pub use session::{ExportError, ExportSession, ExportStatus};

pub use crate::scene::convert::ExportContext;
