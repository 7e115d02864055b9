//! # Scene Export
//!
//! An incremental scene-export cache that mirrors a live, mutable scene graph
//! into a flat, renderer-ready representation. Only what changed between two
//! passes is re-exported:
//!
//! - **Geometry deduplication**: instances sharing unmodified source data
//!   collapse onto a single exported mesh.
//! - **Change classification**: per placement, the engine decides between
//!   skip, transform-only update, and full re-export.
//! - **Two consistent caches**: per-instance objects and per-source-mesh
//!   geometry stay in sync across interleaved updates.
//!
//! Host scene-graph walking, geometry/material/light conversion and the final
//! scene description are external collaborators expressed as traits in
//! [`scene::convert`]; the driver owns an [`export::ExportSession`] and feeds
//! it [`scene::SceneSnapshot`]s.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_export::prelude::*;
//! # fn collaborators() -> (Box<dyn GeometryConverter>, Box<dyn LightConverter>, Box<dyn MaterialConverter>) { unimplemented!() }
//! # fn snapshot() -> SceneSnapshot { unimplemented!() }
//!
//! let (mut geometry, mut lights, mut materials) = collaborators();
//! let mut session = ExportSession::new(ExportSettings::default());
//! let mut props = SceneProperties::new();
//! let mut log = ExportLog::new();
//! let cancel = CancelToken::new();
//!
//! let mut ctx = ExportContext {
//!     geometry: geometry.as_mut(),
//!     lights: lights.as_mut(),
//!     materials: materials.as_mut(),
//!     props: &mut props,
//!     log: &mut log,
//! };
//! let status = session.first_run(&snapshot(), &mut ctx, &cancel);
//! assert_eq!(status, ExportStatus::Completed);
//! ```

pub mod config;
pub mod export;
pub mod foundation;
pub mod scene;

/// Common imports for export drivers
pub mod prelude {
    pub use crate::{
        config::{Config, ExportSettings},
        export::{
            CancelToken, ExportContext, ExportLog, ExportSession, ExportStatus, InstanceKey,
            MeshKey, SceneProperties,
        },
        foundation::math::{Mat4, Vec3},
        scene::{
            convert::{GeometryConverter, LightConverter, MaterialConverter},
            ObjectKind, Placement, SceneObject, SceneSnapshot, SceneUpdate, UpdateFlags,
        },
    };
}
