//! Reconciliation engine
//!
//! An [`ExportSession`] owns the mesh and object caches for one export
//! session and reconciles them against scene snapshots: `first_run` once,
//! then `update` on every scene change. Per placement the engine picks
//! exactly one transition (skip, transform-only update, or full re-export)
//! and keeps both caches consistent while appending the resulting property
//! statements to the scene-description sink.

use std::sync::Arc;

use log::debug;
use thiserror::Error;

use crate::config::ExportSettings;
use crate::export::cache::{MeshCache, ObjectCache};
use crate::export::cancel::CancelToken;
use crate::export::exported::{ExportedObject, MeshEntry, ObjectPayload};
use crate::export::keys::{InstanceKey, MeshKey};
use crate::export::material::resolve_material;
use crate::export::props::SceneProperties;
use crate::scene::convert::ExportContext;
use crate::scene::{ObjectKind, Placement, SceneSnapshot, SceneUpdate, UpdateFlags};

/// Per-entity invariant violations
///
/// These signal identity-keying or driver defects. The engine reports them
/// through the [`crate::export::ExportLog`] and abandons the single entity;
/// the pass itself always continues.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A second full export was attempted for an instance key already in the
    /// object cache
    #[error("instance key already exported: {0}")]
    DuplicateInstanceKey(InstanceKey),

    /// A geometry-changed signal arrived for a mesh key that was never
    /// converted
    #[error("geometry update for unknown mesh key: {0}")]
    UnknownMeshKey(MeshKey),

    /// Resolved material handles did not line up with the mesh definitions
    #[error("material handle count does not match mesh definitions for {0}")]
    MaterialCountMismatch(InstanceKey),
}

/// How an export pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    /// Every placement and update was processed
    Completed,
    /// The driver requested a stop; everything committed so far is kept and
    /// the next `update` pass picks up the rest
    Interrupted,
}

/// Cache state for one export session
///
/// Created once per session by the driver and passed by reference into every
/// pass; there is no process-wide state. Entries are never removed: a scene
/// that deletes objects between passes keeps emitting the stale entries, and
/// a driver that needs retraction starts a fresh session.
#[derive(Debug, Default)]
pub struct ExportSession {
    settings: ExportSettings,
    meshes: MeshCache,
    objects: ObjectCache,
}

impl ExportSession {
    /// Create a session with the given settings and empty caches
    pub fn new(settings: ExportSettings) -> Self {
        Self {
            settings,
            meshes: MeshCache::new(),
            objects: ObjectCache::new(),
        }
    }

    /// Settings this session was created with
    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// The geometry cache (diagnostics)
    pub fn mesh_cache(&self) -> &MeshCache {
        &self.meshes
    }

    /// The object cache (diagnostics)
    pub fn object_cache(&self) -> &ObjectCache {
        &self.objects
    }

    /// Export every visible placement of the initial scene state.
    ///
    /// Placements are processed in enumeration order. The cancel token is
    /// polled between placements; on a stop request the pass returns
    /// [`ExportStatus::Interrupted`] with all committed entries intact, and a
    /// later `update` pass resumes from there.
    pub fn first_run(
        &mut self,
        scene: &SceneSnapshot,
        ctx: &mut ExportContext<'_>,
        cancel: &CancelToken,
    ) -> ExportStatus {
        for placement in &scene.placements {
            if !Self::is_visible(placement) {
                continue;
            }
            if let Err(err) = self.convert_placement(placement, ctx) {
                ctx.log.add_error(err.to_string(), &placement.object.name);
            }
            if cancel.is_cancelled() {
                debug!("stop requested, keeping partial export state");
                return ExportStatus::Interrupted;
            }
        }

        self.debug_report();
        ExportStatus::Completed
    }

    /// Reconcile the caches against a changed scene.
    ///
    /// Per visible placement, in precedence order: new placements (and all
    /// lights, which have no cheap path) get a full export; known mesh
    /// placements get a transform-only update when the transform differs,
    /// otherwise nothing. Afterwards the out-of-band update feed is applied:
    /// geometry changes overwrite the cached mesh for that key without
    /// touching dependent objects, light changes re-export the light.
    pub fn update(
        &mut self,
        scene: &SceneSnapshot,
        ctx: &mut ExportContext<'_>,
        cancel: &CancelToken,
    ) -> ExportStatus {
        debug!(
            "cache update: {} placements, {} change notifications",
            scene.placements.len(),
            scene.updates.len()
        );

        for placement in &scene.placements {
            if !Self::is_visible(placement) {
                continue;
            }

            let key = InstanceKey::for_placement(placement);
            if placement.object.kind != ObjectKind::Light && self.objects.contains(&key) {
                self.update_transform(&key, placement, ctx);
            } else if let Err(err) = self.convert_placement(placement, ctx) {
                ctx.log.add_error(err.to_string(), &placement.object.name);
            }

            if cancel.is_cancelled() {
                debug!("stop requested, keeping partial export state");
                return ExportStatus::Interrupted;
            }
        }

        for update in &scene.updates {
            if !update.flags.contains(UpdateFlags::GEOMETRY) {
                continue;
            }
            if let Err(err) = self.apply_geometry_update(update, ctx) {
                ctx.log.add_error(err.to_string(), &update.object.name);
            }
        }

        self.debug_report();
        ExportStatus::Completed
    }

    fn is_visible(placement: &Placement) -> bool {
        placement.visible && placement.object.kind.is_exportable()
    }

    /// Transform-only path: value-compare the stored transform against the
    /// placement and re-emit the object's properties when it moved.
    /// Geometry, mesh definitions and material handles stay untouched.
    fn update_transform(
        &mut self,
        key: &InstanceKey,
        placement: &Placement,
        ctx: &mut ExportContext<'_>,
    ) {
        let Some(exported) = self.objects.get_mut(key) else {
            return;
        };

        let moved = match &mut exported.payload {
            ObjectPayload::Mesh {
                transform: Some(stored),
                ..
            } if *stored != placement.world_transform => {
                *stored = placement.world_transform;
                true
            }
            // A non-instanced object has its transform baked into geometry;
            // a real move arrives as a geometry update. Lights never take
            // this path.
            _ => false,
        };

        if moved {
            debug!("transform update: {key}");
            ctx.props.merge(exported.scene_props());
        }
    }

    /// Full export of one placement, keyed and routed by object kind.
    /// Data-less objects and empties leave no trace at all.
    fn convert_placement(
        &mut self,
        placement: &Placement,
        ctx: &mut ExportContext<'_>,
    ) -> Result<(), ExportError> {
        let object = &placement.object;
        if object.data.is_none() {
            return Ok(());
        }

        let key = InstanceKey::for_placement(placement);
        match object.kind {
            ObjectKind::Mesh
            | ObjectKind::Curve
            | ObjectKind::Surface
            | ObjectKind::MetaBall
            | ObjectKind::Text => self.convert_mesh_placement(placement, key, ctx),
            ObjectKind::Light => {
                self.convert_light(placement, key, ctx);
                Ok(())
            }
            ObjectKind::Empty | ObjectKind::Camera => Ok(()),
        }
    }

    fn convert_mesh_placement(
        &mut self,
        placement: &Placement,
        key: InstanceKey,
        ctx: &mut ExportContext<'_>,
    ) -> Result<(), ExportError> {
        if self.objects.contains(&key) {
            return Err(ExportError::DuplicateInstanceKey(key));
        }

        let object = &placement.object;
        let use_instancing =
            self.settings.viewport_render || placement.is_instance() || object.can_share_data;
        let mesh_key = MeshKey::for_object(object, use_instancing);
        debug!("{}: mesh key {mesh_key}", object.name);

        // Cache hits are only honored for instanced geometry; a baked mesh is
        // private to its object and always converted fresh.
        let cached = if use_instancing {
            self.meshes.get(&mesh_key).cloned()
        } else {
            None
        };
        let entry = match cached {
            Some(entry) => {
                debug!("retrieving mesh from cache: {mesh_key}");
                entry
            }
            None => {
                debug!("fresh geometry export: {mesh_key}");
                let baked = (!use_instancing).then(|| placement.world_transform);
                let entry = match ctx.geometry.convert(object, &mesh_key, baked.as_ref()) {
                    Some(mesh) => MeshEntry::Exported(Arc::new(mesh)),
                    None => MeshEntry::Empty,
                };
                self.meshes.insert(mesh_key.clone(), entry.clone());
                entry
            }
        };

        let Some(mesh) = entry.mesh() else {
            // Seen-but-empty: the sentinel above keeps this from being
            // reconverted on the next pass.
            return Ok(());
        };

        let mut materials = Vec::with_capacity(mesh.mesh_definitions.len());
        let mut material_props = SceneProperties::new();
        for definition in &mesh.mesh_definitions {
            let resolved =
                resolve_material(object, definition.material_index, ctx.materials, ctx.log);
            material_props.merge(resolved.props);
            materials.push(resolved.handle);
        }

        let transform = use_instancing.then(|| placement.world_transform);
        let Some(exported) = ExportedObject::mesh(key.clone(), Arc::clone(mesh), materials, transform)
        else {
            return Err(ExportError::MaterialCountMismatch(key));
        };

        // All-or-nothing: nothing is emitted or cached until the object is
        // fully built.
        ctx.props.merge(material_props);
        ctx.props.merge(exported.scene_props());
        self.objects.insert(key, exported);
        Ok(())
    }

    fn convert_light(
        &mut self,
        placement: &Placement,
        key: InstanceKey,
        ctx: &mut ExportContext<'_>,
    ) {
        let object = &placement.object;
        if let Some((props, light)) = ctx.lights.convert(object, &key, &placement.world_transform)
        {
            ctx.props.merge(props);
            self.objects
                .insert(key.clone(), ExportedObject::light(key, light));
        }
    }

    /// Out-of-band geometry change for one source object (one signal per
    /// updated source-data identity, not per placement).
    fn apply_geometry_update(
        &mut self,
        update: &SceneUpdate,
        ctx: &mut ExportContext<'_>,
    ) -> Result<(), ExportError> {
        let object = &update.object;
        match object.kind {
            ObjectKind::Mesh
            | ObjectKind::Curve
            | ObjectKind::Surface
            | ObjectKind::MetaBall
            | ObjectKind::Text => {
                debug!("geometry of {} was updated", object.name);

                // Everything on this path is instanced; a baked transform is
                // reset by converting without one.
                let mesh_key = MeshKey::for_object(object, true);
                if !self.meshes.contains(&mesh_key) {
                    return Err(ExportError::UnknownMeshKey(mesh_key));
                }

                let entry = match ctx.geometry.convert(object, &mesh_key, None) {
                    Some(mesh) => MeshEntry::Exported(Arc::new(mesh)),
                    None => MeshEntry::Empty,
                };
                self.meshes.insert(mesh_key, entry);
                // Objects referencing this key keep their old mesh until
                // their own full re-export.
                Ok(())
            }
            ObjectKind::Light => {
                debug!("light {} was updated", object.name);
                let key = InstanceKey::for_object(object);
                if let Some((props, light)) =
                    ctx.lights.convert(object, &key, &update.world_transform)
                {
                    ctx.props.merge(props);
                    self.objects
                        .insert(key.clone(), ExportedObject::light(key, light));
                }
                Ok(())
            }
            ObjectKind::Empty | ObjectKind::Camera => Ok(()),
        }
    }

    fn debug_report(&self) {
        debug!("objects in cache: {}", self.objects.len());
        debug!("meshes in cache: {}", self.meshes.len());
        if self.settings.log_cache_contents {
            for (key, entry) in self.meshes.iter() {
                match entry.mesh() {
                    Some(mesh) => {
                        debug!("  {key}: {} mesh definitions", mesh.mesh_definitions.len());
                    }
                    None => debug!("  {key}: empty"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::diagnostics::ExportLog;
    use crate::export::exported::{
        ExportedLight, ExportedMesh, GeometryHandle, MaterialHandle, MeshDefinition,
    };
    use crate::foundation::math::{Mat4, Vec3};
    use crate::scene::convert::{GeometryConverter, LightConverter, MaterialConverter};
    use crate::scene::{
        DataId, InstancerRef, MaterialDesc, MaterialSlot, SceneObject,
    };

    /// Geometry converter producing `definitions` and counting calls
    struct MockGeometry {
        calls: usize,
        definitions: Vec<MeshDefinition>,
        produce_empty: bool,
    }

    impl Default for MockGeometry {
        fn default() -> Self {
            Self {
                calls: 0,
                definitions: vec![MeshDefinition {
                    shape_name: "sub0".into(),
                    material_index: 0,
                }],
                produce_empty: false,
            }
        }
    }

    impl GeometryConverter for MockGeometry {
        fn convert(
            &mut self,
            _object: &SceneObject,
            key: &MeshKey,
            _transform: Option<&Mat4>,
        ) -> Option<ExportedMesh> {
            self.calls += 1;
            if self.produce_empty {
                return None;
            }
            Some(ExportedMesh {
                key: key.clone(),
                mesh_definitions: self.definitions.clone(),
                geometry: vec![GeometryHandle(self.calls as u64)],
            })
        }
    }

    #[derive(Default)]
    struct MockLights {
        calls: usize,
    }

    impl LightConverter for MockLights {
        fn convert(
            &mut self,
            object: &SceneObject,
            key: &InstanceKey,
            _transform: &Mat4,
        ) -> Option<(SceneProperties, ExportedLight)> {
            self.calls += 1;
            let mut props = SceneProperties::new();
            props.set(format!("scene.lights.{key}.type"), "point");
            Some((
                props,
                ExportedLight {
                    name: object.name.clone(),
                },
            ))
        }
    }

    #[derive(Default)]
    struct MockMaterials {
        converted: usize,
        fallbacks: usize,
    }

    impl MaterialConverter for MockMaterials {
        fn convert(
            &mut self,
            material: &MaterialDesc,
            _object_name: &str,
        ) -> (MaterialHandle, SceneProperties) {
            self.converted += 1;
            let mut props = SceneProperties::new();
            props.set(format!("scene.materials.{}.type", material.name), "matte");
            (MaterialHandle(material.name.clone()), props)
        }

        fn fallback(&mut self) -> MaterialHandle {
            self.fallbacks += 1;
            MaterialHandle("__fallback".into())
        }
    }

    /// Collaborators plus sinks for driving passes in tests
    #[derive(Default)]
    struct Harness {
        geometry: MockGeometry,
        lights: MockLights,
        materials: MockMaterials,
        props: SceneProperties,
        log: ExportLog,
    }

    impl Harness {
        fn first_run(&mut self, session: &mut ExportSession, scene: &SceneSnapshot) -> ExportStatus {
            self.first_run_with(session, scene, &CancelToken::new())
        }

        fn first_run_with(
            &mut self,
            session: &mut ExportSession,
            scene: &SceneSnapshot,
            cancel: &CancelToken,
        ) -> ExportStatus {
            let mut ctx = ExportContext {
                geometry: &mut self.geometry,
                lights: &mut self.lights,
                materials: &mut self.materials,
                props: &mut self.props,
                log: &mut self.log,
            };
            session.first_run(scene, &mut ctx, cancel)
        }

        fn update(&mut self, session: &mut ExportSession, scene: &SceneSnapshot) -> ExportStatus {
            let mut ctx = ExportContext {
                geometry: &mut self.geometry,
                lights: &mut self.lights,
                materials: &mut self.materials,
                props: &mut self.props,
                log: &mut self.log,
            };
            session.update(scene, &mut ctx, &CancelToken::new())
        }
    }

    fn shared_mesh_object(name: &str) -> SceneObject {
        let mut obj = SceneObject::new(name, ObjectKind::Mesh, Some(DataId("CubeData".into())));
        obj.can_share_data = true;
        obj.material_slots = vec![MaterialSlot {
            material: Some(MaterialDesc {
                name: "Red".into(),
                image_texture_count: 0,
                needs_uv: false,
            }),
        }];
        obj
    }

    fn light_object(name: &str) -> SceneObject {
        SceneObject::new(name, ObjectKind::Light, Some(DataId(format!("{name}Data"))))
    }

    fn empty_object(name: &str) -> SceneObject {
        SceneObject::new(name, ObjectKind::Empty, None)
    }

    fn translation(x: f32) -> Mat4 {
        Mat4::new_translation(&Vec3::new(x, 0.0, 0.0))
    }

    fn mixed_scene() -> SceneSnapshot {
        SceneSnapshot::from_placements(vec![
            Placement::new(shared_mesh_object("Cube.001"), translation(0.0)),
            Placement::new(shared_mesh_object("Cube.002"), translation(2.0)),
            Placement::new(light_object("Sun"), translation(5.0)),
            Placement::new(empty_object("Anchor"), Mat4::identity()),
        ])
    }

    #[test]
    fn test_first_run_dedups_shared_geometry() {
        let mut session = ExportSession::new(ExportSettings::default());
        let mut harness = Harness::default();

        let status = harness.first_run(&mut session, &mixed_scene());

        assert_eq!(status, ExportStatus::Completed);
        // One mesh entry shared by both instances, plus the light; the empty
        // leaves no trace.
        assert_eq!(session.mesh_cache().len(), 1);
        assert_eq!(session.object_cache().len(), 3);
        assert_eq!(harness.geometry.calls, 1);
        assert_eq!(harness.lights.calls, 1);
        assert_eq!(harness.materials.converted, 2);
        assert!(harness.log.errors().is_empty());

        // Both instances reference the same exported mesh
        let meshes: Vec<_> = session
            .object_cache()
            .iter()
            .filter_map(|(_, obj)| match &obj.payload {
                ObjectPayload::Mesh { mesh, .. } => Some(Arc::clone(mesh)),
                ObjectPayload::Light(_) => None,
            })
            .collect();
        assert_eq!(meshes.len(), 2);
        assert!(Arc::ptr_eq(&meshes[0], &meshes[1]));

        assert!(harness
            .props
            .get("scene.objects.Cube.001-0.shape")
            .is_some());
        assert!(harness.props.get("scene.lights.Sun.type").is_some());
    }

    #[test]
    fn test_update_without_changes_is_a_noop() {
        let mut session = ExportSession::new(ExportSettings::default());
        let mut harness = Harness::default();
        let scene = SceneSnapshot::from_placements(vec![
            Placement::new(shared_mesh_object("Cube.001"), translation(0.0)),
            Placement::new(shared_mesh_object("Cube.002"), translation(2.0)),
        ]);

        harness.first_run(&mut session, &scene);
        let conversions = harness.geometry.calls;
        harness.props = SceneProperties::new();

        let status = harness.update(&mut session, &scene);
        assert_eq!(status, ExportStatus::Completed);
        assert!(harness.props.is_empty());
        assert_eq!(harness.geometry.calls, conversions);
        assert_eq!(session.object_cache().len(), 2);
    }

    #[test]
    fn test_transform_only_update() {
        let mut session = ExportSession::new(ExportSettings::default());
        let mut harness = Harness::default();
        let mut scene = SceneSnapshot::from_placements(vec![
            Placement::new(shared_mesh_object("Cube.001"), translation(0.0)),
            Placement::new(shared_mesh_object("Cube.002"), translation(2.0)),
        ]);

        harness.first_run(&mut session, &scene);
        harness.props = SceneProperties::new();

        scene.placements[0].world_transform = translation(9.0);
        harness.update(&mut session, &scene);

        // No conversion, no material work; only the moved object re-emits
        assert_eq!(harness.geometry.calls, 1);
        assert_eq!(harness.materials.converted, 2);
        assert!(harness
            .props
            .get("scene.objects.Cube.001-0.transformation")
            .is_some());
        assert!(harness
            .props
            .get("scene.objects.Cube.002-0.transformation")
            .is_none());

        // The stored transform took the new value
        let key = InstanceKey::for_placement(&scene.placements[0]);
        let exported = session.object_cache().get(&key).unwrap();
        match &exported.payload {
            ObjectPayload::Mesh { transform, .. } => {
                assert_eq!(*transform, Some(translation(9.0)));
            }
            ObjectPayload::Light(_) => panic!("expected mesh payload"),
        }
    }

    #[test]
    fn test_baked_transform_is_never_updated_in_place() {
        let mut settings = ExportSettings::default();
        settings.viewport_render = false;
        let mut session = ExportSession::new(settings);
        let mut harness = Harness::default();

        let mut obj = shared_mesh_object("Rock");
        obj.can_share_data = false;
        let mut scene = SceneSnapshot::from_placements(vec![Placement::new(obj, translation(0.0))]);

        harness.first_run(&mut session, &scene);
        harness.props = SceneProperties::new();

        scene.placements[0].world_transform = translation(3.0);
        harness.update(&mut session, &scene);

        // The transform is baked into geometry; no in-place update happens
        assert!(harness.props.is_empty());
        let key = InstanceKey::for_placement(&scene.placements[0]);
        match &session.object_cache().get(&key).unwrap().payload {
            ObjectPayload::Mesh { transform, .. } => assert!(transform.is_none()),
            ObjectPayload::Light(_) => panic!("expected mesh payload"),
        }
    }

    #[test]
    fn test_new_placement_during_update() {
        let mut session = ExportSession::new(ExportSettings::default());
        let mut harness = Harness::default();
        let mut scene = SceneSnapshot::from_placements(vec![Placement::new(
            shared_mesh_object("Cube.001"),
            translation(0.0),
        )]);

        harness.first_run(&mut session, &scene);

        scene.placements.push(Placement::instanced(
            shared_mesh_object("Cube.001"),
            translation(4.0),
            InstancerRef {
                name: "Emitter".into(),
                persistent_id: 0,
            },
        ));
        harness.update(&mut session, &scene);

        // The new instance reuses the cached geometry
        assert_eq!(session.object_cache().len(), 2);
        assert_eq!(session.mesh_cache().len(), 1);
        assert_eq!(harness.geometry.calls, 1);
    }

    #[test]
    fn test_lights_reexport_on_every_update() {
        let mut session = ExportSession::new(ExportSettings::default());
        let mut harness = Harness::default();
        let scene =
            SceneSnapshot::from_placements(vec![Placement::new(light_object("Sun"), translation(5.0))]);

        harness.first_run(&mut session, &scene);
        harness.update(&mut session, &scene);

        assert_eq!(harness.lights.calls, 2);
        assert_eq!(session.object_cache().len(), 1);
    }

    #[test]
    fn test_geometry_update_overwrites_mesh_but_not_objects() {
        let mut session = ExportSession::new(ExportSettings::default());
        let mut harness = Harness::default();
        let scene = SceneSnapshot::from_placements(vec![
            Placement::new(shared_mesh_object("Cube.001"), translation(0.0)),
            Placement::new(shared_mesh_object("Cube.002"), translation(2.0)),
        ]);

        harness.first_run(&mut session, &scene);

        // The edit split the mesh into two submeshes
        harness.geometry.definitions = vec![
            MeshDefinition {
                shape_name: "sub0".into(),
                material_index: 0,
            },
            MeshDefinition {
                shape_name: "sub1".into(),
                material_index: 1,
            },
        ];
        let mut changed = scene.clone();
        changed.updates.push(SceneUpdate {
            object: shared_mesh_object("Cube.001"),
            flags: UpdateFlags::GEOMETRY,
            world_transform: translation(0.0),
        });
        harness.update(&mut session, &changed);

        assert_eq!(harness.geometry.calls, 2);
        assert_eq!(session.mesh_cache().len(), 1);

        let mesh_key = MeshKey::for_object(&shared_mesh_object("Cube.001"), true);
        let entry = session.mesh_cache().get(&mesh_key).unwrap();
        assert_eq!(entry.mesh().unwrap().mesh_definitions.len(), 2);

        // Dependent objects still reference the old mesh until their own
        // full re-export
        assert_eq!(session.object_cache().len(), 2);
        for (_, obj) in session.object_cache().iter() {
            match &obj.payload {
                ObjectPayload::Mesh { mesh, .. } => {
                    assert_eq!(mesh.mesh_definitions.len(), 1);
                }
                ObjectPayload::Light(_) => panic!("expected mesh payload"),
            }
        }
    }

    #[test]
    fn test_geometry_update_for_unknown_key_is_reported() {
        let mut session = ExportSession::new(ExportSettings::default());
        let mut harness = Harness::default();

        let scene = SceneSnapshot {
            placements: Vec::new(),
            updates: vec![SceneUpdate {
                object: shared_mesh_object("Ghost"),
                flags: UpdateFlags::GEOMETRY,
                world_transform: Mat4::identity(),
            }],
        };
        let status = harness.update(&mut session, &scene);

        assert_eq!(status, ExportStatus::Completed);
        assert_eq!(harness.log.errors().len(), 1);
        assert_eq!(harness.log.errors()[0].entity, "Ghost");
        assert_eq!(harness.geometry.calls, 0);
        assert!(session.mesh_cache().is_empty());
    }

    #[test]
    fn test_duplicate_instance_key_is_reported_not_fatal() {
        let mut session = ExportSession::new(ExportSettings::default());
        let mut harness = Harness::default();
        // Two placements of the same non-instanced object produce the same
        // instance key, which is an identity-keying defect
        let scene = SceneSnapshot::from_placements(vec![
            Placement::new(shared_mesh_object("Cube"), translation(0.0)),
            Placement::new(shared_mesh_object("Cube"), translation(1.0)),
            Placement::new(light_object("Sun"), translation(5.0)),
        ]);

        let status = harness.first_run(&mut session, &scene);

        // The duplicate is abandoned, everything else goes through
        assert_eq!(status, ExportStatus::Completed);
        assert_eq!(harness.log.errors().len(), 1);
        assert_eq!(harness.log.errors()[0].entity, "Cube");
        assert_eq!(session.object_cache().len(), 2);
        assert_eq!(harness.geometry.calls, 1);
        assert_eq!(harness.lights.calls, 1);
    }

    #[test]
    fn test_cancellation_preserves_committed_state() {
        let mut session = ExportSession::new(ExportSettings::default());
        let mut harness = Harness::default();
        let scene = SceneSnapshot::from_placements(vec![
            Placement::new(shared_mesh_object("Cube.001"), translation(0.0)),
            Placement::new(shared_mesh_object("Cube.002"), translation(2.0)),
        ]);

        let cancel = CancelToken::new();
        cancel.cancel();
        let status = harness.first_run_with(&mut session, &scene, &cancel);

        // Stopped after the first placement, which stays committed
        assert_eq!(status, ExportStatus::Interrupted);
        assert_eq!(session.object_cache().len(), 1);

        // The next update pass picks up the rest without redoing work
        let status = harness.update(&mut session, &scene);
        assert_eq!(status, ExportStatus::Completed);
        assert_eq!(session.object_cache().len(), 2);
        assert_eq!(harness.geometry.calls, 1);
        assert!(harness.log.errors().is_empty());
    }

    #[test]
    fn test_empty_conversion_is_cached_and_not_retried() {
        let mut session = ExportSession::new(ExportSettings::default());
        let mut harness = Harness::default();
        harness.geometry.produce_empty = true;
        let scene = SceneSnapshot::from_placements(vec![Placement::new(
            shared_mesh_object("Degenerate"),
            translation(0.0),
        )]);

        harness.first_run(&mut session, &scene);

        // Seen-but-empty: a cache entry exists, no object was exported
        assert_eq!(session.mesh_cache().len(), 1);
        assert!(session.object_cache().is_empty());
        assert_eq!(harness.geometry.calls, 1);

        // The sentinel short-circuits the next pass even though the
        // converter could now produce geometry
        harness.geometry.produce_empty = false;
        harness.update(&mut session, &scene);
        assert_eq!(harness.geometry.calls, 1);
        assert!(session.object_cache().is_empty());
    }

    #[test]
    fn test_invisible_and_camera_placements_are_skipped() {
        let mut session = ExportSession::new(ExportSettings::default());
        let mut harness = Harness::default();

        let mut hidden = Placement::new(shared_mesh_object("Hidden"), translation(0.0));
        hidden.visible = false;
        let camera = Placement::new(
            SceneObject::new("Camera", ObjectKind::Camera, Some(DataId("CamData".into()))),
            translation(0.0),
        );
        let scene = SceneSnapshot::from_placements(vec![hidden, camera]);

        harness.first_run(&mut session, &scene);
        assert!(session.object_cache().is_empty());
        assert!(session.mesh_cache().is_empty());
        assert_eq!(harness.geometry.calls, 0);
    }

    #[test]
    fn test_light_geometry_signal_reexports_light() {
        let mut session = ExportSession::new(ExportSettings::default());
        let mut harness = Harness::default();
        let scene =
            SceneSnapshot::from_placements(vec![Placement::new(light_object("Sun"), translation(5.0))]);

        harness.first_run(&mut session, &scene);

        let mut changed = SceneSnapshot::default();
        changed.updates.push(SceneUpdate {
            object: light_object("Sun"),
            flags: UpdateFlags::GEOMETRY,
            world_transform: translation(6.0),
        });
        harness.update(&mut session, &changed);

        assert_eq!(harness.lights.calls, 2);
        assert_eq!(session.object_cache().len(), 1);
    }

    #[test]
    fn test_material_fallback_counts_one_warning_per_resolution() {
        let mut session = ExportSession::new(ExportSettings::default());
        let mut harness = Harness::default();

        let mut obj = shared_mesh_object("Bare");
        obj.material_slots = Vec::new();
        let scene = SceneSnapshot::from_placements(vec![Placement::new(obj, translation(0.0))]);

        harness.first_run(&mut session, &scene);

        assert_eq!(harness.materials.fallbacks, 1);
        assert_eq!(harness.log.warnings().len(), 1);
        assert_eq!(harness.log.warnings()[0].message, "No material defined");
        assert_eq!(session.object_cache().len(), 1);
    }
}
