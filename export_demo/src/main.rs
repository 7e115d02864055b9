//! Export cache demo
//!
//! Drives a full export session against in-memory mock collaborators: a
//! first run over a small scene (two instances sharing one mesh, a light and
//! an empty), then an incremental update that moves one instance and edits
//! the shared geometry. The emitted scene description and the cache state
//! are printed after each pass.

use scene_export::export::{
    ExportedLight, ExportedMesh, GeometryHandle, MaterialHandle, MeshDefinition,
};
use scene_export::prelude::*;
use scene_export::scene::{DataId, MaterialDesc, MaterialSlot, SceneObject as Object};

/// Geometry converter that fabricates one submesh per call
#[derive(Default)]
struct DemoGeometry {
    conversions: u64,
}

impl GeometryConverter for DemoGeometry {
    fn convert(
        &mut self,
        object: &Object,
        key: &MeshKey,
        transform: Option<&Mat4>,
    ) -> Option<ExportedMesh> {
        self.conversions += 1;
        log::info!(
            "converting geometry of {} (baked transform: {})",
            object.name,
            transform.is_some()
        );
        Some(ExportedMesh {
            key: key.clone(),
            mesh_definitions: vec![MeshDefinition {
                shape_name: format!("{}_shape", object.name),
                material_index: 0,
            }],
            geometry: vec![GeometryHandle(self.conversions)],
        })
    }
}

#[derive(Default)]
struct DemoLights;

impl LightConverter for DemoLights {
    fn convert(
        &mut self,
        object: &Object,
        key: &InstanceKey,
        _transform: &Mat4,
    ) -> Option<(SceneProperties, ExportedLight)> {
        let mut props = SceneProperties::new();
        props.set(format!("scene.lights.{key}.type"), "sun");
        props.set(format!("scene.lights.{key}.gain"), vec![1.0, 1.0, 1.0]);
        Some((
            props,
            ExportedLight {
                name: object.name.clone(),
            },
        ))
    }
}

#[derive(Default)]
struct DemoMaterials;

impl MaterialConverter for DemoMaterials {
    fn convert(
        &mut self,
        material: &MaterialDesc,
        _object_name: &str,
    ) -> (MaterialHandle, SceneProperties) {
        let mut props = SceneProperties::new();
        props.set(format!("scene.materials.{}.type", material.name), "matte");
        (MaterialHandle(material.name.clone()), props)
    }

    fn fallback(&mut self) -> MaterialHandle {
        MaterialHandle("__fallback".into())
    }
}

fn cube_instance(name: &str) -> Object {
    let mut obj = Object::new(name, ObjectKind::Mesh, Some(DataId("CubeData".into())));
    obj.can_share_data = true;
    obj.material_slots = vec![MaterialSlot {
        material: Some(MaterialDesc {
            name: "BrushedMetal".into(),
            image_texture_count: 0,
            needs_uv: false,
        }),
    }];
    obj
}

fn translation(x: f32) -> Mat4 {
    Mat4::new_translation(&Vec3::new(x, 0.0, 0.0))
}

fn print_pass(label: &str, session: &ExportSession, props: &SceneProperties, log: &ExportLog) {
    println!("--- {label} ---");
    println!(
        "cache: {} meshes, {} objects",
        session.mesh_cache().len(),
        session.object_cache().len()
    );
    for (path, value) in props.iter() {
        println!("  {path} = {value:?}");
    }
    for warning in log.warnings() {
        println!("  warning [{}]: {}", warning.entity, warning.message);
    }
}

fn main() {
    scene_export::foundation::logging::init();

    let mut geometry = DemoGeometry::default();
    let mut lights = DemoLights;
    let mut materials = DemoMaterials;
    let mut session = ExportSession::new(ExportSettings::default());
    let mut log = ExportLog::new();
    let cancel = CancelToken::new();

    let mut scene = SceneSnapshot::from_placements(vec![
        Placement::new(cube_instance("Cube.001"), translation(0.0)),
        Placement::new(cube_instance("Cube.002"), translation(2.0)),
        Placement::new(
            Object::new("Sun", ObjectKind::Light, Some(DataId("SunData".into()))),
            translation(10.0),
        ),
        Placement::new(Object::new("Anchor", ObjectKind::Empty, None), Mat4::identity()),
    ]);

    // First run: both cubes share one geometry conversion
    let mut props = SceneProperties::new();
    let mut ctx = ExportContext {
        geometry: &mut geometry,
        lights: &mut lights,
        materials: &mut materials,
        props: &mut props,
        log: &mut log,
    };
    let status = session.first_run(&scene, &mut ctx, &cancel);
    assert_eq!(status, ExportStatus::Completed);
    print_pass("first run", &session, &props, &log);

    // Incremental pass: move one cube, edit the shared mesh
    scene.placements[0].world_transform = translation(5.0);
    scene.updates.push(SceneUpdate {
        object: cube_instance("Cube.001"),
        flags: UpdateFlags::GEOMETRY,
        world_transform: translation(5.0),
    });

    let mut props = SceneProperties::new();
    let mut ctx = ExportContext {
        geometry: &mut geometry,
        lights: &mut lights,
        materials: &mut materials,
        props: &mut props,
        log: &mut log,
    };
    let status = session.update(&scene, &mut ctx, &cancel);
    assert_eq!(status, ExportStatus::Completed);
    print_pass("incremental update", &session, &props, &log);

    println!("total geometry conversions: {}", geometry.conversions);
}
