/// End-to-end runs of the preparation tools against the in-memory scene
use approx::assert_abs_diff_eq;
use nalgebra::{Matrix4, Vector3};

use kbdprep_core::config::PROJECTION_CAMERA_NAME;
use kbdprep_core::{
    run, Direction, EditMode, InitializeModel, LimitedDissolve, Mesh, MeshMutate, ProjectUv,
    Scene, SceneGraph, Transform,
};

/// Two 40 unit cubes side by side, both resting on z = -120
fn keyboard_parts() -> Mesh {
    let mut left = Mesh::cube(40.0);
    left.transform(&Matrix4::new_translation(&Vector3::new(0.0, 0.0, -100.0)));
    let mut right = Mesh::cube(40.0);
    right.transform(&Matrix4::new_translation(&Vector3::new(100.0, 0.0, -100.0)));
    left.append(&right);
    left
}

fn binary_stl(mesh: &Mesh) -> Vec<u8> {
    let mut data = vec![0u8; 80];
    data.extend_from_slice(&(mesh.face_count() as u32).to_le_bytes());
    for face in &mesh.faces {
        data.extend_from_slice(&[0u8; 12]);
        for &v in &face.vertices {
            let p = mesh.positions[v];
            for c in [p.x, p.y, p.z] {
                data.extend_from_slice(&(c as f32).to_le_bytes());
            }
        }
        data.extend_from_slice(&[0u8; 2]);
    }
    data
}

fn lowest_z(scene: &Scene, object: kbdprep_core::ObjectId) -> f64 {
    let (min, _) = scene.object_mesh(object).unwrap().bounds().unwrap();
    min.z
}

#[test]
fn normalize_splits_and_grounds_parts() {
    let mut scene = Scene::new();
    let model = scene.add_mesh_object("Case", keyboard_parts());
    scene.select_only(model);

    let report = run(&mut InitializeModel, &mut scene).unwrap();
    assert_eq!(report.message, "Initialized 'Case' into 2 part(s)");

    let parts: Vec<_> = scene.objects().collect();
    assert_eq!(parts.len(), 2);
    for &part in &parts {
        assert!(scene.transform(part).unwrap().is_identity());
        assert_abs_diff_eq!(lowest_z(&scene, part), 0.0, epsilon = 1e-6);
        let (min, max) = scene.object_mesh(part).unwrap().bounds().unwrap();
        assert_abs_diff_eq!(max.z - min.z, 0.4, epsilon = 1e-9);
    }
    assert_eq!(scene.selected_objects().len(), 2);
}

#[test]
fn imported_stl_runs_through_every_tool() {
    let mut scene = Scene::new();
    let model = scene
        .import_stl("Plate", &binary_stl(&keyboard_parts()))
        .unwrap();
    assert_eq!(scene.object_mesh(model).unwrap().vertex_count(), 16);

    run(&mut InitializeModel, &mut scene).unwrap();
    let parts = scene.selected_objects();
    assert_eq!(parts.len(), 2);

    let report = run(&mut LimitedDissolve::from_settings(&scene.settings), &mut scene).unwrap();
    assert_eq!(report.message, "Dissolved 2 mesh(es): 24 -> 12 faces");
    let again = run(&mut LimitedDissolve::new(2.0), &mut scene).unwrap();
    assert_eq!(again.message, "Dissolved 2 mesh(es): 12 -> 12 faces");

    let target = parts[1];
    scene.select_only(target);
    scene.set_mode(EditMode::Edit);
    let mesh = scene.object_data(target).unwrap().mesh().unwrap();
    scene.mesh_mut(mesh).unwrap().select_all(true);

    for direction in Direction::ALL {
        run(&mut ProjectUv::new(direction), &mut scene).unwrap();
    }
    assert_eq!(scene.count_named(PROJECTION_CAMERA_NAME), 1);
    let faces = &scene.mesh(mesh).unwrap().faces;
    assert!(faces.iter().all(|f| f.uvs.as_ref().map(Vec::len) == Some(4)));
    assert!(scene.mesh_updates(mesh) > 0);
}

#[test]
fn normalize_refuses_edit_mode() {
    let mut scene = Scene::new();
    let model = scene.add_mesh_object("Case", keyboard_parts());
    scene.select_only(model);
    scene.set_mode(EditMode::Edit);

    assert!(run(&mut InitializeModel, &mut scene).is_err());
    assert_eq!(scene.object_count(), 1);
    assert_eq!(scene.transform(model).unwrap(), Transform::identity());
    let mesh = scene.object_data(model).unwrap().mesh().unwrap();
    assert_eq!(scene.load_mesh(mesh).unwrap(), keyboard_parts());
}
