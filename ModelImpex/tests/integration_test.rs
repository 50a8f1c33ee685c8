//! Cross-module scenarios: host meshes through GLB and back.

use std::path::Path;

use modelimpex::coordinate::{flip_uv, zup_to_yup};
use modelimpex::formats::{GLB_MAGIC, parse_glb};
use modelimpex::prelude::*;
use pretty_assertions::assert_eq;

/// A Z-up unit quad skinned to two bones, with one morph target.
///
/// Group order deliberately differs from joint order, and an extra group
/// has no matching bone.
fn skinned_quad_scene() -> SceneGraph {
    let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
    let mut mesh = FaceMesh::new("quad", positions, vec![[0.0, 0.0, 1.0]; 4]).unwrap();
    mesh.add_triangle(0, [0, 1, 2], Some([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]), None)
        .unwrap();
    mesh.add_triangle(0, [0, 2, 3], Some([[0.0, 0.0], [1.0, 1.0], [0.0, 1.0]]), None)
        .unwrap();

    mesh.set_vertex_groups(vec!["tip".into(), "root".into(), "unused".into()]);
    mesh.add_vertex_weight(0, 1, 1.0).unwrap();
    mesh.add_vertex_weight(1, 1, 0.5).unwrap();
    mesh.add_vertex_weight(1, 0, 0.5).unwrap();
    mesh.add_vertex_weight(2, 0, 1.0).unwrap();
    mesh.add_vertex_weight(3, 0, 0.75).unwrap();
    mesh.add_vertex_weight(3, 2, 0.25).unwrap();

    let mut deltas = vec![[0.0; 3]; 4];
    deltas[2] = [0.0, 0.0, 0.5];
    mesh.add_morph_target("lift", deltas).unwrap();

    let mut scene = SceneGraph::new();
    let mesh_index = scene.add_mesh(mesh);
    scene.add_material(Material::new("skin"));

    let armature = scene.add_node(Node::new("armature"));
    let root = scene.add_node(Node::new("root"));
    let tip = scene.add_node(Node::new("tip").with_translation([0.0, 1.0, 0.0]));
    scene.add_child(armature, root).unwrap();
    scene.add_child(root, tip).unwrap();

    let skin = scene.add_skin(Skin::new("rig", vec![root, tip])).unwrap();
    let body = scene.add_node(Node::new("body").with_mesh(mesh_index).with_skin(skin));
    scene.add_child(armature, body).unwrap();
    scene
}

#[test]
fn test_glb_container_layout() {
    let glb = modelimpex::export_glb(&skinned_quad_scene()).unwrap();

    assert_eq!(&glb[..4], &GLB_MAGIC[..]);
    assert_eq!(glb.len() % 4, 0);
    let container = parse_glb(&glb).unwrap();
    assert_eq!(container.json.len() % 4, 0);
    assert_eq!(container.bin.len() % 4, 0);
}

#[test]
fn test_exported_glb_passes_independent_validation() {
    let glb = modelimpex::export_glb(&skinned_quad_scene()).unwrap();

    let (document, buffers, _images) = gltf::import_slice(&glb).unwrap();
    assert_eq!(document.meshes().count(), 1);
    assert_eq!(document.skins().count(), 1);
    assert_eq!(document.nodes().count(), 4);

    let mesh = document.meshes().next().unwrap();
    let primitive = mesh.primitives().next().unwrap();
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
    let positions: Vec<[f32; 3]> = reader.read_positions().unwrap().collect();
    assert_eq!(positions.len(), 4);
    assert_eq!(positions[2], zup_to_yup([1.0, 1.0, 0.0]));

    let joints: Vec<[u16; 4]> = reader.read_joints(0).unwrap().into_u16().collect();
    assert_eq!(joints[0], [0, 0, 0, 0]);
    assert_eq!(joints[2], [1, 0, 0, 0]);

    let morph = primitive.morph_targets().next().unwrap();
    assert!(morph.positions().unwrap().sparse().is_some());

    let skin = document.skins().next().unwrap();
    let joint_names: Vec<_> = skin.joints().map(|j| j.name().unwrap().to_string()).collect();
    assert_eq!(joint_names, vec!["root", "tip"]);
}

#[test]
fn test_skinned_round_trip() {
    let glb = modelimpex::export_glb(&skinned_quad_scene()).unwrap();
    let scene = modelimpex::import_bytes(&glb).unwrap();

    let mesh = scene.meshes[0].as_submesh().unwrap();
    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(mesh.vertices.normals[0], zup_to_yup([0.0, 0.0, 1.0]));
    assert_eq!(mesh.vertices.uvs[1], flip_uv([1.0, 0.0]));

    let joints = mesh.vertices.joints.as_ref().unwrap();
    let weights = mesh.vertices.weights.as_ref().unwrap();
    assert_eq!(joints[1], [0, 1, 0, 0]);
    assert_eq!(weights[1], [0.5, 0.5, 0.0, 0.0]);
    // The unmatched group is dropped and the rest renormalized
    assert_eq!(joints[3], [1, 0, 0, 0]);
    assert_eq!(weights[3], [1.0, 0.0, 0.0, 0.0]);

    assert_eq!(mesh.morph_targets[0].name, "lift");
    assert_eq!(mesh.morph_targets[0].deltas[2], zup_to_yup([0.0, 0.0, 0.5]));
    assert_eq!(mesh.morph_targets[0].deltas[0], [0.0; 3]);

    // Joint order survives, and the skin still points at the bone nodes
    let skin = &scene.skins[0];
    let names: Vec<_> = skin
        .joints
        .iter()
        .map(|&joint| scene.node(joint).unwrap().name.clone())
        .collect();
    assert_eq!(names, vec!["root", "tip"]);
    let inverse_tip = skin.inverse_bind_matrices.as_ref().unwrap()[1];
    assert_eq!(inverse_tip[13], -1.0);
}

#[test]
fn test_host_mesh_from_imported_scene() {
    let glb = modelimpex::export_glb(&skinned_quad_scene()).unwrap();
    let scene = modelimpex::import_bytes(&glb).unwrap();
    let host = convert_submesh_to_host_mesh(scene.meshes[0].as_submesh().unwrap()).unwrap();

    assert_eq!(host.positions[2], [1.0, 1.0, 0.0]);
    assert_eq!(host.normals[0], [0.0, 0.0, 1.0]);
    assert_eq!(host.uvs[2], [1.0, 1.0]);
    assert_eq!(host.indices, vec![[0, 1, 2], [0, 2, 3]]);
    assert_eq!(host.face_materials, vec![Some(0), Some(0)]);
}

#[test]
fn test_prune_on_import_keeps_joints() {
    let mut scene = skinned_quad_scene();
    let armature = scene.roots()[0];
    let empty = scene.add_node(Node::new("empty"));
    scene.add_child(armature, empty).unwrap();

    let glb = modelimpex::export_glb(&scene).unwrap();
    let options = ImportOptions::new().with_prune_empty_leaves(true);
    let imported = modelimpex::converter::import_bytes_with_options(&glb, &options).unwrap();

    let names: Vec<_> = imported
        .traverse_roots()
        .map(|id| imported.node(id).unwrap().name.clone())
        .collect();
    assert_eq!(names, vec!["armature", "root", "tip", "body"]);
}

#[test]
fn test_matrix_with_trs_is_a_format_error() {
    let json = br#"{
        "asset": {"version": "2.0"},
        "nodes": [{"matrix": [1,0,0,0, 0,1,0,0, 0,0,1,0, 0,0,0,1], "translation": [1,0,0]}]
    }"#;
    let error = modelimpex::import_bytes(json).unwrap_err();
    assert!(matches!(error, Error::NodeMatrixWithTrs { node: 0 }));
    assert_eq!(error.kind(), ErrorKind::Format);
}

#[test]
fn test_oversized_accessor_count_is_a_format_error() {
    let json = br#"{
        "asset": {"version": "2.0"},
        "accessors": [{"componentType": 5126, "count": 4611686018427387904, "type": "VEC3"}],
        "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}]
    }"#;
    let error = modelimpex::import_bytes(json).unwrap_err();
    assert!(matches!(error, Error::AccessorTooLarge { accessor: 0, .. }));
    assert_eq!(error.kind(), ErrorKind::Format);
}

#[test]
fn test_truncated_glb_is_rejected() {
    let glb = modelimpex::export_glb(&skinned_quad_scene()).unwrap();
    let error = modelimpex::import_bytes(&glb[..glb.len() - 3]).unwrap_err();
    assert!(matches!(error, Error::GlbTruncated { .. }));
}

#[test]
fn test_gltf_files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quad.gltf");
    modelimpex::export_gltf_files(&skinned_quad_scene(), &path).unwrap();

    assert!(dir.path().join("quad.bin").exists());
    let json = std::fs::read_to_string(&path).unwrap();
    assert!(json.contains(r#""uri": "quad.bin""#));

    let scene = modelimpex::import_path(&path).unwrap();
    assert_eq!(scene.meshes[0].as_submesh().unwrap().vertices.len(), 4);

    // Without a base directory the external buffer cannot be resolved
    let error = modelimpex::import_bytes(json.as_bytes()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Resource);
}

#[test]
fn test_glb_file_round_trip_with_progress() {
    use std::sync::Mutex;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quad.glb");
    modelimpex::export_glb_file(&skinned_quad_scene(), &path).unwrap();

    let phases = Mutex::new(Vec::new());
    let record = |progress: &ImpexProgress| phases.lock().unwrap().push(progress.phase);
    let scene =
        modelimpex::converter::import_path_with_progress(Path::new(&path), &ImportOptions::new(), &record)
            .unwrap();

    assert_eq!(scene.skins.len(), 1);
    let phases = phases.into_inner().unwrap();
    assert_eq!(phases.first(), Some(&ImpexPhase::ReadingFile));
    assert_eq!(phases.last(), Some(&ImpexPhase::Complete));
    assert!(phases.contains(&ImpexPhase::ReadingMeshes));
}
