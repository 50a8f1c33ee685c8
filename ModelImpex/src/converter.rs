//! Entry points for hosts: GLB/glTF import and export, and mesh conversion.

use std::path::Path;

use crate::accessor::BufferReader;
use crate::error::Result;
use crate::formats::gltf::GltfDocument;
use crate::formats::{is_glb, parse_glb, write_glb};
use crate::options::{ExportOptions, ImportOptions};
use crate::progress::{ImpexPhase, ImpexProgress, ImpexProgressCallback};
use crate::scene::SceneGraph;

pub use crate::mesh::{
    convert_facemesh_to_submesh, convert_facemesh_to_submesh_with_axis, convert_submesh_to_host_mesh,
    convert_submesh_to_host_mesh_with_axis,
};

/// Import a GLB container or `.gltf` JSON from memory.
///
/// The format is detected from the GLB magic. External buffer files cannot
/// be resolved from memory; use [`import_path`] for those.
///
/// # Errors
/// Returns an error if the data is malformed or references missing buffers.
pub fn import_bytes(data: &[u8]) -> Result<SceneGraph> {
    import_bytes_with_options(data, &ImportOptions::default())
}

/// [`import_bytes`] with explicit options.
///
/// # Errors
/// See [`import_bytes`].
pub fn import_bytes_with_options(data: &[u8], options: &ImportOptions) -> Result<SceneGraph> {
    import_bytes_with_progress(data, options, &|_| {})
}

/// [`import_bytes`] with explicit options and a progress callback.
///
/// # Errors
/// See [`import_bytes`].
pub fn import_bytes_with_progress(
    data: &[u8],
    options: &ImportOptions,
    progress: ImpexProgressCallback,
) -> Result<SceneGraph> {
    import_impl(data, None, options, progress)
}

/// Import a `.glb` or `.gltf` file; relative buffer URIs are resolved next
/// to it.
///
/// # Errors
/// Returns an error if the file cannot be read or the data is malformed.
pub fn import_path(path: &Path) -> Result<SceneGraph> {
    import_path_with_options(path, &ImportOptions::default())
}

/// [`import_path`] with explicit options.
///
/// # Errors
/// See [`import_path`].
pub fn import_path_with_options(path: &Path, options: &ImportOptions) -> Result<SceneGraph> {
    import_path_with_progress(path, options, &|_| {})
}

/// [`import_path`] with explicit options and a progress callback.
///
/// # Errors
/// See [`import_path`].
pub fn import_path_with_progress(
    path: &Path,
    options: &ImportOptions,
    progress: ImpexProgressCallback,
) -> Result<SceneGraph> {
    progress(&ImpexProgress::with_item(ImpexPhase::ReadingFile, 0, 1, path.display().to_string()));
    let data = std::fs::read(path)?;
    import_impl(&data, path.parent(), options, progress)
}

fn import_impl(
    data: &[u8],
    base_dir: Option<&Path>,
    options: &ImportOptions,
    progress: ImpexProgressCallback,
) -> Result<SceneGraph> {
    progress(&ImpexProgress::new(ImpexPhase::ReadingFile, 1, 1));
    let (json, bin) = if is_glb(data) {
        let glb = parse_glb(data)?;
        (glb.json, Some(glb.bin))
    } else {
        (data, None)
    };
    let document = GltfDocument::from_slice(json)?;

    progress(&ImpexProgress::new(ImpexPhase::ResolvingBuffers, 0, document.buffers.len()));
    let reader = BufferReader::resolve(&document, bin, base_dir)?;

    let graph = SceneGraph::from_gltf_with_progress(&reader, options, progress)?;
    progress(&ImpexProgress::new(ImpexPhase::Complete, 1, 1));
    Ok(graph)
}

/// Export a scene as GLB bytes.
///
/// # Errors
/// Returns an error if a mesh cannot be converted or the container would
/// exceed 4 GiB.
pub fn export_glb(graph: &SceneGraph) -> Result<Vec<u8>> {
    export_glb_with_options(graph, &ExportOptions::default())
}

/// [`export_glb`] with explicit options.
///
/// # Errors
/// See [`export_glb`].
pub fn export_glb_with_options(graph: &SceneGraph, options: &ExportOptions) -> Result<Vec<u8>> {
    export_glb_with_progress(graph, options, &|_| {})
}

/// [`export_glb`] with explicit options and a progress callback.
///
/// # Errors
/// See [`export_glb`].
pub fn export_glb_with_progress(
    graph: &SceneGraph,
    options: &ExportOptions,
    progress: ImpexProgressCallback,
) -> Result<Vec<u8>> {
    let (document, blob) = graph.to_gltf_with_progress(options, progress)?;

    progress(&ImpexProgress::new(ImpexPhase::WritingOutput, 1, 1));
    let glb = write_glb(&document.to_vec()?, &blob)?;

    progress(&ImpexProgress::new(ImpexPhase::Complete, 1, 1));
    Ok(glb)
}

/// Export a scene to a `.glb` file.
///
/// # Errors
/// See [`export_glb`]; also fails if the file cannot be written.
pub fn export_glb_file(graph: &SceneGraph, path: &Path) -> Result<()> {
    export_glb_file_with_options(graph, path, &ExportOptions::default())
}

/// [`export_glb_file`] with explicit options.
///
/// # Errors
/// See [`export_glb_file`].
pub fn export_glb_file_with_options(graph: &SceneGraph, path: &Path, options: &ExportOptions) -> Result<()> {
    export_glb_file_with_progress(graph, path, options, &|_| {})
}

/// [`export_glb_file`] with explicit options and a progress callback.
///
/// # Errors
/// See [`export_glb_file`].
pub fn export_glb_file_with_progress(
    graph: &SceneGraph,
    path: &Path,
    options: &ExportOptions,
    progress: ImpexProgressCallback,
) -> Result<()> {
    let glb = export_glb_with_progress(graph, options, progress)?;
    std::fs::write(path, glb)?;
    Ok(())
}

/// Export a scene as `.gltf` JSON plus a sibling `.bin` file named after it.
///
/// # Errors
/// See [`export_glb`]; also fails if either file cannot be written.
pub fn export_gltf_files(graph: &SceneGraph, path: &Path) -> Result<()> {
    export_gltf_files_with_options(graph, path, &ExportOptions::default())
}

/// [`export_gltf_files`] with explicit options.
///
/// # Errors
/// See [`export_gltf_files`].
pub fn export_gltf_files_with_options(graph: &SceneGraph, path: &Path, options: &ExportOptions) -> Result<()> {
    export_gltf_files_with_progress(graph, path, options, &|_| {})
}

/// [`export_gltf_files`] with explicit options and a progress callback.
///
/// # Errors
/// See [`export_gltf_files`].
pub fn export_gltf_files_with_progress(
    graph: &SceneGraph,
    path: &Path,
    options: &ExportOptions,
    progress: ImpexProgressCallback,
) -> Result<()> {
    let (document, blob) = graph.to_gltf_with_progress(options, progress)?;
    let mut document = serde_json::to_value(&document)?;

    progress(&ImpexProgress::with_item(ImpexPhase::WritingOutput, 1, 1, path.display().to_string()));
    write_gltf_pair(&mut document, &blob, path)?;

    progress(&ImpexProgress::new(ImpexPhase::Complete, 1, 1));
    Ok(())
}

/// Point the buffer backed by the binary chunk at `<stem>.bin` next to
/// `path` and write both files.
///
/// The document is edited as raw JSON, so properties this crate does not
/// model (images, animations, extras) are written back untouched.
///
/// # Errors
/// Returns an error if either file cannot be written.
pub fn write_gltf_pair(document: &mut serde_json::Value, blob: &[u8], path: &Path) -> Result<()> {
    let chunk_buffer = document
        .get_mut("buffers")
        .and_then(serde_json::Value::as_array_mut)
        .and_then(|buffers| buffers.iter_mut().find_map(|b| b.as_object_mut().filter(|b| !b.contains_key("uri"))));
    if let Some(buffer) = chunk_buffer {
        let bin_path = path.with_extension("bin");
        let uri = bin_path
            .file_name()
            .map_or_else(|| "buffer.bin".to_string(), |name| name.to_string_lossy().into_owned());
        buffer.insert("uri".to_string(), uri.into());
        std::fs::write(&bin_path, blob)?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(&*document)?)?;
    Ok(())
}
