//! `roundtrip` command

use std::path::Path;
use std::time::Instant;

use crate::converter::{export_glb_file_with_progress, export_gltf_files_with_progress, import_path_with_options};
use crate::options::{ExportOptions, ImportOptions};
use crate::progress::{ImpexPhase, ImpexProgress};

/// CLI switches of the `roundtrip` command
#[derive(Debug, Clone, Copy)]
pub struct RoundtripFlags {
    pub prune: bool,
    pub rename_humanoid: bool,
    pub dense_morphs: bool,
}

/// Import `input` and write it to `output` (GLB unless the extension is `gltf`).
pub fn execute(input: &Path, output: &Path, flags: RoundtripFlags) -> anyhow::Result<()> {
    let started = Instant::now();

    let import_options = ImportOptions::new()
        .with_prune_empty_leaves(flags.prune)
        .with_rename_humanoid_bones(flags.rename_humanoid);
    let graph = import_path_with_options(input, &import_options)?;
    println!(
        "Imported {}: {} nodes, {} meshes, {} skins",
        input.display(),
        graph.traverse_roots().count(),
        graph.meshes.len(),
        graph.skins.len()
    );

    let export_options = ExportOptions::new().with_sparse_morph_targets(!flags.dense_morphs);
    let report = |progress: &ImpexProgress| {
        if matches!(progress.phase, ImpexPhase::WritingMeshes | ImpexPhase::WritingOutput) {
            println!("  {progress}");
        }
    };

    let is_gltf = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gltf"));
    if is_gltf {
        export_gltf_files_with_progress(&graph, output, &export_options, &report)?;
    } else {
        export_glb_file_with_progress(&graph, output, &export_options, &report)?;
    }

    println!("Wrote {} in {:.2?}", output.display(), started.elapsed());
    Ok(())
}
