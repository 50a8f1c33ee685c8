//! `inspect` command

use std::path::Path;

use anyhow::Context;

use crate::accessor::AccessorLayout;
use crate::formats::gltf::GltfDocument;
use crate::formats::{is_glb, parse_glb};

/// Print the GLB header, chunk sizes and document contents.
pub fn execute(path: &Path) -> anyhow::Result<()> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    println!("Inspecting: {}", path.display());
    println!();

    let json = if is_glb(&data) {
        let glb = parse_glb(&data)?;
        println!("GLB Container");
        println!("=============");
        println!("Total length: {} bytes", data.len());
        println!("JSON chunk:   {} bytes", glb.json.len());
        println!("BIN chunk:    {} bytes", glb.bin.len());
        println!();
        glb.json
    } else {
        println!("glTF JSON ({} bytes)", data.len());
        println!();
        data.as_slice()
    };
    let document = GltfDocument::from_slice(json)?;

    println!("Generator:  {}", document.asset.generator.as_deref().unwrap_or("(none)"));
    println!("Nodes:      {}", document.nodes.len());
    println!("Meshes:     {}", document.meshes.len());
    println!("Skins:      {}", document.skins.len());
    println!("Materials:  {}", document.materials.len());
    println!("Views:      {}", document.buffer_views.len());
    if !document.extensions_used.is_empty() {
        println!("Extensions: {}", document.extensions_used.join(", "));
    }
    println!();

    println!("Accessors ({}):", document.accessors.len());
    for (index, accessor) in document.accessors.iter().enumerate() {
        let layout = AccessorLayout::from_accessor(accessor)
            .map_or_else(|e| format!("invalid ({e})"), |layout| layout.to_string());
        let storage = match &accessor.sparse {
            Some(sparse) => format!("sparse, {} entries", sparse.count),
            None => "dense".to_string(),
        };
        println!(
            "  [{index:3}] {:<24} {:<20} x{:<7} {storage}",
            accessor.name.as_deref().unwrap_or("-"),
            layout,
            accessor.count
        );
    }

    Ok(())
}
