//! `unpack` command

use std::path::Path;

use anyhow::Context;

use crate::converter::write_gltf_pair;
use crate::formats::parse_glb;

/// Write the JSON chunk of a GLB as `.gltf` and its BIN chunk as `.bin`.
pub fn execute(input: &Path, output: &Path) -> anyhow::Result<()> {
    let data = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let glb = parse_glb(&data)?;
    let mut document: serde_json::Value = serde_json::from_slice(glb.json)?;

    write_gltf_pair(&mut document, glb.bin, output)?;

    println!(
        "Unpacked {} -> {} ({} JSON bytes, {} BIN bytes)",
        input.display(),
        output.display(),
        glb.json.len(),
        glb.bin.len()
    );
    Ok(())
}
