use clap::Subcommand;
use std::path::PathBuf;

pub mod inspect;
pub mod roundtrip;
pub mod unpack;

#[derive(Subcommand)]
pub enum Commands {
    /// Show the container layout and contents of a GLB or glTF file
    Inspect {
        /// GLB or glTF file
        file: PathBuf,
    },

    /// Import a model and export it again
    Roundtrip {
        /// Source GLB or glTF file
        input: PathBuf,

        /// Output file (.glb, or .gltf for JSON plus .bin)
        output: PathBuf,

        /// Detach leaf nodes without mesh, joint or humanoid role
        #[arg(long)]
        prune: bool,

        /// Rename nodes with a humanoid role to the role's name
        #[arg(long)]
        rename_humanoid: bool,

        /// Always store morph targets densely
        #[arg(long)]
        dense_morphs: bool,
    },

    /// Split a GLB into .gltf JSON and a sibling .bin file
    Unpack {
        /// Source GLB file
        input: PathBuf,

        /// Output .gltf file
        output: PathBuf,
    },
}

impl Commands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Inspect { file } => inspect::execute(file),
            Commands::Roundtrip {
                input,
                output,
                prune,
                rename_humanoid,
                dense_morphs,
            } => roundtrip::execute(
                input,
                output,
                roundtrip::RoundtripFlags {
                    prune: *prune,
                    rename_humanoid: *rename_humanoid,
                    dense_morphs: *dense_morphs,
                },
            ),
            Commands::Unpack { input, output } => unpack::execute(input, output),
        }
    }
}
