use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, ExitStatus};

use gbforge_core::{SourceUnit, Toolchain};

/// AssembleStage:
/// - runs rgbasm over one source unit
/// - `-L` keeps debug line info, `-i` points at the shared hardware includes
/// - writes the intermediate object next to the source
///
/// Stdio is inherited, so the assembler's own diagnostics reach the operator
/// untouched.
pub struct AssembleStage;

impl AssembleStage {
    pub fn run(tc: &Toolchain, include_dir: &Path, unit: &SourceUnit) -> Result<ExitStatus> {
        Command::new(&tc.rgbasm)
            .arg("-L")
            .arg("-i")
            .arg(include_dir)
            .arg("-o")
            .arg(unit.object_path())
            .arg(unit.path())
            .status()
            .with_context(|| format!("failed to run assembler '{}'", tc.rgbasm.display()))
    }
}
