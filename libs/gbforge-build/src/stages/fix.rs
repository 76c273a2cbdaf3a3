use anyhow::{Context, Result};
use std::process::{Command, ExitStatus};

use gbforge_core::{SourceUnit, Toolchain, PAD_BYTE};

/// FixStage: rgbfix patches the ROM header in place (`-v` recomputes the
/// checksums, `-p` pads unused space with the fixed fill byte).
pub struct FixStage;

impl FixStage {
    pub fn run(tc: &Toolchain, unit: &SourceUnit) -> Result<ExitStatus> {
        Command::new(&tc.rgbfix)
            .arg("-v")
            .arg("-p")
            .arg(PAD_BYTE)
            .arg(unit.image_path())
            .status()
            .with_context(|| format!("failed to run header fixer '{}'", tc.rgbfix.display()))
    }
}
