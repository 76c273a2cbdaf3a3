use anyhow::{Context, Result};
use std::process::{Command, ExitStatus};

use gbforge_core::{SourceUnit, Toolchain};

/// LinkStage: rgblink turns the intermediate object into the ROM image.
pub struct LinkStage;

impl LinkStage {
    pub fn run(tc: &Toolchain, unit: &SourceUnit) -> Result<ExitStatus> {
        Command::new(&tc.rgblink)
            .arg("-o")
            .arg(unit.image_path())
            .arg(unit.object_path())
            .status()
            .with_context(|| format!("failed to run linker '{}'", tc.rgblink.display()))
    }
}
