use anyhow::Result;
use std::path::{Path, PathBuf};

use gbforge_core::{BuildReport, SourceUnit, StageKind, Toolchain, UnitReport, UnitStatus};

use crate::discover;
use crate::stages::assemble::AssembleStage;
use crate::stages::fix::FixStage;
use crate::stages::link::LinkStage;

/// Sequential build pipeline: assemble -> link -> fix, one unit at a time.
///
/// The toolchain is resolved by the caller and handed in, so tests can point
/// it at stub executables. `quiet` drops the operator status lines (used by
/// the machine-readable CLI output); the tools' own stdio always passes
/// through.
pub struct Pipeline {
    pub toolchain: Toolchain,
    pub include_dir: PathBuf,
    pub quiet: bool,
}

impl Pipeline {
    pub fn new(toolchain: Toolchain, include_dir: PathBuf) -> Self {
        Self {
            toolchain,
            include_dir,
            quiet: false,
        }
    }

    /// Build one source file through all three stages, stopping at the first
    /// failing stage. Artifacts from a failed attempt are left on disk.
    ///
    /// A stage exiting nonzero is a per-unit result, not an error; `Err` is
    /// reserved for environment problems such as a missing tool binary.
    pub fn build_file(&self, path: &Path) -> Result<UnitReport> {
        self.say(&format!("Compiling {}...", path.display()));

        let Some(unit) = SourceUnit::from_path(path.to_path_buf()) else {
            self.say(&format!(
                "ERR: {} is not a regular .asm file",
                path.display()
            ));
            return Ok(UnitReport {
                source: path.to_path_buf(),
                status: UnitStatus::InvalidInput,
            });
        };

        let status = AssembleStage::run(&self.toolchain, &self.include_dir, &unit)?;
        if !status.success() {
            return Ok(self.stage_failed(&unit, StageKind::Assemble, status.code()));
        }

        let status = LinkStage::run(&self.toolchain, &unit)?;
        if !status.success() {
            return Ok(self.stage_failed(&unit, StageKind::Link, status.code()));
        }

        let status = FixStage::run(&self.toolchain, &unit)?;
        if !status.success() {
            return Ok(self.stage_failed(&unit, StageKind::Fix, status.code()));
        }

        let image = unit.image_path();
        self.say(&format!("OK: built {}", image.display()));
        Ok(UnitReport {
            source: unit.path().to_path_buf(),
            status: UnitStatus::Built { image },
        })
    }

    /// Build every `.asm` file reachable under `root`. A failing unit never
    /// stops the batch; it only marks the aggregate result as failed.
    pub fn build_all(&self, root: &Path) -> Result<BuildReport> {
        let units = discover(root)?;
        self.say(&format!("Found {} file(s) to compile", units.len()));

        let mut reports = Vec::with_capacity(units.len());
        for unit in &units {
            reports.push(self.build_file(unit.path())?);
        }

        let ok = reports.iter().all(UnitReport::ok);
        Ok(BuildReport {
            root: root.to_path_buf(),
            found: reports.len(),
            units: reports,
            ok,
        })
    }

    fn stage_failed(&self, unit: &SourceUnit, stage: StageKind, code: Option<i32>) -> UnitReport {
        self.say(&format!(
            "ERR: {} failed for {}",
            stage.as_str(),
            unit.path().display()
        ));
        UnitReport {
            source: unit.path().to_path_buf(),
            status: UnitStatus::StageFailed { stage, code },
        }
    }

    fn say(&self, line: &str) {
        if !self.quiet {
            println!("{line}");
        }
    }
}
