use anyhow::Result;

pub mod pipeline;
pub mod stages;

use gbforge_core::SourceUnit;
use std::path::Path;
use unicase::UniCase;
use walkdir::WalkDir;

/// Deterministic discovery:
/// - Walks `root` (a directory tree or a single file)
/// - Keeps regular `.asm` files, silently skips everything else
/// - Sorts by path (case-insensitive stable order) for reproducible logs
pub fn discover(root: &Path) -> Result<Vec<SourceUnit>> {
    let mut units: Vec<SourceUnit> = vec![];

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(unit) = SourceUnit::from_path(entry.into_path()) {
            units.push(unit);
        }
    }

    units.sort_by(|a, b| {
        let aa = a.path().to_string_lossy();
        let bb = b.path().to_string_lossy();
        UniCase::new(&*aa)
            .cmp(&UniCase::new(&*bb))
            .then_with(|| a.path().cmp(b.path()))
    });

    Ok(units)
}
