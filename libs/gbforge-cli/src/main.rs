use anyhow::Result;
use clap::Parser;
use gbforge_build::pipeline::Pipeline;
use gbforge_core::{BuildReport, Toolchain};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "gbforge", version, about = "Game Boy ROM build driver for the RGBDS toolchain")]
struct Cli {
    /// Recurse into each path and build every .asm file found.
    #[arg(long)]
    all: bool,

    /// Include search directory handed to rgbasm (defaults to each starting
    /// path's directory).
    #[arg(long)]
    include_dir: Option<PathBuf>,

    /// Emit the build reports as JSON (machine-readable).
    #[arg(long)]
    json: bool,

    /// Files or directories to build (defaults to the current directory).
    paths: Vec<PathBuf>,
}

/// rgbasm include lookups default to wherever the sources live, matching the
/// usual layout of hardware include files sitting next to the ROM sources.
fn default_include_dir(path: &Path) -> PathBuf {
    if path.is_dir() {
        return path.to_path_buf();
    }
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Resolved once at startup; the pipeline never touches ambient state.
    let toolchain = Toolchain::locate();

    let paths = if cli.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        cli.paths
    };

    let mut reports: Vec<BuildReport> = Vec::with_capacity(paths.len());
    for path in &paths {
        let include_dir = cli
            .include_dir
            .clone()
            .unwrap_or_else(|| default_include_dir(path));

        let mut pipe = Pipeline::new(toolchain.clone(), include_dir);
        pipe.quiet = cli.json;

        let report = if cli.all {
            let report = pipe.build_all(path)?;
            if report.ok && !cli.json {
                println!("OK: built {} file(s)", report.found);
            }
            report
        } else {
            let unit = pipe.build_file(path)?;
            BuildReport::single(path.clone(), unit)
        };
        reports.push(report);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    let failed: usize = reports
        .iter()
        .map(|r| r.units.iter().filter(|u| !u.ok()).count())
        .sum();
    if failed > 0 {
        anyhow::bail!("build failed: {failed} file(s) failed");
    }
    Ok(())
}
