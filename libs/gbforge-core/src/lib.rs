use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extension a file must carry to count as a compilable source unit.
pub const SOURCE_EXT: &str = "asm";
/// Extension of the intermediate object artifact written by the assembler.
pub const OBJECT_EXT: &str = "o";
/// Extension of the final ROM image written by the linker.
pub const IMAGE_EXT: &str = "gb";
/// Pad value handed to rgbfix; unused ROM space is filled with this byte.
pub const PAD_BYTE: &str = "0xFF";

/// Env var overriding the RGBDS install location (points tests at stubs).
pub const TOOLCHAIN_HOME_VAR: &str = "GBFORGE_RGBDS_HOME";

/// One assembly source file eligible for compilation.
///
/// Construction validates the invariant: only regular files with the `.asm`
/// extension become units, so nothing downstream ever runs a tool against a
/// directory or a stray `.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    path: PathBuf,
}

impl SourceUnit {
    /// Returns `None` unless `path` is a regular `.asm` file.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let is_asm = path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXT);
        if !is_asm || !path.is_file() {
            return None;
        }
        Some(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Intermediate object artifact: `D/S.asm` -> `D/S.o`.
    pub fn object_path(&self) -> PathBuf {
        self.path.with_extension(OBJECT_EXT)
    }

    /// Final ROM image artifact: `D/S.asm` -> `D/S.gb`.
    pub fn image_path(&self) -> PathBuf {
        self.path.with_extension(IMAGE_EXT)
    }
}

/// Resolved locations of the three RGBDS executables.
///
/// Resolved once at startup and handed into the pipeline, never read from
/// ambient state after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub rgbasm: PathBuf,
    pub rgblink: PathBuf,
    pub rgbfix: PathBuf,
}

impl Toolchain {
    /// Resolves the three tool binaries under `home`.
    pub fn from_home(home: &Path) -> Self {
        Self {
            rgbasm: home.join(exe_name("rgbasm")),
            rgblink: home.join(exe_name("rgblink")),
            rgbfix: home.join(exe_name("rgbfix")),
        }
    }

    /// Platform-dependent default install location, overridable via
    /// `GBFORGE_RGBDS_HOME`.
    pub fn locate() -> Self {
        if let Some(home) = std::env::var_os(TOOLCHAIN_HOME_VAR) {
            return Self::from_home(Path::new(&home));
        }
        Self::from_home(&default_home())
    }
}

fn exe_name(base: &str) -> String {
    if cfg!(windows) {
        format!("{base}.exe")
    } else {
        base.to_string()
    }
}

fn default_home() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("external/rgbds_bin")
    } else {
        PathBuf::from("build/external/rgbds/src")
    }
}

/// One external-tool invocation within the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageKind {
    Assemble,
    Link,
    Fix,
}

impl StageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Assemble => "assemble",
            StageKind::Link => "link",
            StageKind::Fix => "fix",
        }
    }
}

/// Outcome of building one source unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitStatus {
    /// Not a regular file, or the extension is not `.asm`. No tool was run.
    InvalidInput,
    /// The named stage exited nonzero; later stages were skipped.
    StageFailed {
        stage: StageKind,
        code: Option<i32>,
    },
    /// All three stages completed and the image was written.
    Built { image: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitReport {
    pub source: PathBuf,
    pub status: UnitStatus,
}

impl UnitReport {
    pub fn ok(&self) -> bool {
        matches!(self.status, UnitStatus::Built { .. })
    }
}

/// Aggregate result over every unit discovered under one starting path.
/// `ok` holds only when every unit succeeded (trivially true for zero units).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub root: PathBuf,
    pub found: usize,
    pub units: Vec<UnitReport>,
    pub ok: bool,
}

impl BuildReport {
    /// Wraps a lone unit result so single-file mode reports the same shape.
    pub fn single(root: PathBuf, unit: UnitReport) -> Self {
        let ok = unit.ok();
        Self {
            root,
            found: 1,
            units: vec![unit],
            ok,
        }
    }
}
