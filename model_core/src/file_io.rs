//! # Artifact Writer
//!
//! Puts rendered artifacts on disk with safety features:
//! - **Atomic writes**: write to `.tmp`, sync, rename, so a partial artifact
//!   never carries its final name
//! - **Directory locking**: two requests targeting the same output directory
//!   never interleave their files
//!
//! The lock is a `.bayline.lock` file inside the output directory holding
//! metadata about who holds it, plus an OS-level lock (fs2) on that file.
//!
//! ## Example
//!
//! ```rust,no_run
//! use model_core::config::GeneratorConfig;
//! use model_core::export::ExportBundle;
//! use model_core::file_io::write_artifacts;
//! use model_core::model::generate_model;
//! use model_core::params::BuildingParameters;
//! use std::path::Path;
//!
//! let config = GeneratorConfig::default();
//! let model = generate_model(&BuildingParameters::reference_building(), &config).unwrap();
//! let bundle = ExportBundle::render(&model, &config.export, "reference").unwrap();
//! let paths = write_artifacts(&bundle, Path::new("exports"), "engineer").unwrap();
//! assert_eq!(paths.len(), 2);
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{GenError, GenResult};
use crate::export::{Artifact, ExportBundle};
use crate::params::NormalizedParameters;

/// Lock file name inside an output directory
pub const LOCK_FILE_NAME: &str = ".bayline.lock";

/// Locks older than this are taken over regardless of holder
const STALE_LOCK_HOURS: i64 = 1;

/// Lock file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Who requested the export
    pub holder: String,
    /// Machine name where the lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(holder: impl Into<String>) -> Self {
        LockInfo {
            holder: holder.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive lock on an output directory, released on drop.
pub struct OutputLock {
    lock_path: PathBuf,
    /// Keeps the OS-level lock
    _lock_file: File,
    pub info: LockInfo,
}

impl OutputLock {
    /// Acquire the lock on `dir`.
    ///
    /// Fails with `ExportLocked` while another live holder has it. Stale
    /// locks (dead process on this machine, or older than an hour) are taken
    /// over.
    pub fn acquire(dir: &Path, holder: impl Into<String>) -> GenResult<Self> {
        let lock_path = dir.join(LOCK_FILE_NAME);
        let info = LockInfo::new(holder);

        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                if !is_lock_stale(&existing) {
                    return Err(GenError::export_locked(
                        dir.display().to_string(),
                        format!("{} ({}, pid {})", existing.holder, existing.machine, existing.pid),
                        existing.locked_at.to_rfc3339(),
                    ));
                }
                log::warn!(
                    "Taking over stale export lock on {} held by {} since {}",
                    dir.display(),
                    existing.holder,
                    existing.locked_at.to_rfc3339()
                );
            }
        }

        // Existing metadata is only replaced once the OS lock is ours
        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| GenError::export("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            GenError::export_locked(dir.display().to_string(), "another process", "unknown")
        })?;
        lock_file
            .set_len(0)
            .and_then(|_| lock_file.seek(SeekFrom::Start(0)))
            .map_err(|e| GenError::export("reset lock", lock_path.display().to_string(), e.to_string()))?;

        let lock_json = serde_json::to_string_pretty(&info)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(|e| GenError::export("write lock", lock_path.display().to_string(), e.to_string()))?;
        lock_file
            .sync_all()
            .map_err(|e| GenError::export("sync lock", lock_path.display().to_string(), e.to_string()))?;

        Ok(OutputLock {
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current live holder of `dir`, if any
    pub fn check(dir: &Path) -> Option<LockInfo> {
        let lock_path = dir.join(LOCK_FILE_NAME);
        if lock_path.exists() {
            if let Ok(info) = read_lock_info(&lock_path) {
                if !is_lock_stale(&info) {
                    return Some(info);
                }
            }
        }
        None
    }
}

impl Drop for OutputLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn read_lock_info(lock_path: &Path) -> GenResult<LockInfo> {
    let mut contents = String::new();
    File::open(lock_path)
        .and_then(|mut f| f.read_to_string(&mut contents))
        .map_err(|e| GenError::export("read lock", lock_path.display().to_string(), e.to_string()))?;
    Ok(serde_json::from_str(&contents)?)
}

/// A lock is stale when its process is gone (same machine) or it is old
fn is_lock_stale(info: &LockInfo) -> bool {
    if let Some(our_machine) = hostname() {
        if info.machine == our_machine {
            #[cfg(windows)]
            {
                use std::process::Command;
                let output = Command::new("tasklist")
                    .args(["/FI", &format!("PID eq {}", info.pid), "/NH"])
                    .output();
                if let Ok(output) = output {
                    let stdout = String::from_utf8_lossy(&output.stdout);
                    if stdout.contains("No tasks") || !stdout.contains(&info.pid.to_string()) {
                        return true;
                    }
                }
            }
            #[cfg(unix)]
            {
                if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                    return true;
                }
            }
        }
    }

    let age = Utc::now() - info.locked_at;
    age.num_hours() >= STALE_LOCK_HOURS
}

/// Temporary path an artifact is staged under
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write one file atomically: `.tmp`, fsync, rename.
///
/// On any failure the temporary file is removed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> GenResult<()> {
    let tmp_path = tmp_path_for(path);
    let tmp_display = tmp_path.display().to_string();

    let result = (|| {
        let mut tmp_file = File::create(&tmp_path)
            .map_err(|e| GenError::export("create temp file", tmp_display.clone(), e.to_string()))?;
        tmp_file
            .write_all(contents)
            .map_err(|e| GenError::export("write temp file", tmp_display.clone(), e.to_string()))?;
        tmp_file
            .sync_all()
            .map_err(|e| GenError::export("sync temp file", tmp_display.clone(), e.to_string()))?;
        fs::rename(&tmp_path, path)
            .map_err(|e| GenError::export("rename to final", path.display().to_string(), e.to_string()))
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// Check a caller-supplied artifact stem names a file directly inside the
/// output directory.
pub fn validate_stem(stem: &str) -> GenResult<()> {
    let reason = if stem.trim().is_empty() {
        Some("Stem must not be empty")
    } else if stem.contains(['/', '\\', ':', '\0']) {
        Some("Stem must not contain path separators")
    } else if stem == "." || stem == ".." {
        Some("Stem must not refer to a directory")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(GenError::validation("stem", stem, reason)),
        None => Ok(()),
    }
}

/// True when `name` is a single normal path component
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(c)), None) if c == name
    )
}

/// Write a bundle into `dir` under the directory lock.
///
/// Returns the final paths only once every artifact has been renamed into
/// place; if one fails, artifacts of this bundle already written are removed.
pub fn write_artifacts(bundle: &ExportBundle, dir: &Path, holder: &str) -> GenResult<Vec<PathBuf>> {
    for artifact in bundle.artifacts() {
        if !is_plain_file_name(&artifact.file_name) {
            return Err(GenError::export(
                "resolve artifact path",
                artifact.file_name.clone(),
                "Artifact name must be a plain file name",
            ));
        }
    }

    fs::create_dir_all(dir)
        .map_err(|e| GenError::export("create output directory", dir.display().to_string(), e.to_string()))?;
    let _lock = OutputLock::acquire(dir, holder)?;

    let mut written = Vec::new();
    for Artifact { file_name, contents } in bundle.artifacts() {
        let path = dir.join(file_name);
        if let Err(e) = write_atomic(&path, contents) {
            for done in &written {
                let _ = fs::remove_file(done);
            }
            return Err(e);
        }
        log::info!("Wrote {} ({} bytes)", path.display(), contents.len());
        written.push(path);
    }
    Ok(written)
}

/// Metres with at most two decimals and no trailing zeros
fn stem_dimension(value_m: f64) -> String {
    let text = format!("{:.2}", value_m);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Default artifact stem, e.g. `shear_wall_7floors_30x12m_20260114_093000`
pub fn default_stem(params: &NormalizedParameters, now: DateTime<Local>) -> String {
    format!(
        "{}_{}floors_{}x{}m_{}",
        params.structural_system.code(),
        params.floors,
        stem_dimension(params.length_m),
        stem_dimension(params.width_m),
        now.format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::Artifact;
    use crate::params::{normalize, BuildingParameters};
    use chrono::TimeZone;

    fn bundle() -> ExportBundle {
        ExportBundle {
            drawing: Artifact {
                file_name: "model.dxf".into(),
                contents: b"  0\nEOF\n".to_vec(),
            },
            tables: Artifact {
                file_name: "model_tables.json".into(),
                contents: b"{}\n".to_vec(),
            },
        }
    }

    #[test]
    fn test_tmp_path() {
        assert_eq!(tmp_path_for(Path::new("/out/a.dxf")), Path::new("/out/a.dxf.tmp"));
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("engineer");
        assert_eq!(info.holder, "engineer");
        assert!(info.pid > 0);
    }

    #[test]
    fn test_write_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let paths = write_artifacts(&bundle(), &out, "test").unwrap();

        assert_eq!(paths, [out.join("model.dxf"), out.join("model_tables.json")]);
        assert_eq!(fs::read_to_string(&paths[1]).unwrap(), "{}\n");
        assert!(!out.join("model.dxf.tmp").exists());
        // lock released on return
        assert!(!out.join(LOCK_FILE_NAME).exists());
    }

    #[test]
    fn test_held_lock_rejects_second_writer() {
        let dir = tempfile::tempdir().unwrap();
        let lock = OutputLock::acquire(dir.path(), "first").unwrap();
        assert_eq!(OutputLock::check(dir.path()).unwrap().holder, "first");

        match write_artifacts(&bundle(), dir.path(), "second") {
            Err(e) => {
                assert_eq!(e.error_code(), "EXPORT_LOCKED");
                assert!(e.is_recoverable());
            }
            Ok(_) => panic!("expected the directory to be locked"),
        }
        assert!(!dir.path().join("model.dxf").exists());

        drop(lock);
        assert!(OutputLock::check(dir.path()).is_none());
        assert!(write_artifacts(&bundle(), dir.path(), "second").is_ok());
    }

    #[test]
    fn test_stale_lock_taken_over() {
        let dir = tempfile::tempdir().unwrap();
        let stale = LockInfo {
            holder: "ghost".into(),
            machine: "elsewhere".into(),
            pid: 1,
            locked_at: Utc::now() - chrono::Duration::hours(3),
        };
        fs::write(dir.path().join(LOCK_FILE_NAME), serde_json::to_string(&stale).unwrap()).unwrap();
        let lock = OutputLock::acquire(dir.path(), "fresh").unwrap();
        assert_eq!(lock.info.holder, "fresh");
    }

    #[test]
    fn test_failed_write_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        // target is an existing directory, so the rename fails
        let target = dir.path().join("occupied");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        assert!(write_atomic(&target, b"data").is_err());
        assert!(!dir.path().join("occupied.tmp").exists());
    }

    #[test]
    fn test_default_stem() {
        let params = normalize(&BuildingParameters {
            floors: 7,
            length: 30.0,
            width: 12.0,
            floor_height: 3.5,
            wall_thickness: 0.25,
            ..BuildingParameters::default()
        })
        .unwrap();
        let now = Local.with_ymd_and_hms(2026, 1, 14, 9, 30, 0).unwrap();
        assert_eq!(default_stem(&params, now), "shear_wall_7floors_30x12m_20260114_093000");
    }

    #[test]
    fn test_default_stem_rounds_converted_dimensions() {
        let params = normalize(&BuildingParameters {
            units: crate::units::LengthUnit::Feet,
            length: 98.0,
            width: 40.0,
            floor_height: 12.0,
            wall_thickness: 1.0,
            ..BuildingParameters::default()
        })
        .unwrap();
        let now = Local.with_ymd_and_hms(2026, 1, 14, 9, 30, 0).unwrap();
        assert_eq!(default_stem(&params, now), "shear_wall_10floors_29.87x12.19m_20260114_093000");
    }

    #[test]
    fn test_stem_must_stay_in_output_dir() {
        for stem in ["../escaped", "/abs/x", "a/b", "a\\b", "..", "", "C:x"] {
            match validate_stem(stem) {
                Err(GenError::Validation { field, .. }) => assert_eq!(field, "stem"),
                other => panic!("stem {:?} accepted: {:?}", stem, other),
            }
        }
        assert!(validate_stem("tower_v2.final").is_ok());
    }

    #[test]
    fn test_escaping_artifact_name_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut escaping = bundle();
        escaping.drawing.file_name = "../escaped.dxf".into();

        let err = write_artifacts(&escaping, &out, "test").unwrap_err();
        assert_eq!(err.error_code(), "EXPORT_ERROR");
        assert!(!dir.path().join("escaped.dxf").exists());
        assert!(!out.exists());
    }

    #[test]
    fn test_locked_file_metadata_survives_failed_acquire() {
        let dir = tempfile::tempdir().unwrap();
        let lock_path = dir.path().join(LOCK_FILE_NAME);
        fs::write(&lock_path, "held by another tool").unwrap();
        let holder = File::open(&lock_path).unwrap();
        holder.lock_exclusive().unwrap();

        match OutputLock::acquire(dir.path(), "second") {
            Err(e) => assert_eq!(e.error_code(), "EXPORT_LOCKED"),
            Ok(_) => panic!("expected the directory to be locked"),
        }
        assert_eq!(fs::read_to_string(&lock_path).unwrap(), "held by another tool");

        holder.unlock().unwrap();
        drop(holder);
        let lock = OutputLock::acquire(dir.path(), "second").unwrap();
        assert_eq!(read_lock_info(&lock_path).unwrap().holder, "second");
        drop(lock);
    }
}
