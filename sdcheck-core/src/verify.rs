use crate::crc::crc32;
use crate::manifest::{parse_manifest, ManifestRecord};
use crate::pattern::{fill_pattern, first_mismatch};
use crate::report::{CheckResult, Reporter, VerificationTally};
use crate::resolve::{resolve_entry, resolve_path, ResolveError};
use crate::results_log::scan_results_bytes;
use anyhow::Result;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Names the firmware uses on the card. Each is looked up case-insensitively.
#[derive(Clone, Debug)]
pub struct Layout {
    pub test_dir: String,
    pub results_file: String,
    pub manifest_file: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            test_dir: "__test__".into(),
            results_file: "results.txt".into(),
            manifest_file: "manifest.txt".into(),
        }
    }
}

/// Problems that stop verification before any check can run.
#[derive(Debug)]
pub enum SetupError {
    MountNotDirectory(PathBuf),
    TestDirMissing { root: PathBuf, name: String },
    /// Present but can't be listed (permissions, I/O error on the card).
    TestDirUnreadable { path: PathBuf, source: io::Error },
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::MountNotDirectory(p) => write!(f, "{} is not a directory", p.display()),
            SetupError::TestDirMissing { root, name } => {
                write!(f, "{} directory not found in {}", name, root.display())
            }
            SetupError::TestDirUnreadable { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::TestDirUnreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Check the mount point and find the firmware's test directory under it.
pub fn locate_test_dir(root: &Path, layout: &Layout) -> Result<PathBuf, SetupError> {
    if !root.is_dir() {
        return Err(SetupError::MountNotDirectory(root.to_path_buf()));
    }
    let missing = || SetupError::TestDirMissing { root: root.to_path_buf(), name: layout.test_dir.clone() };
    let dir = match resolve_entry(root, &layout.test_dir) {
        Ok(p) if p.is_dir() => p,
        Ok(_) => return Err(missing()),
        Err(ResolveError::Io { path, source }) => return Err(SetupError::TestDirUnreadable { path, source }),
        Err(_) => return Err(missing()),
    };
    if let Err(source) = fs::read_dir(&dir) {
        return Err(SetupError::TestDirUnreadable { path: dir, source });
    }
    Ok(dir)
}

/// Scan the firmware's own results log. A missing or unreadable log is
/// recorded as a failure.
pub fn verify_results_log<W: Write>(test_dir: &Path, layout: &Layout, rep: &mut Reporter<W>) -> Result<()> {
    let name = &layout.results_file;
    let path = match resolve_entry(test_dir, name) {
        Ok(p) => p,
        Err(e) => {
            return rep.record(CheckResult::fail(format!("{} exists", name), e.to_string()));
        }
    };
    let data = match fs::read(&path) {
        Ok(d) => d,
        Err(e) => {
            log::warn!("read {}: {}", path.display(), e);
            return rep.record(CheckResult::fail(format!("{} readable", name), e.to_string()));
        }
    };
    let summary = scan_results_bytes(&data);
    log::debug!(
        "{}: {} pass marker(s), {} fail marker(s)",
        path.display(),
        summary.pass_count,
        summary.fail_count
    );
    rep.record(CheckResult::pass(format!("{} has {} passes", name, summary.pass_count)))?;
    rep.check(format!("no failures in {}", name), summary.fail_count == 0, || {
        format!("found {} failures", summary.fail_count)
    })?;
    if summary.fail_count > 0 {
        rep.note("\n  Failed tests from firmware:")?;
        for line in &summary.failed_lines {
            rep.note(&format!("    {}", line))?;
        }
        rep.note("")?;
    }
    Ok(())
}

/// Parse the manifest and verify every record it lists.
pub fn verify_manifest<W: Write>(
    root: &Path,
    test_dir: &Path,
    layout: &Layout,
    rep: &mut Reporter<W>,
) -> Result<()> {
    let name = &layout.manifest_file;
    let path = match resolve_entry(test_dir, name) {
        Ok(p) => p,
        Err(e) => {
            rep.record(CheckResult::fail(format!("{} exists", name), e.to_string()))?;
            rep.note("\nCannot verify data files without manifest.")?;
            return Ok(());
        }
    };
    rep.record(CheckResult::pass(format!("{} exists", name)))?;
    let text = match fs::read(&path) {
        Ok(d) => String::from_utf8_lossy(&d).into_owned(),
        Err(e) => {
            rep.record(CheckResult::fail(format!("{} readable", name), e.to_string()))?;
            return Ok(());
        }
    };
    let lines = parse_manifest(&text);
    log::info!("{}: {} record line(s)", path.display(), lines.len());
    for parsed in lines {
        match parsed {
            Ok(rec) => verify_record(root, &rec, rep)?,
            Err(pe) => {
                log::debug!("manifest line {} rejected: {}", pe.line_no, pe);
                rep.record(CheckResult::fail(format!("parse manifest line: {}", pe.line), pe.to_string()))?
            }
        }
    }
    Ok(())
}

/// Size, then CRC, then byte-for-byte pattern. A missing file or a size
/// mismatch ends the record; CRC and pattern are both always reported.
pub fn verify_record<W: Write>(root: &Path, rec: &ManifestRecord, rep: &mut Reporter<W>) -> Result<()> {
    let path = match resolve_path(root, &rec.relative_path) {
        Ok(p) => p,
        Err(e) => {
            let detail = if e.is_not_found() { "file not found".to_string() } else { e.to_string() };
            return rep.record(CheckResult::fail(format!("{} exists", rec.relative_path), detail));
        }
    };
    let name = rec.file_name();
    let size_check = format!("{} size={}", name, rec.expected_size);

    let actual_size = match fs::metadata(&path) {
        Ok(m) if m.is_file() => m.len(),
        Ok(_) => return rep.record(CheckResult::fail(size_check, "not a regular file")),
        Err(e) => return rep.record(CheckResult::fail(size_check, format!("stat failed: {}", e))),
    };
    log::debug!("{}: {} bytes on disk", path.display(), actual_size);
    rep.check(size_check, actual_size == rec.expected_size, || format!("got {}", actual_size))?;
    if actual_size != rec.expected_size {
        return Ok(());
    }

    let data = match fs::read(&path) {
        Ok(d) if d.len() as u64 == rec.expected_size => d,
        Ok(d) => {
            return rep.record(CheckResult::fail(format!("{} read", name), format!("short read: got {} bytes", d.len())))
        }
        Err(e) => return rep.record(CheckResult::fail(format!("{} read", name), e.to_string())),
    };

    let actual_crc = crc32(&data);
    rep.check(format!("{} CRC32", name), actual_crc == rec.expected_crc, || {
        format!("expected 0x{:08X}, got 0x{:08X}", rec.expected_crc, actual_crc)
    })?;

    let expected = fill_pattern(data.len(), rec.seed);
    let res = match first_mismatch(&data, &expected) {
        None => CheckResult::pass(format!("{} pattern match", name)),
        Some(m) => CheckResult::fail(
            format!("{} pattern match", name),
            format!("first mismatch at byte {}: got 0x{:02X}, expected 0x{:02X}", m.offset, m.actual, m.expected),
        ),
    };
    rep.record(res)
}

/// Everything after setup: results log, then manifest and data files, then the
/// summary block. Only report-sink I/O errors are returned.
pub fn verify_all<W: Write>(
    root: &Path,
    test_dir: &Path,
    layout: &Layout,
    rep: &mut Reporter<W>,
) -> Result<VerificationTally> {
    rep.section("Firmware Results")?;
    verify_results_log(test_dir, layout, rep)?;
    rep.section("Data File Verification")?;
    verify_manifest(root, test_dir, layout, rep)?;
    rep.summary()
}
