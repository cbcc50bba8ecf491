use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub enum ResolveError {
    /// No entry matching `name` (in any case) under `parent`.
    NotFound { parent: PathBuf, name: String },
    /// An intermediate segment resolved to something that isn't a directory.
    NotADirectory(PathBuf),
    /// Absolute path or `..` traversal; never looked up.
    Unsafe(String),
    /// The parent exists but couldn't be listed.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NotFound { .. } => write!(f, "file not found"),
            ResolveError::NotADirectory(p) => write!(f, "not a directory: {}", p.display()),
            ResolveError::Unsafe(why) => write!(f, "unsafe path: {}", why),
            ResolveError::Io { path, source } => write!(f, "cannot list {}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. } | ResolveError::NotADirectory(_))
    }
}

/// Find `name` directly under `parent`, tolerating case folding.
///
/// The exact spelling wins if it exists. Otherwise the directory is listed and
/// matched on lowercased names, so the result is the same on case-sensitive and
/// case-insensitive hosts.
pub fn resolve_entry(parent: &Path, name: &str) -> Result<PathBuf, ResolveError> {
    let exact = parent.join(name);
    if exact.symlink_metadata().is_ok() {
        return Ok(exact);
    }
    let folded = folded_entries(parent)
        .map_err(|source| ResolveError::Io { path: parent.to_path_buf(), source })?;
    match folded.get(&name.to_lowercase()) {
        Some(actual) => {
            log::debug!("case-folded {:?} -> {:?} in {}", name, actual, parent.display());
            Ok(parent.join(actual))
        }
        None => Err(ResolveError::NotFound { parent: parent.to_path_buf(), name: name.to_string() }),
    }
}

/// Lowercase name -> on-disk name for every entry of `dir`. A missing `dir`
/// yields an empty map; any other listing error is returned. On collisions the
/// first name in sorted order wins.
fn folded_entries(dir: &Path) -> io::Result<HashMap<String, std::ffi::OsString>> {
    let mut map = HashMap::new();
    let walker = WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name();
    for ent in walker {
        let ent = match ent {
            Ok(e) => e,
            Err(e) => {
                let err = io::Error::from(e);
                if err.kind() == io::ErrorKind::NotFound {
                    return Ok(HashMap::new());
                }
                return Err(err);
            }
        };
        let actual = ent.file_name().to_os_string();
        let key = actual.to_string_lossy().to_lowercase();
        if let Some(prev) = map.get(&key) {
            log::warn!(
                "{}: {:?} and {:?} differ only in case; using {:?}",
                dir.display(),
                prev,
                actual,
                prev
            );
            continue;
        }
        map.insert(key, actual);
    }
    Ok(map)
}

/// Split a manifest path into segments. Accepts `/` or `\`; drops empty and
/// `.` segments; rejects absolute paths and parent traversal.
pub fn split_segments(rel: &str) -> Result<Vec<&str>, ResolveError> {
    if rel.starts_with('/') || rel.starts_with('\\') || Path::new(rel).is_absolute() {
        return Err(ResolveError::Unsafe(format!("absolute paths are not allowed: {:?}", rel)));
    }
    if rel.as_bytes().get(1) == Some(&b':') {
        // FatFs drive prefix ("0:/...") or a Windows drive letter
        return Err(ResolveError::Unsafe(format!("drive prefix not allowed: {:?}", rel)));
    }
    let mut out = vec![];
    for seg in rel.split(['/', '\\']) {
        match seg {
            "" | "." => continue,
            ".." => {
                return Err(ResolveError::Unsafe(format!("parent traversal not allowed: {:?}", rel)))
            }
            s => out.push(s),
        }
    }
    Ok(out)
}

/// Resolve a multi-segment relative path under `root`, one directory level at
/// a time, with case folding applied per segment.
pub fn resolve_path(root: &Path, rel: &str) -> Result<PathBuf, ResolveError> {
    let segments = split_segments(rel)?;
    if segments.is_empty() {
        return Err(ResolveError::NotFound { parent: root.to_path_buf(), name: rel.to_string() });
    }
    let mut cur = root.to_path_buf();
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 && !cur.is_dir() {
            return Err(ResolveError::NotADirectory(cur));
        }
        cur = resolve_entry(&cur, seg)?;
    }
    Ok(cur)
}
