use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: String,
        #[source]
        source: io::Error,
    },
}

impl LogError {
    fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        LogError::Io {
            action,
            path: path.display().to_string(),
            source,
        }
    }

    /// True when the log file no longer exists
    pub fn is_not_found(&self) -> bool {
        match self {
            LogError::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
        }
    }
}

/// Persistent append-only byte log
pub trait AppendLog {
    /// Discards any previous content and writes `header` as the first line.
    fn reset(&mut self, header: &str) -> Result<(), LogError>;

    fn append(&mut self, bytes: &str) -> Result<(), LogError>;

    fn read_all(&self) -> Result<String, LogError>;

    fn location(&self) -> String;
}

/// Log file that is opened and closed on every call
#[derive(Debug, Clone)]
pub struct FileLog {
    path: PathBuf,
}

impl FileLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AppendLog for FileLog {
    fn reset(&mut self, header: &str) -> Result<(), LogError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| LogError::io("create directory for", &self.path, e))?;
            }
        }

        match fs::remove_file(&self.path) {
            Ok(()) => log::warn!("Discarded previous recording log {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(LogError::io("remove", &self.path, e)),
        }

        fs::write(&self.path, format!("{}\n", header)).map_err(|e| LogError::io("write header to", &self.path, e))
    }

    fn append(&mut self, bytes: &str) -> Result<(), LogError> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| LogError::io("open", &self.path, e))?;

        file.write_all(bytes.as_bytes())
            .map_err(|e| LogError::io("append to", &self.path, e))
    }

    fn read_all(&self) -> Result<String, LogError> {
        fs::read_to_string(&self.path).map_err(|e| LogError::io("read", &self.path, e))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reset_replaces_previous_content() {
        let dir = tempdir().unwrap();
        let mut log = FileLog::new(dir.path().join("reset.csv"));
        log.reset("A,B").unwrap();
        log.append("1,2\n").unwrap();
        log.reset("A,B").unwrap();
        assert_eq!(log.read_all().unwrap(), "A,B\n");
    }

    #[test]
    fn reset_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("log.csv");
        FileLog::new(&path).reset("A,B").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "A,B\n");
    }

    #[test]
    fn append_adds_after_header() {
        let dir = tempdir().unwrap();
        let mut log = FileLog::new(dir.path().join("append.csv"));
        log.reset("A,B").unwrap();
        log.append("1,2\n").unwrap();
        log.append("3,4\n").unwrap();
        assert_eq!(log.read_all().unwrap(), "A,B\n1,2\n3,4\n");
    }

    #[test]
    fn append_without_file_reports_not_found() {
        let dir = tempdir().unwrap();
        let mut log = FileLog::new(dir.path().join("never-created.csv"));
        let err = log.append("1,2\n").unwrap_err();
        assert!(matches!(err, LogError::Io { action: "open", .. }));
        assert!(err.is_not_found());
    }
}
