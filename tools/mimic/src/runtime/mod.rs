use crate::errors::MimicError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> Result<String, MimicError>;
    fn append_line(&self, path: &Path, line: &str) -> Result<(), MimicError>;
    fn create_dir_all(&self, path: &Path) -> Result<(), MimicError>;
}

pub struct ProductionFileSystem;

impl FileSystem for ProductionFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, MimicError> {
        std::fs::read_to_string(path).map_err(|e| MimicError::Io(e.to_string()))
    }

    fn append_line(&self, path: &Path, line: &str) -> Result<(), MimicError> {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| MimicError::Io(e.to_string()))?;
        writeln!(file, "{line}").map_err(|e| MimicError::Io(e.to_string()))
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), MimicError> {
        std::fs::create_dir_all(path).map_err(|e| MimicError::Io(e.to_string()))
    }
}

#[derive(Default, Clone)]
pub struct FakeFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
    dirs: Arc<Mutex<Vec<PathBuf>>>,
    fail_next: Arc<Mutex<Option<MimicError>>>,
}

impl FakeFileSystem {
    pub fn with_file(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let fs = Self::default();
        fs.files
            .lock()
            .expect("files lock")
            .insert(path.into(), contents.into());
        fs
    }

    pub fn set_fail_next(&self, error: MimicError) {
        *self.fail_next.lock().expect("fail lock") = Some(error);
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.lock().expect("files lock").get(path).cloned()
    }

    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.dirs.lock().expect("dirs lock").clone()
    }

    fn maybe_fail(&self) -> Result<(), MimicError> {
        if let Some(err) = self.fail_next.lock().expect("fail lock").take() {
            return Err(err);
        }
        Ok(())
    }
}

impl FileSystem for FakeFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, MimicError> {
        self.maybe_fail()?;
        self.files
            .lock()
            .expect("files lock")
            .get(path)
            .cloned()
            .ok_or_else(|| MimicError::Io(format!("missing file {}", path.display())))
    }

    fn append_line(&self, path: &Path, line: &str) -> Result<(), MimicError> {
        self.maybe_fail()?;
        let mut files = self.files.lock().expect("files lock");
        let contents = files.entry(path.to_path_buf()).or_default();
        contents.push_str(line);
        contents.push('\n');
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), MimicError> {
        self.maybe_fail()?;
        self.dirs
            .lock()
            .expect("dirs lock")
            .push(path.to_path_buf());
        Ok(())
    }
}
