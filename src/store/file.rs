//! File-backed graph store

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::GraphStore;
use crate::error::RdfResult;
use crate::format::RdfFormat;
use crate::types::RdfGraph;

/// Whole-file store; every save rewrites the file in the syntax implied by
/// its extension
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    format: RdfFormat,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = RdfFormat::from_extension(&path);
        Self { path, format }
    }

    /// Store with an explicit syntax regardless of the extension
    pub fn with_format(path: impl Into<PathBuf>, format: RdfFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> RdfFormat {
        self.format
    }
}

impl GraphStore for FileStore {
    fn load(&self) -> RdfResult<Option<RdfGraph>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No backing file yet");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Some(RdfGraph::new()));
        }

        let graph = self.format.decode(&content)?;
        debug!(path = %self.path.display(), triples = graph.len(), "Loaded graph");
        Ok(Some(graph))
    }

    fn save(&self, graph: &RdfGraph) -> RdfResult<()> {
        // Encode before touching the file so a failure leaves it intact
        let content = self.format.encode(graph)?;

        write_atomic(&self.path, &content)?;
        debug!(path = %self.path.display(), triples = graph.len(), "Saved graph");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.path.display(), self.format)
    }
}

/// Write to `<name>.tmp`, sync, then rename over the target so a crash
/// leaves either the old or the new file
fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let mut file = File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    fs::rename(&temp_path, path)
}
