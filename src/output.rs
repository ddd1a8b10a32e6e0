//! Descriptor output directory.
//!
//! Files are written to a temporary sibling and renamed into place so a
//! failed run never leaves a truncated descriptor behind.
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

pub const DEFAULT_OUTPUT_DIR: &str = "dist";

#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `contents` to `filename` under the output root, creating
    /// directories as needed. Returns the written path.
    pub fn write(&self, filename: &str, contents: &str) -> Result<PathBuf> {
        validate_filename(filename)?;
        let dest = self.root.join(filename);
        let parent = dest
            .parent()
            .ok_or_else(|| anyhow!("output path {} has no parent", dest.display()))?;
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        let mut tmp = NamedTempFile::new_in(parent)
            .with_context(|| format!("create temp file in {}", parent.display()))?;
        tmp.write_all(contents.as_bytes())
            .with_context(|| format!("write {}", dest.display()))?;
        tmp.persist(&dest)
            .with_context(|| format!("publish {}", dest.display()))?;
        Ok(dest)
    }
}

fn validate_filename(filename: &str) -> Result<()> {
    let path = Path::new(filename);
    let escapes = path
        .components()
        .any(|component| !matches!(component, Component::Normal(_)));
    if filename.trim().is_empty() || path.is_absolute() || escapes {
        return Err(anyhow!(
            "output filename must be a relative path without '..' (got {filename:?})"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_missing_directory_and_writes() {
        let dir = TempDir::new().expect("create temp dir");
        let out = OutputDir::new(dir.path().join("dist"));
        let path = out.write("ncbiblast.cwl", "cwlVersion: v1.0\n").expect("write");
        assert_eq!(path, dir.path().join("dist").join("ncbiblast.cwl"));
        assert_eq!(
            std::fs::read_to_string(&path).expect("read back"),
            "cwlVersion: v1.0\n"
        );
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = TempDir::new().expect("create temp dir");
        let out = OutputDir::new(dir.path().to_path_buf());
        out.write("a.cwl", "old contents that are longer").expect("first write");
        let path = out.write("a.cwl", "new").expect("second write");
        assert_eq!(std::fs::read_to_string(path).expect("read back"), "new");
        let leftovers = std::fs::read_dir(dir.path()).expect("list").count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn rejects_escaping_filenames() {
        let dir = TempDir::new().expect("create temp dir");
        let out = OutputDir::new(dir.path().to_path_buf());
        assert!(out.write("../x.cwl", "x").is_err());
        assert!(out.write("/tmp/x.cwl", "x").is_err());
        assert!(out.write("", "x").is_err());
        assert!(out.write("nested/ok.cwl", "x").is_ok());
    }
}
