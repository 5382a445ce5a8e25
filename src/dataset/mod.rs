//! MOTChallenge dataset loading.
//!
//! This module provides:
//! - `DatasetLoader` - discovers sequence directories under a dataset root
//! - `SequenceLoader` - one sequence: metadata plus filtered ground truth per frame
//! - `AnnotationFile` - gt.txt / det.txt / tracker output parser
//! - `InformationFile` / `SequenceInfo` - seqinfo.ini metadata
//! - `PredictionsTextFile` - writes tracker output in MOT format

mod annotation_file;
mod information_file;
mod predictions;
mod sequence;

pub use annotation_file::{AnnotationFile, AnnotationKind};
pub use information_file::{InformationFile, SequenceInfo};
pub use predictions::PredictionsTextFile;
pub use sequence::SequenceLoader;

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::config::LoaderConfig;
use crate::Result;

/// Dataset root, e.g. `MOT16/` holding `train/` and `test/` splits.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    root: PathBuf,
    config: LoaderConfig,
}

impl DatasetLoader {
    pub fn new<P: AsRef<Path>>(root: P, config: LoaderConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Directories holding a `seqinfo.ini`, either `root/SEQ` or `root/split/SEQ`.
    ///
    /// Sorted by sequence directory name. Fails only if the root itself cannot be read.
    pub fn sequence_dirs(&self) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();

        for child in subdirectories(&self.root)? {
            if is_sequence_dir(&child) {
                dirs.push(child);
                continue;
            }
            match subdirectories(&child) {
                Ok(grandchildren) => dirs.extend(grandchildren.into_iter().filter(|d| is_sequence_dir(d))),
                Err(e) => warn!("skipping unreadable directory {}: {}", child.display(), e),
            }
        }

        dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
        Ok(dirs)
    }

    /// Lazily open every discovered sequence.
    ///
    /// Each call rediscovers the directories and returns a fresh iterator.
    pub fn sequences(&self) -> Result<impl Iterator<Item = Result<SequenceLoader>> + '_> {
        let dirs = self.sequence_dirs()?;
        Ok(dirs.into_iter().map(move |dir| SequenceLoader::open(dir, &self.config)))
    }
}

fn is_sequence_dir(dir: &Path) -> bool {
    dir.join("seqinfo.ini").is_file()
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_sequence(dir: &Path, name: &str) {
        fs::create_dir_all(dir.join("gt")).unwrap();
        fs::write(
            dir.join("seqinfo.ini"),
            format!(
                "[Sequence]\nname={}\nimDir=img1\nframeRate=30\nseqLength=2\nimWidth=640\nimHeight=480\nimExt=.jpg\n",
                name
            ),
        )
        .unwrap();
        fs::write(dir.join("gt").join("gt.txt"), "1,1,0,0,10,10,1,1,1\n").unwrap();
    }

    #[test]
    fn test_discovers_split_layout() {
        let tmp = TempDir::new().unwrap();
        make_sequence(&tmp.path().join("train").join("MOT16-04"), "MOT16-04");
        make_sequence(&tmp.path().join("train").join("MOT16-02"), "MOT16-02");
        make_sequence(&tmp.path().join("test").join("MOT16-03"), "MOT16-03");
        fs::create_dir_all(tmp.path().join("train").join("not-a-sequence")).unwrap();
        fs::write(tmp.path().join("README.txt"), "hello").unwrap();

        let loader = DatasetLoader::new(tmp.path(), LoaderConfig::default());
        let names: Vec<String> = loader
            .sequence_dirs()
            .unwrap()
            .iter()
            .map(|d| d.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["MOT16-02", "MOT16-03", "MOT16-04"]);
    }

    #[test]
    fn test_discovers_flat_layout() {
        let tmp = TempDir::new().unwrap();
        make_sequence(&tmp.path().join("SEQ-B"), "SEQ-B");
        make_sequence(&tmp.path().join("SEQ-A"), "SEQ-A");

        let loader = DatasetLoader::new(tmp.path(), LoaderConfig::default());
        let sequences: Vec<SequenceLoader> = loader.sequences().unwrap().map(|s| s.unwrap()).collect();
        assert_eq!(sequences.len(), 2);
        assert_eq!(sequences[0].name(), "SEQ-A");

        // A second pass yields the same sequences again
        assert_eq!(loader.sequences().unwrap().count(), 2);
    }

    #[test]
    fn test_missing_root() {
        let loader = DatasetLoader::new("/nonexistent/dataset", LoaderConfig::default());
        assert!(loader.sequence_dirs().is_err());
    }
}
