//! MOTChallenge seqinfo.ini parser.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Key-value view of a MOTChallenge seqinfo.ini file.
///
/// These files contain metadata about video sequences in the format:
/// ```ini
/// [Sequence]
/// name=MOT17-02-FRCNN
/// imDir=img1
/// frameRate=30
/// seqLength=600
/// imWidth=1920
/// imHeight=1080
/// imExt=.jpg
/// ```
#[derive(Debug, Clone)]
pub struct InformationFile {
    path: PathBuf,
    lines: Vec<String>,
}

impl InformationFile {
    /// Read the information file at the given path.
    pub fn new<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let path = file_path.as_ref().to_path_buf();
        let contents = fs::read_to_string(&path).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to open information file '{}': {}", path.display(), e),
            ))
        })?;

        let lines = contents.lines().map(str::to_string).collect();
        Ok(Self { path, lines })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Search for a key and return its line number and trimmed value.
    fn find(&self, variable_name: &str) -> Option<(usize, &str)> {
        self.lines.iter().enumerate().find_map(|(idx, line)| {
            let (key, value) = line.split_once('=')?;
            (key.trim() == variable_name).then(|| (idx + 1, value.trim()))
        })
    }

    /// Search for a variable in the information file.
    ///
    /// Section headers and comments are ignored; keys match exactly.
    pub fn search(&self, variable_name: &str) -> Result<String> {
        self.find(variable_name)
            .map(|(_, value)| value.to_string())
            .ok_or_else(|| {
                Error::Dataset(format!(
                    "couldn't find '{}' in {}",
                    variable_name,
                    self.path.display()
                ))
            })
    }

    /// Search for a variable and parse it.
    pub fn search_parsed<T>(&self, variable_name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let (line, value) = self.find(variable_name).ok_or_else(|| {
            Error::Dataset(format!(
                "couldn't find '{}' in {}",
                variable_name,
                self.path.display()
            ))
        })?;

        value.parse().map_err(|e: T::Err| Error::Parse {
            path: self.path.display().to_string(),
            line,
            message: format!("value for '{}' is invalid: {}", variable_name, e),
        })
    }

    /// Search for a variable and parse it as an integer.
    pub fn search_int(&self, variable_name: &str) -> Result<i64> {
        self.search_parsed(variable_name)
    }
}

/// Sequence metadata from seqinfo.ini.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceInfo {
    pub name: String,
    pub im_dir: String,
    pub frame_rate: f64,
    pub seq_length: i64,
    pub im_width: u32,
    pub im_height: u32,
    pub im_ext: String,
}

impl SequenceInfo {
    /// Read every sequence key, failing on the first missing or invalid one.
    pub fn from_information_file(info: &InformationFile) -> Result<Self> {
        let seq_length = info.search_int("seqLength")?;
        if seq_length < 0 {
            return Err(Error::Dataset(format!(
                "negative seqLength {} in {}",
                seq_length,
                info.path().display()
            )));
        }

        Ok(Self {
            name: info.search("name")?,
            im_dir: info.search("imDir")?,
            frame_rate: info.search_parsed("frameRate")?,
            seq_length,
            im_width: info.search_parsed("imWidth")?,
            im_height: info.search_parsed("imHeight")?,
            im_ext: info.search("imExt")?,
        })
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_information_file(&InformationFile::new(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_seqinfo() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[Sequence]").unwrap();
        writeln!(file, "name=MOT16-02").unwrap();
        writeln!(file, "imDir=img1").unwrap();
        writeln!(file, "frameRate=30").unwrap();
        writeln!(file, "seqLength=600").unwrap();
        writeln!(file, "imWidth=1920").unwrap();
        writeln!(file, "imHeight=1080").unwrap();
        writeln!(file, "imExt=.jpg").unwrap();
        file
    }

    #[test]
    fn test_search_int() {
        let file = create_temp_seqinfo();
        let info = InformationFile::new(file.path()).unwrap();

        assert_eq!(info.search_int("seqLength").unwrap(), 600);
        assert_eq!(info.search_int("frameRate").unwrap(), 30);
    }

    #[test]
    fn test_search_string() {
        let file = create_temp_seqinfo();
        let info = InformationFile::new(file.path()).unwrap();

        assert_eq!(info.search("name").unwrap(), "MOT16-02");
        assert_eq!(info.search("imDir").unwrap(), "img1");
    }

    #[test]
    fn test_search_is_exact() {
        let file = create_temp_seqinfo();
        let info = InformationFile::new(file.path()).unwrap();

        // "im" is a prefix of several keys but not a key itself
        assert!(matches!(info.search("im"), Err(Error::Dataset(_))));
        assert!(info.search("nonexistent").is_err());
    }

    #[test]
    fn test_search_int_invalid_value() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[Sequence]").unwrap();
        writeln!(file, "seqLength=many").unwrap();
        let info = InformationFile::new(file.path()).unwrap();

        let err = info.search_int("seqLength").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn test_sequence_info() {
        let file = create_temp_seqinfo();
        let info = SequenceInfo::read(file.path()).unwrap();

        assert_eq!(info.name, "MOT16-02");
        assert_eq!(info.seq_length, 600);
        assert_eq!(info.frame_rate, 30.0);
        assert_eq!((info.im_width, info.im_height), (1920, 1080));
        assert_eq!(info.im_ext, ".jpg");
    }

    #[test]
    fn test_missing_file() {
        let err = InformationFile::new("/nonexistent/seqinfo.ini").unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }
}
