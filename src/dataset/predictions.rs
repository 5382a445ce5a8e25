//! MOTChallenge predictions file writer.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::warn;

use super::SequenceInfo;
use crate::annotation::{BoxAnnotation, FrameIndex};
use crate::{Error, Result};

/// Writer for tracker output in MOTChallenge format.
///
/// The output format is CSV with columns:
/// `frame,id,bb_left,bb_top,bb_width,bb_height,conf,-1,-1,-1`
pub struct PredictionsTextFile {
    path: PathBuf,
    length: i64,
    writer: BufWriter<File>,
    frame_number: FrameIndex,
}

impl PredictionsTextFile {
    /// Create `<save_path>/predictions/<sequence>.txt` for a sequence directory.
    ///
    /// # Arguments
    /// * `input_path` - Path to the sequence being processed
    /// * `save_path` - Directory where predictions/ folder will be created
    /// * `information` - Optional sequence metadata (if None, loads input_path/seqinfo.ini)
    pub fn new<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_path: P1,
        save_path: P2,
        information: Option<&SequenceInfo>,
    ) -> Result<Self> {
        let input_path = input_path.as_ref();

        let loaded;
        let info = match information {
            Some(info) => info,
            None => {
                loaded = SequenceInfo::read(input_path.join("seqinfo.ini"))?;
                &loaded
            }
        };

        let predictions_folder = save_path.as_ref().join("predictions");
        fs::create_dir_all(&predictions_folder).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to create predictions folder: {}", e),
            ))
        })?;

        let path = predictions_folder.join(format!("{}.txt", info.name));
        let file = File::create(&path).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to create output file '{}': {}", path.display(), e),
            ))
        })?;

        Ok(Self {
            path,
            length: info.seq_length,
            writer: BufWriter::new(file),
            frame_number: 1,
        })
    }

    /// Get the sequence length.
    pub fn length(&self) -> i64 {
        self.length
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the boxes of one frame.
    ///
    /// Without an explicit frame number the writer continues from the last
    /// written frame. The `frame` field of the boxes is not used.
    pub fn update(&mut self, predictions: &[BoxAnnotation], frame_number: Option<FrameIndex>) -> Result<()> {
        let frame = frame_number.unwrap_or(self.frame_number);
        if frame < 1 || frame > self.length {
            warn!(
                "{}: writing frame {} outside 1..={}",
                self.path.display(),
                frame,
                self.length
            );
        }

        for b in predictions {
            writeln!(
                self.writer,
                "{},{},{:.2},{:.2},{:.2},{:.2},{},-1,-1,-1",
                frame, b.id, b.x, b.y, b.width, b.height, b.confidence
            )?;
        }

        self.frame_number = frame + 1;
        Ok(())
    }

    /// Flush the writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(Error::IoError)
    }
}

impl Drop for PredictionsTextFile {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{AnnotationFile, AnnotationKind};
    use tempfile::TempDir;

    fn info() -> SequenceInfo {
        SequenceInfo {
            name: "MOT16-09".to_string(),
            im_dir: "img1".to_string(),
            frame_rate: 30.0,
            seq_length: 3,
            im_width: 1920,
            im_height: 1080,
            im_ext: ".jpg".to_string(),
        }
    }

    #[test]
    fn test_writes_mot_rows() {
        let tmp = TempDir::new().unwrap();
        let mut out = PredictionsTextFile::new(tmp.path().join("MOT16-09"), tmp.path(), Some(&info())).unwrap();
        assert_eq!(out.length(), 3);

        out.update(&[BoxAnnotation::new(4, 0, 1.0, 2.5, 30.0, 60.0)], None).unwrap();
        out.update(&[], None).unwrap();
        out.update(&[BoxAnnotation::new(4, 0, 2.0, 2.5, 30.0, 60.0).with_confidence(0.5)], None)
            .unwrap();
        out.flush().unwrap();

        let path = tmp.path().join("predictions").join("MOT16-09.txt");
        assert_eq!(out.path(), path.as_path());
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "1,4,1.00,2.50,30.00,60.00,1,-1,-1,-1\n3,4,2.00,2.50,30.00,60.00,0.5,-1,-1,-1\n"
        );
    }

    #[test]
    fn test_written_file_reads_back() {
        let tmp = TempDir::new().unwrap();
        {
            let mut out = PredictionsTextFile::new(tmp.path(), tmp.path(), Some(&info())).unwrap();
            out.update(&[BoxAnnotation::new(1, 0, 0.0, 0.0, 10.0, 10.0)], Some(2)).unwrap();
        }

        let path = tmp.path().join("predictions").join("MOT16-09.txt");
        let file = AnnotationFile::read(path, AnnotationKind::Hypothesis, None).unwrap();
        assert_eq!(file.frame_indices().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_requires_seqinfo_without_information() {
        let tmp = TempDir::new().unwrap();
        assert!(PredictionsTextFile::new(tmp.path(), tmp.path(), None).is_err());
    }
}
