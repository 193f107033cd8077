//! Append-only text recording of time series.
//!
//! A [`DataRecorder`] owns a set of named output streams, one file per
//! stream, each holding whitespace-separated `time v1 v2 ...` lines.
//! Floats are written with Rust's default `{}` formatting, which is
//! shortest-round-trip and locale-independent, so two runs over the same
//! inputs produce byte-identical files.

use shake_types::{Result, RigError};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Writes named time-series streams as text files in one directory.
#[derive(Debug)]
pub struct DataRecorder {
    dir: PathBuf,
    streams: BTreeMap<String, BufWriter<File>>,
}

impl DataRecorder {
    /// Create a recorder writing into `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            streams: BTreeMap::new(),
        })
    }

    /// The directory this recorder writes into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Open (or reopen, truncating) the stream `name` as `<dir>/<name>.txt`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn open_stream(&mut self, name: &str) -> Result<()> {
        let path = self.stream_path(name);
        debug!(stream = name, path = %path.display(), "opening output stream");
        let file = File::create(&path)?;
        self.streams
            .insert(name.to_owned(), BufWriter::new(file));
        Ok(())
    }

    /// Whether a stream of this name is open.
    #[must_use]
    pub fn has_stream(&self, name: &str) -> bool {
        self.streams.contains_key(name)
    }

    /// The file path a stream of this name writes to.
    #[must_use]
    pub fn stream_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.txt"))
    }

    /// Append one `time v1 v2 ...` line to a stream.
    ///
    /// # Errors
    ///
    /// Returns [`RigError::UnknownStream`] if the stream was never opened,
    /// or an I/O error if the write fails.
    pub fn append(&mut self, name: &str, time: f64, values: &[f64]) -> Result<()> {
        let writer = self
            .streams
            .get_mut(name)
            .ok_or_else(|| RigError::UnknownStream(name.to_owned()))?;
        write!(writer, "{time}")?;
        for value in values {
            write!(writer, " {value}")?;
        }
        writeln!(writer)?;
        Ok(())
    }

    /// Append one sampled row to a stream.
    ///
    /// # Errors
    ///
    /// Same as [`DataRecorder::append`].
    pub fn append_sample(&mut self, name: &str, sample: &crate::Sample) -> Result<()> {
        self.append(name, sample.time, &sample.values)
    }

    /// Flush every open stream to disk.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error encountered.
    pub fn flush_all(&mut self) -> Result<()> {
        for writer in self.streams.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    /// Write a gnuplot script `<dir>/<script_name>.gpl` plotting column 2
    /// of each listed stream against time.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the script cannot be written.
    pub fn write_plot_script(&self, script_name: &str, streams: &[&str]) -> Result<()> {
        let path = self.dir.join(format!("{script_name}.gpl"));
        let mut script = String::from("set xlabel \"time [s]\"\nset grid\nplot ");
        for (index, stream) in streams.iter().enumerate() {
            if index > 0 {
                script.push_str(", \\\n     ");
            }
            script.push_str(&format!(
                "\"{stream}.txt\" using 1:2 with lines title \"{stream}\""
            ));
        }
        script.push('\n');
        std::fs::write(&path, script)?;
        debug!(path = %path.display(), "wrote plot script");
        Ok(())
    }
}

impl Drop for DataRecorder {
    fn drop(&mut self) {
        // Best effort; explicit flush_all is the reliable path.
        if self.flush_all().is_err() {
            warn!("failed to flush output streams on drop");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn append_writes_text_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = DataRecorder::new(dir.path()).unwrap();
        recorder.open_stream("table").unwrap();
        recorder.append("table", 0.0, &[0.0, 1.5]).unwrap();
        recorder.append("table", 0.5, &[-0.25, 2.0]).unwrap();
        recorder.flush_all().unwrap();

        let text = std::fs::read_to_string(recorder.stream_path("table")).unwrap();
        assert_eq!(text, "0 0 1.5\n0.5 -0.25 2\n");
    }

    #[test]
    fn unknown_stream_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = DataRecorder::new(dir.path()).unwrap();
        let err = recorder.append("missing", 0.0, &[]).unwrap_err();
        assert!(matches!(err, RigError::UnknownStream(_)));
    }

    #[test]
    fn reopening_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = DataRecorder::new(dir.path()).unwrap();
        recorder.open_stream("s").unwrap();
        recorder.append("s", 0.0, &[1.0]).unwrap();
        recorder.flush_all().unwrap();
        recorder.open_stream("s").unwrap();
        recorder.flush_all().unwrap();

        let text = std::fs::read_to_string(recorder.stream_path("s")).unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn identical_inputs_give_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let samples: Vec<(f64, Vec<f64>)> = (0..50)
            .map(|i| {
                let t = f64::from(i) * 1e-3;
                (t, vec![(t * 9.3).sin(), t * t])
            })
            .collect();

        let write_run = |name: &str| {
            let mut recorder = DataRecorder::new(dir.path()).unwrap();
            recorder.open_stream(name).unwrap();
            for (t, values) in &samples {
                recorder.append(name, *t, values).unwrap();
            }
            recorder.flush_all().unwrap();
            std::fs::read_to_string(recorder.stream_path(name)).unwrap()
        };

        assert_eq!(write_run("a"), write_run("b"));
    }

    #[test]
    fn plot_script_lists_streams() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = DataRecorder::new(dir.path()).unwrap();
        recorder
            .write_plot_script("view", &["data_table", "data_brick"])
            .unwrap();
        let script = std::fs::read_to_string(dir.path().join("view.gpl")).unwrap();
        assert!(script.contains("data_table.txt"));
        assert!(script.contains("data_brick.txt"));
    }
}
