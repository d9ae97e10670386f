use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

use hottake_common::OutputRecord;

/// Append-only writer for one run's output batch.
///
/// The batch file is named by the run's start timestamp at one-second
/// resolution; two runs starting within the same second collide and the
/// later one wins. Every append is flushed immediately, so a crash mid-run
/// leaves a valid partial batch; flushed lines are never lost.
pub struct BatchWriter {
    file: File,
    path: PathBuf,
}

impl BatchWriter {
    /// Create the run's batch file and prune batches beyond `keep`.
    /// The file is created up front so it counts as newest when pruning.
    pub fn open(data_dir: &Path, keep: usize) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let path = data_dir.join(format!("{stamp}.jsonl"));
        let file = File::create(&path)?;

        prune_old_batches(data_dir, keep);

        info!(path = %path.display(), "Opened output batch");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one record as a JSON line (UTF-8, non-ASCII unescaped) and
    /// flush. Write failures propagate and abort the run; everything already
    /// flushed stays durable.
    pub fn append(&mut self, record: &OutputRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.flush()?;
        Ok(())
    }
}

/// Delete the oldest batch files beyond `keep`, newest-first by modification
/// time (timestamped filenames break ties). A failed deletion is logged and
/// skipped, never fatal.
pub fn prune_old_batches(data_dir: &Path, keep: usize) {
    let entries = match std::fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %data_dir.display(), error = %e, "Cannot list output directory");
            return;
        }
    };

    let mut batches: Vec<(std::time::SystemTime, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "jsonl"))
        .map(|path| {
            let mtime = std::fs::metadata(&path)
                .and_then(|m| m.modified())
                .unwrap_or(UNIX_EPOCH);
            (mtime, path)
        })
        .collect();

    batches.sort_by(|a, b| b.cmp(a));

    for (_, old) in batches.into_iter().skip(keep) {
        match std::fs::remove_file(&old) {
            Ok(()) => debug!(path = %old.display(), "Pruned old batch"),
            Err(e) => warn!(path = %old.display(), error = %e, "Failed to delete old batch file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str) -> OutputRecord {
        OutputRecord {
            title: title.to_string(),
            date: None,
            link: format!("https://example.com/{title}"),
            tags: vec!["Acme".to_string()],
            opinion: "a take".to_string(),
            alignment_score: Some(88),
        }
    }

    #[test]
    fn appended_lines_reparse_to_equal_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = BatchWriter::open(dir.path(), 10).unwrap();

        let first = record("one");
        let second = record("two");
        writer.append(&first).unwrap();
        writer.append(&second).unwrap();

        // Flushed per record: readable without dropping the writer.
        let content = std::fs::read_to_string(writer.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(serde_json::from_str::<OutputRecord>(lines[0]).unwrap(), first);
        assert_eq!(serde_json::from_str::<OutputRecord>(lines[1]).unwrap(), second);
    }

    #[test]
    fn prune_keeps_the_most_recent_batches() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..7 {
            let name = format!("20260801_00000{i}.jsonl");
            std::fs::write(dir.path().join(name), "{}\n").unwrap();
        }

        prune_old_batches(dir.path(), 3);

        let mut remaining: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        remaining.sort();
        assert_eq!(
            remaining,
            vec![
                "20260801_000004.jsonl",
                "20260801_000005.jsonl",
                "20260801_000006.jsonl",
            ]
        );
    }

    #[test]
    fn prune_ignores_non_batch_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("log.txt"), "keep me").unwrap();
        std::fs::write(dir.path().join("20260801_000001.jsonl"), "{}\n").unwrap();

        prune_old_batches(dir.path(), 0);

        assert!(dir.path().join("log.txt").exists());
        assert!(!dir.path().join("20260801_000001.jsonl").exists());
    }

    #[test]
    fn keep_larger_than_population_deletes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("20260801_000001.jsonl"), "{}\n").unwrap();

        prune_old_batches(dir.path(), 10);
        assert!(dir.path().join("20260801_000001.jsonl").exists());
    }
}
