//! Append-only log of failing cases.
//!
//! Each failing case adds one section holding the input and both outputs
//! verbatim. Every file header carries the byte length of its body, and each
//! body is followed by a single separator newline that is not part of the
//! content. The file is opened in append mode for every write and is only
//! removed between runs or by full cleanup, never truncated mid-run.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// One labeled file in a diff record section.
#[derive(Debug, Clone, Copy)]
pub struct RecordedFile<'a> {
    pub label: &'a str,
    pub name: &'a str,
    pub path: &'a Path,
}

#[derive(Debug, Clone)]
pub struct DiffRecord {
    path: PathBuf,
}

impl DiffRecord {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove a record left behind by a previous run.
    pub fn reset(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed stale diff record");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("remove {}", self.path.display())),
        }
    }

    /// Append the section for `case`.
    pub fn append_case(&self, case: u32, files: &[RecordedFile<'_>]) -> Result<()> {
        let mut contents = Vec::with_capacity(files.len());
        for file in files {
            let bytes =
                fs::read(file.path).with_context(|| format!("read {}", file.path.display()))?;
            contents.push((*file, bytes));
        }
        let section = render_section(case, &contents);

        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        handle
            .write_all(&section)
            .with_context(|| format!("append {}", self.path.display()))?;
        debug!(case, path = %self.path.display(), "appended diff record section");
        Ok(())
    }
}

fn render_section(case: u32, files: &[(RecordedFile<'_>, Vec<u8>)]) -> Vec<u8> {
    let mut buf = format!("===== case {case} =====\n").into_bytes();
    for (file, bytes) in files {
        let header = format!(
            "--- {} ({}, {} bytes) ---\n",
            file.label,
            file.name,
            bytes.len()
        );
        buf.extend_from_slice(header.as_bytes());
        buf.extend_from_slice(bytes);
        buf.push(b'\n');
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_case_files(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
        let input = dir.join("data.txt");
        let candidate = dir.join("test.txt");
        let reference = dir.join("ans.txt");
        fs::write(&input, "3\n1 2 3\n").expect("write input");
        fs::write(&candidate, "7").expect("write candidate");
        fs::write(&reference, "6\n").expect("write reference");
        (input, candidate, reference)
    }

    fn recorded<'a>(
        input: &'a Path,
        candidate: &'a Path,
        reference: &'a Path,
    ) -> [RecordedFile<'a>; 3] {
        [
            RecordedFile {
                label: "input",
                name: "data.txt",
                path: input,
            },
            RecordedFile {
                label: "candidate output",
                name: "test.txt",
                path: candidate,
            },
            RecordedFile {
                label: "reference output",
                name: "ans.txt",
                path: reference,
            },
        ]
    }

    #[test]
    fn section_holds_input_and_both_outputs_verbatim() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (input, candidate, reference) = write_case_files(temp.path());
        let record = DiffRecord::new(&temp.path().join("diff.log"));

        record
            .append_case(3, &recorded(&input, &candidate, &reference))
            .expect("append");

        let contents = fs::read_to_string(record.path()).expect("read record");
        assert_eq!(
            contents,
            "===== case 3 =====\n\
             --- input (data.txt, 8 bytes) ---\n3\n1 2 3\n\n\
             --- candidate output (test.txt, 1 bytes) ---\n7\n\
             --- reference output (ans.txt, 2 bytes) ---\n6\n\n"
        );
    }

    #[test]
    fn missing_trailing_newline_stays_visible() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (input, candidate, reference) = write_case_files(temp.path());
        fs::write(&candidate, "7").expect("write candidate");
        fs::write(&reference, "7\n").expect("write reference");
        let record = DiffRecord::new(&temp.path().join("diff.log"));

        record
            .append_case(0, &recorded(&input, &candidate, &reference))
            .expect("append");

        let contents = fs::read_to_string(record.path()).expect("read record");
        let (_, outputs) = contents
            .split_once("--- candidate output (test.txt, 1 bytes) ---\n")
            .expect("candidate header");
        let (candidate_body, reference_section) = outputs
            .split_once("--- reference output (ans.txt, 2 bytes) ---\n")
            .expect("reference header");
        assert_eq!(candidate_body, "7\n");
        assert_eq!(reference_section, "7\n\n");
    }

    #[test]
    fn appends_without_truncating() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (input, candidate, reference) = write_case_files(temp.path());
        let record = DiffRecord::new(&temp.path().join("diff.log"));
        let files = recorded(&input, &candidate, &reference);

        record.append_case(1, &files).expect("append first");
        record.append_case(2, &files).expect("append second");

        let contents = fs::read_to_string(record.path()).expect("read record");
        assert_eq!(contents.matches("===== case ").count(), 2);
        let first = contents.find("case 1").expect("case 1");
        let second = contents.find("case 2").expect("case 2");
        assert!(first < second);
    }

    #[test]
    fn reset_removes_stale_record_and_tolerates_missing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let record = DiffRecord::new(&temp.path().join("diff.log"));
        record.reset().expect("reset missing");

        fs::write(record.path(), "old").expect("write stale");
        record.reset().expect("reset stale");
        assert!(!record.path().exists());
    }
}
