//! Implementation of the `occ export` command.
//!
//! The batch front end: resolve the document list, pre-check existence,
//! parse every document, flatten, and write the CSV table to the chosen
//! sink. A failure on any single document aborts the whole batch.

use std::fs::File;
use std::io::{self, BufWriter, Write, stdout};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};

use occ_core::{DEFAULT_HEADER, DefaultRowFormat, extract_all, render};
use occ_org::read_document;

use crate::Config;

/// Run the export command.
pub fn run(
    config: &Config,
    files: &[PathBuf],
    output: Option<&Path>,
    no_check: bool,
    separator: Option<&str>,
    header: Option<&str>,
) -> Result<()> {
    let files: Vec<PathBuf> = if files.is_empty() {
        config.files.clone()
    } else {
        files.to_vec()
    };
    ensure!(
        !files.is_empty(),
        "no input files: pass paths on the command line or set `files` in the configuration"
    );

    // A missing source aborts the whole batch before any output is written.
    if !no_check {
        for file in &files {
            ensure!(
                file.exists(),
                "input file does not exist: {}",
                file.display()
            );
        }
    }

    let mut documents = Vec::with_capacity(files.len());
    for file in &files {
        let document = read_document(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        documents.push(document);
    }

    let records = extract_all(&documents);
    tracing::debug!(
        files = files.len(),
        records = records.len(),
        "flattened batch"
    );

    let format = DefaultRowFormat {
        separator: separator.map_or_else(|| config.separator.clone(), str::to_string),
        header: header
            .map(str::to_string)
            .or_else(|| config.header.clone())
            .unwrap_or_else(|| DEFAULT_HEADER.to_string()),
    };

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            render(&records, &format, &mut writer)?;
            writer.flush()?;
        }
        None => {
            let stdout = stdout();
            let mut writer = BufWriter::new(stdout.lock());
            // Tolerate a closed pipe (e.g. when piped to `head`).
            if let Err(e) = render(&records, &format, &mut writer).and_then(|()| writer.flush()) {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    return Err(e).context("failed to write CSV to stdout");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FIXTURE: &str = "\
* Project :work:
** Task
   CLOCK: [2023-01-01 Sun 09:00]--[2023-01-01 Sun 10:30] => 1:30
";

    #[test]
    fn test_export_to_file() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("a.org");
        std::fs::write(&input, FIXTURE).unwrap();
        let output = temp.path().join("out.csv");

        run(
            &Config::default(),
            &[input],
            Some(&output),
            false,
            None,
            None,
        )
        .unwrap();

        let csv = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            csv,
            "task,parents,category,start,end,effort,ishabit,tags\n\
             Task,Project,,2023-01-01 09:00,2023-01-01 10:30,,,work\n"
        );
    }

    #[test]
    fn test_missing_file_aborts_before_output() {
        let temp = TempDir::new().unwrap();
        let present = temp.path().join("a.org");
        std::fs::write(&present, FIXTURE).unwrap();
        let absent = temp.path().join("missing.org");
        let output = temp.path().join("out.csv");

        let err = run(
            &Config::default(),
            &[present, absent.clone()],
            Some(&output),
            false,
            None,
            None,
        )
        .unwrap_err();

        assert!(err.to_string().contains("missing.org"));
        assert!(!output.exists(), "no output on a failed batch");
    }

    #[test]
    fn test_no_check_defers_to_read_failure() {
        let temp = TempDir::new().unwrap();
        let absent = temp.path().join("missing.org");

        let err = run(&Config::default(), &[absent], None, true, None, None).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_empty_file_list_is_an_error() {
        let err = run(&Config::default(), &[], None, false, None, None).unwrap_err();
        assert!(err.to_string().contains("no input files"));
    }

    #[test]
    fn test_config_supplies_default_files() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("agenda.org");
        std::fs::write(&input, FIXTURE).unwrap();
        let output = temp.path().join("out.csv");

        let config = Config {
            files: vec![input],
            ..Config::default()
        };
        run(&config, &[], Some(&output), false, None, None).unwrap();

        let csv = std::fs::read_to_string(&output).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }
}
