/**
 * file: files.rs
 * desc: Functions related to file reading, writing, and parsing of the simulator inputs/outputs.
 */
use csv;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use shared::index::TranscriptIndex;
use shared::{Result, SimError};

/**
 * Provenance of a single simulated read.
 */
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReadOrigin {
    pub read_id: String,
    pub transcript_id: String,
}

/**
 * Parse a read-to-transcript table: tab separated, no header, read ID then transcript ID.
 */
pub fn read_read_origins(filepath: &Path) -> Result<Vec<ReadOrigin>> {
    if !filepath.exists() {
        return Err(SimError::Config(format!(
            "read-to-transcript file {} does not exist",
            filepath.display()
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(filepath)?;
    let mut origins = Vec::new();

    for result in reader.deserialize() {
        let origin: ReadOrigin = result?;

        origins.push(origin);
    }

    Ok(origins)
}

/**
 * Write the read-to-transcript table for a simulation run.
 */
pub fn write_read_origins(origins: &[ReadOrigin], output: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(output)?;

    for origin in origins.iter() {
        writer.serialize(origin)?;
    }

    writer.flush()?;

    Ok(())
}

/**
 Write the expression table consumed by the long-read simulators. Only transcripts with a
 positive requested count are written.

 args
  index:  transcript index with requested counts assigned
  output: file to write

 returns
  total number of requested reads written
*/
pub fn write_expression_file(index: &TranscriptIndex, output: &Path) -> Result<u64> {
    let mut file = BufWriter::new(File::create(output)?);
    let mut total = 0;

    writeln!(file, "{}\t{}\t{}", "target_id", "est_counts", "tpm")?;

    for record in index.records.iter() {
        let count = record.requested_counts.unwrap_or(0);

        if count == 0 {
            continue;
        }

        writeln!(
            file,
            "{}\t{}\t{}",
            record.transcript_id,
            count,
            record.requested_tpm.unwrap_or(0.0)
        )?;
        total += count;
    }

    file.flush()?;

    Ok(total)
}

/**
 * Write per-transcript read counts for the short-read simulator. Returns the total count.
 */
pub fn write_count_file(index: &TranscriptIndex, output: &Path) -> Result<u64> {
    let mut file = BufWriter::new(File::create(output)?);
    let mut total = 0;

    writeln!(file, "{}\t{}", "transcript_id", "count")?;

    for record in index.records.iter() {
        let count = record.requested_counts.unwrap_or(0);

        if count > 0 {
            writeln!(file, "{}\t{}", record.transcript_id, count)?;
            total += count;
        }
    }

    file.flush()?;

    Ok(total)
}

#[cfg(test)]
mod tests {

    use super::*;
    use shared::index::{StructuralCategory, TranscriptRecord};

    fn index_with_counts() -> TranscriptIndex {
        let counts = [(Some(10), Some(250000.0)), (Some(0), Some(0.0)), (Some(30), Some(750000.0))];

        TranscriptIndex::new(
            counts
                .iter()
                .enumerate()
                .map(|(i, (c, t))| {
                    let mut r = TranscriptRecord::new(
                        &format!("T{}", i),
                        "G1",
                        StructuralCategory::NovelInCatalog,
                        "G1",
                        "novel",
                    );
                    r.requested_counts = *c;
                    r.requested_tpm = *t;
                    r
                })
                .collect(),
        )
    }

    #[test]
    fn test_write_expression_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expression.tsv");

        let total = write_expression_file(&index_with_counts(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        assert!(total == 40);
        assert!(text == "target_id\test_counts\ttpm\nT0\t10\t250000\nT2\t30\t750000\n");
    }

    #[test]
    fn test_write_count_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.tsv");

        assert!(write_count_file(&index_with_counts(), &path).unwrap() == 40);
        assert!(
            std::fs::read_to_string(&path).unwrap() == "transcript_id\tcount\nT0\t10\nT2\t30\n"
        );
    }

    #[test]
    fn test_read_origins_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("read_to_isoform.tsv");
        let origins = vec![
            ReadOrigin {
                read_id: "T1_ONT_simulated_read_0".to_string(),
                transcript_id: "T1".to_string(),
            },
            ReadOrigin {
                read_id: "T2_ONT_simulated_read_1".to_string(),
                transcript_id: "T2".to_string(),
            },
        ];

        write_read_origins(&origins, &path).unwrap();

        assert!(
            std::fs::read_to_string(&path).unwrap()
                == "T1_ONT_simulated_read_0\tT1\nT2_ONT_simulated_read_1\tT2\n"
        );
        assert!(read_read_origins(&path).unwrap() == origins);
    }
}
