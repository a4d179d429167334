/**
 * file: gtf.rs
 * desc: Annotation (GTF) handling. Scans gene/transcript IDs out of feature lines and writes the
 *       modified annotation with the deleted transcripts removed.
 */
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use shared::Result;

/**
 * STRUCTS
 */

/**
 * Line tallies from filtering an annotation.
 */
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FilterStats {
    pub kept: usize,
    pub dropped: usize,
}

/**
 * FUNCTIONS
 */

/**
 * Extract the value of an attribute from a GTF feature line. The value is the token following the
 * key, with any trailing ';' and quote characters removed.
 *
 * args
 *  line: a GTF feature line
 *  key:  attribute name, e.g. gene_id
 *
 * returns
 *  the attribute value or None if the key isn't present
 */
pub fn attribute<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let mut tokens = line.split_whitespace();

    tokens.find(|t| *t == key)?;
    tokens
        .next()
        .map(|v| v.trim_matches(|c| c == ';' || c == '"'))
}

pub fn gene_id(line: &str) -> Option<&str> {
    attribute(line, "gene_id")
}

pub fn transcript_id(line: &str) -> Option<&str> {
    attribute(line, "transcript_id")
}

/**
 * Should this annotation line be written to the modified annotation?
 */
fn keep_line(line: &str, deleted: &BTreeSet<String>) -> bool {
    if line.starts_with('#') {
        return true;
    }

    let by_gene = gene_id(line).map_or(false, |g| deleted.contains(g));
    let by_transcript = transcript_id(line).map_or(false, |t| deleted.contains(t));

    !(by_gene || by_transcript)
}

/**
 Stream an annotation, dropping every feature line whose gene_id or transcript_id is in the given
 set. Lines are never modified, comments pass through.

 args
  input:   annotation reader
  output:  destination for the kept lines
  deleted: transcript and gene IDs to remove

 returns
  number of kept and dropped lines
*/
pub fn filter_annotation<R: BufRead, W: Write>(
    input: R,
    mut output: W,
    deleted: &BTreeSet<String>,
) -> Result<FilterStats> {
    let mut stats = FilterStats::default();

    for line in input.lines() {
        let line = line?;

        if keep_line(&line, deleted) {
            writeln!(output, "{}", line)?;
            stats.kept += 1;
        } else {
            stats.dropped += 1;
        }
    }

    output.flush()?;

    Ok(stats)
}

/**
 * File based version of filter_annotation.
 */
pub fn write_modified_gtf(
    input: &Path,
    output: &Path,
    deleted: &BTreeSet<String>,
) -> Result<FilterStats> {
    let reader = BufReader::new(File::open(input)?);
    let writer = BufWriter::new(File::create(output)?);

    filter_annotation(reader, writer, deleted)
}

/**
 * Map unversioned transcript IDs (ENST0001.2 -> ENST0001) to their full ID using the exon
 * features of an annotation. Simulators that strip versions from read names are mapped back
 * through this.
 */
pub fn transcript_versions(gtf: &Path) -> Result<HashMap<String, String>> {
    let reader = BufReader::new(File::open(gtf)?);
    let mut versions = HashMap::new();

    for line in reader.lines() {
        let line = line?;

        if line.starts_with('#') || line.split('\t').nth(2) != Some("exon") {
            continue;
        }

        if let Some(tid) = transcript_id(&line) {
            let short = tid.split('.').next().unwrap_or(tid);

            versions.insert(short.to_string(), tid.to_string());
        }
    }

    Ok(versions)
}

#[cfg(test)]
#[path = "tests/gtf_tests.rs"]
mod gtf_tests;
