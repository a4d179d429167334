/**
 * file: index.rs
 * desc: The transcript index table. One row per annotated transcript, threaded through selection,
 *       expression assignment and read-count reconciliation. Columns are looked up by header
 *       name, unknown columns are carried along untouched.
 */
use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, SimError};

/**
 * COLUMNS
 */

pub const TRANSCRIPT_ID: &str = "transcript_id";
pub const GENE_ID: &str = "gene_id";
pub const STRUCTURAL_CATEGORY: &str = "structural_category";
pub const REF_GENE: &str = "ref_gene";
pub const REF_TRANSCRIPT: &str = "ref_transcript";
pub const SIM_TYPE: &str = "sim_type";
pub const REQUESTED_COUNTS: &str = "requested_counts";
pub const REQUESTED_TPM: &str = "requested_tpm";
pub const SIM_COUNTS: &str = "sim_counts";

const REQUIRED_COLUMNS: [&str; 5] = [
    TRANSCRIPT_ID,
    GENE_ID,
    STRUCTURAL_CATEGORY,
    REF_GENE,
    REF_TRANSCRIPT,
];
const PIPELINE_COLUMNS: [&str; 4] = [SIM_TYPE, REQUESTED_COUNTS, REQUESTED_TPM, SIM_COUNTS];

pub const MISSING_VALUE: &str = "NA";
pub const ABSENT: &str = "absent";

// Separator used by the classifier when a transcript points at several reference genes
pub const COMPOSITE_GENE_SEPARATOR: char = '_';

/**
 * STRUCTS
 */

/**
 * Structural category of a transcript relative to the reference annotation. Declaration order is
 * the canonical processing order.
 */
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StructuralCategory {
    FullSpliceMatch,
    IncompleteSpliceMatch,
    NovelInCatalog,
    NovelNotInCatalog,
    Fusion,
    Antisense,
    Genic,
    GenicIntron,
    Intergenic,
}

impl StructuralCategory {
    pub const ALL: [StructuralCategory; 9] = [
        StructuralCategory::FullSpliceMatch,
        StructuralCategory::IncompleteSpliceMatch,
        StructuralCategory::NovelInCatalog,
        StructuralCategory::NovelNotInCatalog,
        StructuralCategory::Fusion,
        StructuralCategory::Antisense,
        StructuralCategory::Genic,
        StructuralCategory::GenicIntron,
        StructuralCategory::Intergenic,
    ];

    /**
     * Label as written by the structural classifier.
     */
    pub fn label(&self) -> &'static str {
        match self {
            StructuralCategory::FullSpliceMatch => "full-splice_match",
            StructuralCategory::IncompleteSpliceMatch => "incomplete-splice_match",
            StructuralCategory::NovelInCatalog => "novel_in_catalog",
            StructuralCategory::NovelNotInCatalog => "novel_not_in_catalog",
            StructuralCategory::Fusion => "fusion",
            StructuralCategory::Antisense => "antisense",
            StructuralCategory::Genic => "genic",
            StructuralCategory::GenicIntron => "genic_intron",
            StructuralCategory::Intergenic => "intergenic",
        }
    }

    /**
     * Categories whose reference gene field may join several genes.
     */
    pub fn has_composite_reference(&self) -> bool {
        matches!(
            self,
            StructuralCategory::Fusion | StructuralCategory::Antisense | StructuralCategory::Genic
        )
    }
}

impl fmt::Display for StructuralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for StructuralCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        // Accept both the classifier's spelling and a fully hyphenated/underscored one
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");

        StructuralCategory::ALL
            .iter()
            .find(|c| c.label().replace('-', "_") == normalized)
            .copied()
            .ok_or_else(|| format!("unknown structural category '{}'", s))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimType {
    Known,
    Novel,
}

impl SimType {
    pub fn label(&self) -> &'static str {
        match self {
            SimType::Known => "known",
            SimType::Novel => "novel",
        }
    }
}

impl FromStr for SimType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "known" => Ok(SimType::Known),
            "novel" => Ok(SimType::Novel),
            _ => Err(format!("unknown sim_type '{}'", s)),
        }
    }
}

/**
 * Realized number of simulated reads for a transcript. Absent marks transcripts the simulator
 * produced no reads for, as opposed to a count that was never computed (None on the record).
 */
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SimCounts {
    Count(u64),
    Absent,
}

impl fmt::Display for SimCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimCounts::Count(n) => write!(f, "{}", n),
            SimCounts::Absent => write!(f, "{}", ABSENT),
        }
    }
}

/**
 * A single row of the transcript index.
 *
 * fields
 *  ref_gene:  reference gene column exactly as read
 *  ref_genes: the reference gene(s) the transcript depends on, split for composite categories
 *  extra:     values of the columns this crate doesn't interpret, in table column order
 */
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptRecord {
    pub transcript_id: String,
    pub gene_id: String,
    pub structural_category: StructuralCategory,
    pub ref_gene: String,
    pub ref_transcript: String,
    pub ref_genes: BTreeSet<String>,
    pub sim_type: Option<SimType>,
    pub requested_counts: Option<u64>,
    pub requested_tpm: Option<f64>,
    pub sim_counts: Option<SimCounts>,
    pub extra: Vec<String>,
}

impl TranscriptRecord {
    pub fn new(
        transcript_id: &str,
        gene_id: &str,
        structural_category: StructuralCategory,
        ref_gene: &str,
        ref_transcript: &str,
    ) -> TranscriptRecord {
        TranscriptRecord {
            transcript_id: transcript_id.to_string(),
            gene_id: gene_id.to_string(),
            structural_category,
            ref_gene: ref_gene.to_string(),
            ref_transcript: ref_transcript.to_string(),
            ref_genes: split_reference_genes(ref_gene, structural_category),
            sim_type: None,
            requested_counts: None,
            requested_tpm: None,
            sim_counts: None,
            extra: Vec::new(),
        }
    }

    pub fn is_novel(&self) -> bool {
        self.sim_type == Some(SimType::Novel)
    }
}

/**
 * Split a reference gene field into the set of genes it refers to.
 */
pub fn split_reference_genes(ref_gene: &str, category: StructuralCategory) -> BTreeSet<String> {
    if category.has_composite_reference() {
        ref_gene
            .split(COMPOSITE_GENE_SEPARATOR)
            .filter(|g| !g.is_empty())
            .map(|g| g.to_string())
            .collect()
    } else {
        std::iter::once(ref_gene.to_string()).collect()
    }
}

/**
 * The whole transcript index, rows in file order.
 */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptIndex {
    pub extra_columns: Vec<String>,
    pub records: Vec<TranscriptRecord>,
}

// Column positions of a parsed header
struct ColumnLayout {
    required: [usize; 5],
    sim_type: Option<usize>,
    requested_counts: Option<usize>,
    requested_tpm: Option<usize>,
    sim_counts: Option<usize>,
    extra: Vec<usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord, source: &str) -> Result<ColumnLayout> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let mut required = [0; 5];
        for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS.iter()) {
            *slot = position(name).ok_or_else(|| SimError::MissingColumn {
                path: source.to_string(),
                column: name.to_string(),
            })?;
        }

        let extra = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| {
                !REQUIRED_COLUMNS.contains(&h.trim()) && !PIPELINE_COLUMNS.contains(&h.trim())
            })
            .map(|(i, _)| i)
            .collect();

        Ok(ColumnLayout {
            required,
            sim_type: position(SIM_TYPE),
            requested_counts: position(REQUESTED_COUNTS),
            requested_tpm: position(REQUESTED_TPM),
            sim_counts: position(SIM_COUNTS),
            extra,
        })
    }
}

fn field<'a>(record: &'a StringRecord, i: usize) -> &'a str {
    raw_field(record, i).trim()
}

// Columns we don't interpret are passed through untouched
fn raw_field<'a>(record: &'a StringRecord, i: usize) -> &'a str {
    record.get(i).unwrap_or("")
}

fn is_missing(value: &str) -> bool {
    value.is_empty() || value == MISSING_VALUE
}

fn parse_count(value: &str, line: u64) -> Result<Option<u64>> {
    if is_missing(value) {
        return Ok(None);
    }

    if let Ok(n) = value.parse::<u64>() {
        return Ok(Some(n));
    }

    // Integral floats such as "100.0" are accepted as counts
    match value.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 => Ok(Some(f as u64)),
        _ => Err(SimError::Parse {
            line,
            value: value.to_string(),
            expected: "a non-negative read count",
        }),
    }
}

fn parse_tpm(value: &str, line: u64) -> Result<Option<f64>> {
    if is_missing(value) {
        return Ok(None);
    }

    match value.parse::<f64>() {
        Ok(f) if f >= 0.0 => Ok(Some(f)),
        _ => Err(SimError::Parse {
            line,
            value: value.to_string(),
            expected: "a non-negative TPM",
        }),
    }
}

fn parse_sim_counts(value: &str, line: u64) -> Result<Option<SimCounts>> {
    if value == ABSENT {
        return Ok(Some(SimCounts::Absent));
    }

    Ok(parse_count(value, line)?.map(SimCounts::Count))
}

impl TranscriptIndex {
    pub fn new(records: Vec<TranscriptRecord>) -> TranscriptIndex {
        TranscriptIndex {
            extra_columns: Vec::new(),
            records,
        }
    }

    /**
     * Parse a transcript index from a TSV file.
     */
    pub fn from_path(path: &Path) -> Result<TranscriptIndex> {
        if !path.exists() {
            return Err(SimError::Config(format!(
                "transcript index {} does not exist",
                path.display()
            )));
        }

        let file = fs::File::open(path)?;

        TranscriptIndex::from_reader(file, &path.display().to_string())
    }

    /**
     * Parse a transcript index from any reader. The source name is only used in error messages.
     */
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<TranscriptIndex> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let layout = ColumnLayout::from_headers(&headers, source)?;
        let mut records = Vec::new();

        for result in reader.records() {
            let row = result?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let [tid, gid, cat, rgene, rtrans] = layout.required;

            let category =
                StructuralCategory::from_str(field(&row, cat)).map_err(|_| SimError::Parse {
                    line,
                    value: field(&row, cat).to_string(),
                    expected: "a structural category",
                })?;

            let mut record = TranscriptRecord::new(
                field(&row, tid),
                field(&row, gid),
                category,
                field(&row, rgene),
                field(&row, rtrans),
            );

            if let Some(i) = layout.sim_type {
                let value = field(&row, i);
                record.sim_type = if is_missing(value) {
                    None
                } else {
                    Some(SimType::from_str(value).map_err(|_| SimError::Parse {
                        line,
                        value: value.to_string(),
                        expected: "known or novel",
                    })?)
                };
            }
            if let Some(i) = layout.requested_counts {
                record.requested_counts = parse_count(field(&row, i), line)?;
            }
            if let Some(i) = layout.requested_tpm {
                record.requested_tpm = parse_tpm(field(&row, i), line)?;
            }
            if let Some(i) = layout.sim_counts {
                record.sim_counts = parse_sim_counts(field(&row, i), line)?;
            }

            record.extra = layout
                .extra
                .iter()
                .map(|i| raw_field(&row, *i).to_string())
                .collect();

            records.push(record);
        }

        Ok(TranscriptIndex {
            extra_columns: layout
                .extra
                .iter()
                .map(|i| raw_field(&headers, *i).to_string())
                .collect(),
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_sim_type(&self) -> bool {
        self.records.iter().any(|r| r.sim_type.is_some())
    }

    pub fn has_expression(&self) -> bool {
        self.records.iter().any(|r| r.requested_counts.is_some())
    }

    /**
     * Transcript IDs split into novel and known, both in table order.
     */
    pub fn partition_by_sim_type(&self) -> (Vec<String>, Vec<String>) {
        let (novel, known): (Vec<&TranscriptRecord>, Vec<&TranscriptRecord>) =
            self.records.iter().partition(|r| r.is_novel());

        (
            novel.iter().map(|r| r.transcript_id.clone()).collect(),
            known.iter().map(|r| r.transcript_id.clone()).collect(),
        )
    }

    fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();

        header.extend(self.extra_columns.iter().cloned());

        if self.has_sim_type() {
            header.push(SIM_TYPE.to_string());
        }
        if self.has_expression() {
            header.push(REQUESTED_COUNTS.to_string());
            header.push(REQUESTED_TPM.to_string());
        }
        if self.records.iter().any(|r| r.sim_counts.is_some()) {
            header.push(SIM_COUNTS.to_string());
        }

        header
    }

    /**
     * Serialize the index as TSV. Pipeline columns are only emitted once a stage populated them.
     */
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .from_writer(writer);

        let header = self.header();
        let with_sim_type = header.iter().any(|h| h == SIM_TYPE);
        let with_expression = header.iter().any(|h| h == REQUESTED_COUNTS);
        let with_sim_counts = header.iter().any(|h| h == SIM_COUNTS);

        writer.write_record(&header)?;

        let na = || MISSING_VALUE.to_string();

        for r in self.records.iter() {
            let mut row = vec![
                r.transcript_id.clone(),
                r.gene_id.clone(),
                r.structural_category.label().to_string(),
                r.ref_gene.clone(),
                r.ref_transcript.clone(),
            ];

            // Pad or truncate in case a record was built without the extra columns
            row.extend(
                (0..self.extra_columns.len()).map(|i| r.extra.get(i).cloned().unwrap_or_else(na)),
            );

            if with_sim_type {
                row.push(r.sim_type.map(|t| t.label().to_string()).unwrap_or_else(na));
            }
            if with_expression {
                row.push(r.requested_counts.map(|c| c.to_string()).unwrap_or_else(na));
                row.push(r.requested_tpm.map(|t| t.to_string()).unwrap_or_else(na));
            }
            if with_sim_counts {
                row.push(r.sim_counts.map(|c| c.to_string()).unwrap_or_else(na));
            }

            writer.write_record(&row)?;
        }

        writer.flush()?;

        Ok(())
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        let file = fs::File::create(path)?;

        self.write_to(file)
    }

    /**
     * Overwrite an existing index file. The table is written to a sibling temporary file first
     * and then renamed over the original.
     */
    pub fn update_in_place(&self, path: &Path) -> Result<()> {
        let mut tmp = PathBuf::from(path);
        tmp.set_extension("tmp.tsv");

        self.write_to_path(&tmp)?;
        fs::rename(&tmp, path)?;

        Ok(())
    }
}
