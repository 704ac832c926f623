//! Side-by-side comparison of section values across documents

use serde::Serialize;
use shared_types::{AnalysisRecord, SectionLabel, NOT_SPECIFIED};

use crate::sections::extract_section;

/// Header of the first column in the section grid
pub const SECTION_HEADER: &str = "Section";

/// One document of the raw fallback table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRow {
    pub filename: String,
    pub analysis: String,
}

/// Comparison table across a batch of analyses.
///
/// Every cell is populated: a value that could not be located is
/// [`NOT_SPECIFIED`]. When no cell of the whole table could be filled the
/// analyses are kept verbatim in the `Raw` form instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComparisonMatrix {
    Sections {
        labels: Vec<SectionLabel>,
        filenames: Vec<String>,
        /// `cells[row][column]`, rows in label order, columns in document order
        cells: Vec<Vec<String>>,
    },
    Raw { rows: Vec<RawRow> },
}

impl ComparisonMatrix {
    /// Parse every label out of every document
    pub fn build(labels: &[SectionLabel], documents: &[AnalysisRecord]) -> Self {
        let cells: Vec<Vec<String>> = labels
            .iter()
            .map(|label| {
                documents
                    .iter()
                    .map(|doc| extract_section(&doc.analysis, *label))
                    .collect()
            })
            .collect();

        let all_missing = cells.iter().flatten().all(|cell| cell == NOT_SPECIFIED);
        if all_missing {
            return ComparisonMatrix::Raw {
                rows: documents
                    .iter()
                    .map(|doc| RawRow {
                        filename: doc.filename.clone(),
                        analysis: doc.analysis.clone(),
                    })
                    .collect(),
            };
        }

        ComparisonMatrix::Sections {
            labels: labels.to_vec(),
            filenames: documents.iter().map(|doc| doc.filename.clone()).collect(),
            cells,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ComparisonMatrix::Raw { .. })
    }

    /// Value for `label` in `filename`'s column. `None` for the raw form
    /// and for labels or files that are not part of the table.
    pub fn cell(&self, label: SectionLabel, filename: &str) -> Option<&str> {
        let ComparisonMatrix::Sections {
            labels,
            filenames,
            cells,
        } = self
        else {
            return None;
        };

        let row = labels.iter().position(|l| *l == label)?;
        let column = filenames.iter().position(|f| f == filename)?;
        cells.get(row)?.get(column).map(String::as_str)
    }

    /// Documents in input order
    pub fn filenames(&self) -> Vec<&str> {
        match self {
            ComparisonMatrix::Sections { filenames, .. } => {
                filenames.iter().map(String::as_str).collect()
            }
            ComparisonMatrix::Raw { rows } => rows.iter().map(|r| r.filename.as_str()).collect(),
        }
    }

    /// The table as a string grid with a header row.
    ///
    /// Sections: `["Section", <filenames>...]` then one row per label.
    /// Raw: `["Filename", "Analysis"]` then one row per document.
    pub fn rows(&self) -> Vec<Vec<String>> {
        match self {
            ComparisonMatrix::Sections {
                labels,
                filenames,
                cells,
            } => {
                let mut header = Vec::with_capacity(filenames.len() + 1);
                header.push(SECTION_HEADER.to_string());
                header.extend(filenames.iter().cloned());

                let mut grid = vec![header];
                for (label, row) in labels.iter().zip(cells) {
                    let mut line = Vec::with_capacity(row.len() + 1);
                    line.push(label.to_string());
                    line.extend(row.iter().cloned());
                    grid.push(line);
                }
                grid
            }
            ComparisonMatrix::Raw { rows } => {
                let mut grid = vec![vec!["Filename".to_string(), "Analysis".to_string()]];
                grid.extend(
                    rows.iter()
                        .map(|r| vec![r.filename.clone(), r.analysis.clone()]),
                );
                grid
            }
        }
    }
}
