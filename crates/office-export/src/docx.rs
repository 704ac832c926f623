//! Word export: one heading and one paragraph per analyzed file

use std::io::Cursor;

use docx_rs::{BreakType, Docx, Paragraph, Run, Style, StyleType};
use shared_types::AnalysisRecord;
use tracing::debug;

use crate::error::ExportError;

const HEADING_STYLE: &str = "Heading2";

/// Build a `.docx` with a level-2 heading (the filename) followed by the
/// analysis text for each record, in input order. Line breaks in the
/// analysis are kept.
pub fn analysis_docx(records: &[AnalysisRecord]) -> Result<Vec<u8>, ExportError> {
    let mut docx = Docx::new().add_style(
        Style::new(HEADING_STYLE, StyleType::Paragraph)
            .name("Heading 2")
            .size(26)
            .bold(),
    );

    for record in records {
        docx = docx
            .add_paragraph(
                Paragraph::new()
                    .style(HEADING_STYLE)
                    .add_run(Run::new().add_text(&record.filename)),
            )
            .add_paragraph(Paragraph::new().add_run(text_run(&record.analysis)));
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ExportError::Docx(e.to_string()))?;

    let bytes = buffer.into_inner();
    debug!("Wrote docx with {} sections ({} bytes)", records.len(), bytes.len());
    Ok(bytes)
}

/// One run with a soft line break between the lines of `text`
fn text_run(text: &str) -> Run {
    let mut run = Run::new();
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line);
    }
    run
}
