//! Word document (`.docx`) paragraph extraction
use crate::error::DashboardError;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use quick_xml::events::Event;
use std::io::Cursor;
use tracing::debug;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

// Local names inside the WordprocessingML namespace
const TAG_PARAGRAPH: &[u8] = b"p";
const TAG_TABLE: &[u8] = b"tbl";
const TAG_RUN: &[u8] = b"r";
const TAG_TEXT: &[u8] = b"t";
const TAG_TAB: &[u8] = b"tab";
const TAG_BREAK: &[u8] = b"br";
const TAG_CARRIAGE_RETURN: &[u8] = b"cr";

/// Extracts the text of every body paragraph that is not blank.
///
/// Only top-level paragraphs count: paragraphs inside tables and nested text boxes are
/// skipped. Run text is concatenated, tabs become `\t` and breaks become `\n`. Tabs and
/// breaks outside a run (tab stops of the paragraph properties) are not content.
pub(crate) fn read_paragraphs(bytes: &[u8]) -> Result<Vec<String>, DashboardError> {
    let mut zip = ZipArchive::new(Cursor::new(bytes))?;
    let mut reader = zip.xml_reader(DOCUMENT_PART)?
        .ok_or_else(|| DashboardError::ParseError(format!("missing package part '{}'", DOCUMENT_PART)))?;

    let mut paragraphs = Vec::<String>::new();
    let mut table_depth = 0usize;
    let mut paragraph_depth = 0usize;
    let mut run_depth = 0usize;
    let mut is_text = false;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_TABLE => table_depth += 1,
        Event::End(event) if event.local_name().as_ref() == TAG_TABLE => table_depth = table_depth.saturating_sub(1),
        Event::Start(event) if event.local_name().as_ref() == TAG_PARAGRAPH => {
            paragraph_depth += 1;
            if paragraph_depth == 1 {
                text.clear();
                run_depth = 0;
            }
        }
        Event::End(event) if event.local_name().as_ref() == TAG_PARAGRAPH => {
            if paragraph_depth == 1 && table_depth == 0 && !text.trim().is_empty() {
                paragraphs.push(std::mem::take(&mut text));
            }
            paragraph_depth = paragraph_depth.saturating_sub(1);
        }
        Event::Start(event) if paragraph_depth == 1 && event.local_name().as_ref() == TAG_RUN => run_depth += 1,
        Event::End(event) if paragraph_depth == 1 && event.local_name().as_ref() == TAG_RUN => run_depth = run_depth.saturating_sub(1),
        Event::Start(event) if paragraph_depth == 1 && run_depth > 0 && event.local_name().as_ref() == TAG_TEXT => is_text = true,
        Event::End(event) if event.local_name().as_ref() == TAG_TEXT => is_text = false,
        Event::Start(event) if paragraph_depth == 1 && run_depth > 0 && event.local_name().as_ref() == TAG_TAB => text.push('\t'),
        Event::Start(event) if paragraph_depth == 1 && run_depth > 0 && is_break(event.local_name().as_ref()) => text.push('\n'),
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    debug!(paragraphs = paragraphs.len(), "extracted document paragraphs");
    Ok(paragraphs)
}

fn is_break(name: &[u8]) -> bool {
    name == TAG_BREAK || name == TAG_CARRIAGE_RETURN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ingest::fixtures;

    #[test]
    fn extracts_non_blank_body_paragraphs() {
        let bytes = fixtures::docx(concat!(
            "<w:p><w:r><w:t>Relat&#243;rio</w:t></w:r><w:r><w:t xml:space=\"preserve\"> di&#225;rio</w:t></w:r></w:p>",
            "<w:p/>",
            "<w:p><w:r><w:t xml:space=\"preserve\">   </w:t></w:r></w:p>",
            "<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c &amp; d</w:t></w:r></w:p>",
        ));
        let paragraphs = read_paragraphs(&bytes).unwrap();
        assert_eq!(paragraphs, vec!["Relatório diário".to_owned(), "a\tb\nc & d".to_owned()]);
    }

    #[test]
    fn ignores_paragraph_tab_stops() {
        let bytes = fixtures::docx(concat!(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>",
            "<w:r><w:rPr><w:b/></w:rPr><w:t>Hello</w:t></w:r></w:p>",
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"left\" w:pos=\"720\"/></w:tabs></w:pPr>",
            "<w:r><w:tab/><w:t>indented</w:t></w:r></w:p>",
        ));
        assert_eq!(read_paragraphs(&bytes).unwrap(), vec!["Hello".to_owned(), "\tindented".to_owned()]);
    }

    #[test]
    fn skips_table_paragraphs() {
        let bytes = fixtures::docx(concat!(
            "<w:p><w:r><w:t>before</w:t></w:r></w:p>",
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
            "<w:p><w:r><w:t>after</w:t></w:r></w:p>",
        ));
        assert_eq!(read_paragraphs(&bytes).unwrap(), vec!["before".to_owned(), "after".to_owned()]);
    }

    #[test]
    fn rejects_non_document_packages() {
        let error = read_paragraphs(b"not a zip").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ParseError);
        let bytes = fixtures::zip(&[("content.xml", "<x/>")]);
        assert_eq!(read_paragraphs(&bytes).unwrap_err().kind(), ErrorKind::ParseError);
    }
}
