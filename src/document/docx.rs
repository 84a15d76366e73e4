//! Decoding of `.docx` packages into the block tree
use crate::document::style::heading_level;
use crate::document::style::StyleTable;
use crate::document::Block;
use crate::document::Cell;
use crate::document::Document;
use crate::document::DocumentError;
use crate::document::Heading;
use crate::document::Paragraph;
use crate::document::Row;
use crate::document::Table;
use crate::error::DocxDdlError;
use crate::error::ResultMessage;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use quick_xml::events::Event;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

// WordprocessingML element local names
const TAG_BODY: &[u8] = b"body";                // Document body
const TAG_PARAGRAPH: &[u8] = b"p";              // Paragraph
const TAG_PARAGRAPH_PROPERTIES: &[u8] = b"pPr"; // Paragraph properties
const TAG_PARAGRAPH_STYLE: &[u8] = b"pStyle";   // Paragraph style reference
const TAG_RUN: &[u8] = b"r";                    // Run of text
const TAG_TEXT: &[u8] = b"t";                   // Text within a run
const TAG_TAB: &[u8] = b"tab";                  // Tab character within a run
const TAG_BREAK: &[u8] = b"br";                 // Line break within a run
const TAG_CARRIAGE_RETURN: &[u8] = b"cr";       // Carriage return within a run
const TAG_TABLE: &[u8] = b"tbl";                // Table
const TAG_ROW: &[u8] = b"tr";                   // Table row
const TAG_CELL: &[u8] = b"tc";                  // Table cell
const TAG_HYPERLINK: &[u8] = b"hyperlink";      // Hyperlink around runs
const TAG_INSERTION: &[u8] = b"ins";            // Tracked insertion around runs

/// Paragraph children whose runs are part of the paragraph text
const RUN_WRAPPERS: [&[u8]; 2] = [TAG_HYPERLINK, TAG_INSERTION];

impl Document {
    /// Opens a `.docx` file and decodes its body
    ///
    /// # Arguments
    /// * `path` - Path to the `.docx` file
    ///
    /// # Returns
    /// The decoded document or an error prefixed with the path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Document, DocxDdlError> {
        let path = path.as_ref();
        let document = File::open(path)
            .map_err(DocxDdlError::from)
            .and_then(|file| Document::from_reader(BufReader::new(file)))
            .with_prefix(&path.display().to_string())?;
        tracing::debug!(path = %path.display(), blocks = document.blocks.len(), "decoded document");
        Ok(document)
    }

    /// Decodes a `.docx` package from any seekable source
    pub fn from_reader<RS: Read + Seek>(reader: RS) -> Result<Document, DocxDdlError> {
        let mut zip = ZipArchive::new(reader)?;
        let styles = StyleTable::load(&mut zip)?;
        let mut reader = zip
            .xml_reader(DOCUMENT_PART)?
            .ok_or_else(|| DocumentError::MissingPart(DOCUMENT_PART.to_owned()))?;
        read_document(&mut reader, &styles)
    }
}

/// Reads `word/document.xml` up to and including the body
pub(crate) fn read_document<R: BufRead>(
    reader: &mut XmlReader<R>,
    styles: &StyleTable,
) -> Result<Document, DocxDdlError> {
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_BODY => {
            let blocks = read_blocks(reader, styles)?;
            return Ok(Document { blocks });
        }
    });
    Ok(Document::default())
}

/// Reads the direct paragraph and table children of a container (body or cell)
/// until the container's end tag. Other wrappers are skipped with their contents.
fn read_blocks<R: BufRead>(
    reader: &mut XmlReader<R>,
    styles: &StyleTable,
) -> Result<Vec<Block>, DocxDdlError> {
    let mut blocks = Vec::new();
    let mut depth = 0usize;
    match_xml_events!(reader => {
        Event::Start(event) if depth == 0 && event.local_name().as_ref() == TAG_PARAGRAPH => {
            blocks.push(read_paragraph(reader, styles)?);
        }
        Event::Start(event) if depth == 0 && event.local_name().as_ref() == TAG_TABLE => {
            blocks.push(Block::Table(read_table(reader, styles)?));
        }
        Event::Start(_) => depth += 1,
        Event::End(_) if depth == 0 => break,
        Event::End(_) => depth -= 1,
    });
    Ok(blocks)
}

/// Reads one paragraph after its start tag; classifies it as heading or plain paragraph by style
fn read_paragraph<R: BufRead>(
    reader: &mut XmlReader<R>,
    styles: &StyleTable,
) -> Result<Block, DocxDdlError> {
    let mut path = Vec::<Vec<u8>>::new();
    let mut style_id = None::<String>;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::Start(event) => {
            let name = event.local_name().as_ref().to_vec();
            let parent = path.last().map(Vec::as_slice);
            if name == TAG_PARAGRAPH_STYLE && path.len() == 1 && parent == Some(TAG_PARAGRAPH_PROPERTIES) {
                style_id = event.get_attribute_value("w:val")?.map(|id| id.to_string());
            } else if is_paragraph_run(&path) {
                if name == TAG_TAB {
                    text.push('\t');
                } else if name == TAG_CARRIAGE_RETURN {
                    text.push('\n');
                } else if name == TAG_BREAK {
                    let is_page_break = event.get_attribute_value("w:type")?
                        .map(|kind| kind == "page" || kind == "column")
                        .unwrap_or(false);
                    if !is_page_break {
                        text.push('\n');
                    }
                }
            }
            path.push(name);
        }
        Event::End(_) => {
            if path.pop().is_none() {
                break;
            }
        }
        Event::Text(event) if is_text_element(&path) => text.push_bytes_text(&event)?,
        Event::GeneralRef(event) if is_text_element(&path) => text.push_bytes_ref(&event)?,
    });

    let style = styles.paragraph_style(style_id.as_deref());
    let block = match heading_level(&style)? {
        Some(level) => Block::Heading(Heading { level, text, style }),
        None => Block::Paragraph(Paragraph { style, text }),
    };
    Ok(block)
}

/// A run directly inside the paragraph, possibly within a hyperlink or insertion.
/// Runs nested deeper (text boxes, alternate content) belong to other paragraphs.
fn is_paragraph_run(path: &[Vec<u8>]) -> bool {
    match path.split_last() {
        Some((last, wrappers)) => {
            last.as_slice() == TAG_RUN
                && wrappers.iter().all(|wrapper| RUN_WRAPPERS.contains(&wrapper.as_slice()))
        }
        None => false,
    }
}

/// Text is only taken from `w:t` elements of paragraph runs
fn is_text_element(path: &[Vec<u8>]) -> bool {
    match path.split_last() {
        Some((last, run)) => last.as_slice() == TAG_TEXT && is_paragraph_run(run),
        None => false,
    }
}

/// Reads one table after its start tag
fn read_table<R: BufRead>(
    reader: &mut XmlReader<R>,
    styles: &StyleTable,
) -> Result<Table, DocxDdlError> {
    let mut table = Table::default();
    let mut depth = 0usize;
    match_xml_events!(reader => {
        Event::Start(event) if depth == 0 && event.local_name().as_ref() == TAG_ROW => {
            table.rows.push(read_row(reader, styles)?);
        }
        Event::Start(_) => depth += 1,
        Event::End(_) if depth == 0 => break,
        Event::End(_) => depth -= 1,
    });
    Ok(table)
}

/// Reads one table row after its start tag
fn read_row<R: BufRead>(
    reader: &mut XmlReader<R>,
    styles: &StyleTable,
) -> Result<Row, DocxDdlError> {
    let mut row = Row::default();
    let mut depth = 0usize;
    match_xml_events!(reader => {
        Event::Start(event) if depth == 0 && event.local_name().as_ref() == TAG_CELL => {
            let blocks = read_blocks(reader, styles)?;
            row.cells.push(Cell { blocks });
        }
        Event::Start(_) => depth += 1,
        Event::End(_) if depth == 0 => break,
        Event::End(_) => depth -= 1,
    });
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::iter_blocks;
    use crate::document::Scope;
    use std::io::Cursor;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn paragraph(style: Option<&str>, text: &str) -> String {
        let properties = style
            .map(|id| format!(r#"<w:pPr><w:pStyle w:val="{id}"/></w:pPr>"#))
            .unwrap_or_default();
        format!(r#"<w:p>{properties}<w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
    }

    fn table(rows: &[&[&str]]) -> String {
        let rows: String = rows
            .iter()
            .map(|cells| {
                let cells: String = cells
                    .iter()
                    .map(|text| format!("<w:tc><w:tcPr/>{}</w:tc>", paragraph(None, text)))
                    .collect();
                format!("<w:tr>{cells}</w:tr>")
            })
            .collect();
        format!("<w:tbl><w:tblPr/>{rows}</w:tbl>")
    }

    fn document_xml(body: &str) -> String {
        format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {W}><w:body>{body}<w:sectPr/></w:body></w:document>"#)
    }

    fn styles() -> StyleTable {
        let mut styles = StyleTable::default();
        styles.insert("Heading1", "heading 1");
        styles.insert("Heading2", "heading 2");
        styles.insert("Normal", "Normal");
        styles
    }

    fn parse(body: &str) -> Document {
        let xml = document_xml(body);
        let mut reader = XmlReader::new(xml.as_bytes());
        read_document(&mut reader, &styles()).unwrap()
    }

    #[test]
    fn headings_paragraphs_and_tables_in_order() {
        let body = [
            paragraph(Some("Heading1"), "1 / users（用户表）"),
            paragraph(Some("Normal"), "主键 + id"),
            table(&[&["中文名", "name"], &["主键", "id"]]),
        ]
        .concat();
        let document = parse(&body);
        assert_eq!(document.blocks.len(), 3);
        assert_eq!(document.blocks[0], Block::Heading(Heading::new(1, "1 / users（用户表）")));
        assert_eq!(document.blocks[1], Block::Paragraph(Paragraph::new("Normal", "主键 + id")));
        let Block::Table(table) = &document.blocks[2] else {
            panic!("expected table");
        };
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].texts(), vec!["主键", "id"]);
    }

    #[test]
    fn run_text_tabs_breaks_and_entities() {
        let body = r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>a&amp;b</w:t><w:tab/><w:t>c</w:t><w:br/><w:t>d</w:t></w:r><w:r><w:instrText>PAGE</w:instrText></w:r></w:p>"#;
        let document = parse(body);
        assert_eq!(document.blocks, vec![Block::Paragraph(Paragraph::new("Normal", "a&b\tc\nd"))]);
    }

    #[test]
    fn text_box_content_stays_out_of_the_paragraph() {
        let text_box = r#"<w:txbxContent><w:p><w:r><w:t>（note）/x</w:t></w:r></w:p></w:txbxContent>"#;
        let body = format!(
            concat!(
                r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr>"#,
                r#"<w:r><w:t xml:space="preserve">1 / </w:t></w:r>"#,
                r#"<w:hyperlink><w:r><w:t>users</w:t></w:r></w:hyperlink>"#,
                r#"<w:r><mc:AlternateContent><mc:Choice Requires="wps"><w:drawing><wps:txbx>{0}</wps:txbx></w:drawing></mc:Choice>"#,
                r#"<mc:Fallback><w:pict><v:textbox>{0}</v:textbox></w:pict></mc:Fallback></mc:AlternateContent></w:r>"#,
                r#"</w:p>"#
            ),
            text_box
        );
        let document = parse(&body);
        assert_eq!(document.blocks, vec![Block::Heading(Heading::new(1, "1 / users"))]);
    }

    #[test]
    fn wrapped_content_is_not_a_direct_child() {
        let body = format!(
            "<w:sdt><w:sdtContent>{}</w:sdtContent></w:sdt>{}",
            paragraph(None, "hidden"),
            paragraph(None, "visible")
        );
        let document = parse(&body);
        assert_eq!(document.blocks, vec![Block::Paragraph(Paragraph::new("Normal", "visible"))]);
    }

    #[test]
    fn nested_table_belongs_to_cell() {
        let inner = table(&[&["x"]]);
        let body = format!(
            "<w:tbl><w:tr><w:tc>{}{}</w:tc></w:tr></w:tbl>{}",
            paragraph(None, "outer"),
            inner,
            paragraph(None, "after")
        );
        let document = parse(&body);
        assert_eq!(document.blocks.len(), 2);
        let Block::Table(table) = &document.blocks[0] else {
            panic!("expected table");
        };
        let cell = &table.rows[0].cells[0];
        assert_eq!(cell.text(), "outer");
        assert_eq!(iter_blocks(Scope::Cell(cell)).unwrap().count(), 2);
    }

    #[test]
    fn heading_style_without_level_is_rejected() {
        let mut styles = styles();
        styles.insert("Custom", "Heading");
        let xml = document_xml(&paragraph(Some("Custom"), "oops"));
        let mut reader = XmlReader::new(xml.as_bytes());
        let result = read_document(&mut reader, &styles);
        assert!(matches!(
            result,
            Err(DocxDdlError::DocumentError(DocumentError::InvalidHeadingLevel(_)))
        ));
    }

    fn package(parts: &[(&str, String)]) -> Cursor<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        Cursor::new(writer.finish().unwrap().into_inner())
    }

    #[test]
    fn read_package_with_styles() {
        let styles = format!(
            r#"<w:styles {W}><w:style w:type="paragraph" w:default="1" w:styleId="a"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="2"><w:name w:val="heading 2"/></w:style></w:styles>"#
        );
        let body = [paragraph(Some("2"), "orders"), paragraph(None, "plain")].concat();
        let cursor = package(&[
            ("word/styles.xml", styles),
            ("word/document.xml", document_xml(&body)),
        ]);
        let document = Document::from_reader(cursor).unwrap();
        assert_eq!(
            document.blocks,
            vec![
                Block::Heading(Heading::new(2, "orders")),
                Block::Paragraph(Paragraph::new("Normal", "plain")),
            ]
        );
    }

    #[test]
    fn package_without_document_part() {
        let cursor = package(&[("[Content_Types].xml", "<Types/>".to_owned())]);
        let result = Document::from_reader(cursor);
        assert!(matches!(
            result,
            Err(DocxDdlError::DocumentError(DocumentError::MissingPart(_)))
        ));
    }

    #[test]
    fn open_missing_file_names_the_path() {
        let error = Document::open("no/such/file.docx").unwrap_err();
        assert!(error.to_string().starts_with("no/such/file.docx: "));
    }
}
