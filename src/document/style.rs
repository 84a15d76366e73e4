//! Paragraph style resolution for WordprocessingML documents
use crate::document::DocumentError;
use crate::error::DocxDdlError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use quick_xml::events::Event;
use regex::Regex;
use std::collections::HashMap;
use std::io::Read;
use std::io::Seek;
use std::sync::LazyLock;
use zip::ZipArchive;

/// UI name of the plain body style
pub const NORMAL_STYLE: &str = "Normal";

/// Prefix shared by all heading style UI names
const HEADING_PREFIX: &str = "Heading";

const STYLES_PART: &str = "word/styles.xml";

const TAG_STYLE: &[u8] = b"style"; // Style definition
const TAG_NAME: &[u8] = b"name";   // Internal style name

/// Internal heading names are lower-case (`heading 1`); the UI shows them capitalized
static BUILTIN_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^heading\s*(\d+)$").expect("Hardcode regex pattern"));

/// Style ids to UI style names, loaded from `word/styles.xml`.
#[derive(Clone, Debug, Default)]
pub struct StyleTable {
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl StyleTable {
    /// Loads style definitions from the package; a package without a styles part yields an empty table.
    pub(crate) fn load<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<StyleTable, DocxDdlError> {
        let mut table = StyleTable::default();
        let mut reader = match zip.xml_reader(STYLES_PART)? {
            Some(reader) => reader,
            None => return Ok(table),
        };

        let mut style_id = None::<String>;
        let mut is_default_paragraph = false;
        match_xml_events!(reader => {
            Event::Start(event) if event.local_name().as_ref() == TAG_STYLE => {
                style_id = event.get_attribute_value("w:styleId")?.map(|id| id.to_string());
                let is_paragraph = event.get_attribute_value("w:type")?
                    .map(|kind| kind == "paragraph")
                    .unwrap_or(false);
                let is_default = event.get_attribute_value("w:default")?
                    .map(|value| value == "1" || value == "true")
                    .unwrap_or(false);
                is_default_paragraph = is_paragraph && is_default;
            }
            Event::Start(event) if style_id.is_some() && event.local_name().as_ref() == TAG_NAME => {
                if let Some((id, name)) = style_id.take().zip(event.get_attribute_value("w:val")?) {
                    let name = ui_style_name(&name);
                    if is_default_paragraph {
                        table.default_paragraph = Some(name.clone());
                    }
                    table.names.insert(id, name);
                }
            }
            Event::End(event) if event.local_name().as_ref() == TAG_STYLE => {
                style_id = None;
                is_default_paragraph = false;
            }
        });
        Ok(table)
    }

    /// Registers a style id with its internal name.
    pub fn insert(&mut self, style_id: &str, name: &str) {
        self.names.insert(style_id.to_owned(), ui_style_name(name));
    }

    /// Resolves the UI style name of a paragraph from its `w:pStyle` id.
    /// Missing or unknown ids fall back to the default paragraph style.
    pub fn paragraph_style(&self, style_id: Option<&str>) -> String {
        style_id
            .and_then(|id| self.names.get(id))
            .or(self.default_paragraph.as_ref())
            .map(String::to_owned)
            .unwrap_or_else(|| NORMAL_STYLE.to_owned())
    }
}

/// Maps an internal style name to the name Word shows in its UI.
pub fn ui_style_name(name: &str) -> String {
    if let Some(captures) = BUILTIN_HEADING.captures(name) {
        return format!("{HEADING_PREFIX} {}", &captures[1]);
    }
    match name {
        "normal" => NORMAL_STYLE.to_owned(),
        "caption" => "Caption".to_owned(),
        "header" => "Header".to_owned(),
        "footer" => "Footer".to_owned(),
        "title" => "Title".to_owned(),
        _ => name.to_owned(),
    }
}

/// Heading level of a UI style name, `None` for non-heading styles.
///
/// The level is the number after the last space, so `Heading 2` is level 2.
pub fn heading_level(style: &str) -> Result<Option<usize>, DocumentError> {
    if !style.starts_with(HEADING_PREFIX) {
        return Ok(None);
    }
    style
        .rsplit(' ')
        .next()
        .and_then(|level| level.parse::<usize>().ok())
        .filter(|level| *level > 0)
        .map(Some)
        .ok_or_else(|| DocumentError::InvalidHeadingLevel(style.to_owned()))
}
