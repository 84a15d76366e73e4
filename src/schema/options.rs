use crate::error::DocxDdlError;
use glob::Pattern;

/// Default primary-key marker token ("primary key")
pub const DEFAULT_PRIMARY_KEY_MARKER: &str = "主键";

/// What to do with a table that has no primary-key annotation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MissingPrimaryKey {
    /// Not a schema table: leave it out of the schema map
    #[default]
    Exclude,
    /// Keep the table with an empty primary key, so no constraint is generated
    KeepWithoutConstraint,
}

/// Options controlling schema extraction.
#[derive(Clone, Debug)]
pub struct ExtractOptions {
    /// Token identifying a paragraph as a primary-key annotation
    pub primary_key_marker: String,

    /// Style name of plain body paragraphs eligible as annotations
    pub body_style: String,

    /// Handling of tables without a primary-key annotation
    pub missing_primary_key: MissingPrimaryKey,

    /// Table name patterns; only matching tables are extracted when set
    pub table_name_patterns: Option<Vec<Pattern>>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            primary_key_marker: DEFAULT_PRIMARY_KEY_MARKER.to_owned(),
            body_style: crate::document::style::NORMAL_STYLE.to_owned(),
            missing_primary_key: MissingPrimaryKey::default(),
            table_name_patterns: None,
        }
    }
}

impl ExtractOptions {
    pub fn with_primary_key_marker(mut self, marker: &str) -> Self {
        self.primary_key_marker = marker.to_owned();
        self
    }

    pub fn with_body_style(mut self, style: &str) -> Self {
        self.body_style = style.to_owned();
        self
    }

    pub fn with_missing_primary_key(mut self, policy: MissingPrimaryKey) -> Self {
        self.missing_primary_key = policy;
        self
    }

    /// Restricts extraction to table names matching any of the glob patterns.
    /// An empty list leaves the filter unset.
    pub fn with_table_name_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self, DocxDdlError> {
        if patterns.is_empty() {
            self.table_name_patterns = None;
        } else {
            let patterns = patterns
                .iter()
                .map(|pattern| Pattern::new(pattern.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            self.table_name_patterns = Some(patterns);
        }
        Ok(self)
    }

    /// Checks if a table name matches the patterns.
    /// Returns true if no patterns are specified or if name matches any pattern.
    pub fn accept(&self, table_name: &str) -> bool {
        if let Some(patterns) = &self.table_name_patterns {
            patterns.iter().any(|pattern| pattern.matches(table_name))
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ExtractOptions::default();
        assert_eq!(options.primary_key_marker, "主键");
        assert_eq!(options.body_style, "Normal");
        assert_eq!(options.missing_primary_key, MissingPrimaryKey::Exclude);
        assert!(options.accept("anything"));
    }

    #[test]
    fn table_name_patterns() {
        let options = ExtractOptions::default()
            .with_table_name_patterns(&["t_*", "users"])
            .unwrap();
        assert!(options.accept("t_order"));
        assert!(options.accept("users"));
        assert!(!options.accept("orders"));
    }

    #[test]
    fn invalid_pattern() {
        let result = ExtractOptions::default().with_table_name_patterns(&["[unclosed"]);
        assert!(matches!(result, Err(DocxDdlError::PatternError(_))));
    }
}
