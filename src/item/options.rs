use serde::{Deserialize, Serialize};

/// Settings for opening a record reader through the format dispatcher.
///
/// Every field has a default, so partial configurations deserialize:
///
/// ```
/// use xsvlib::item::options::ReadOptions;
///
/// let options: ReadOptions = serde_json::from_str(r#"{ "separator": ";" }"#).unwrap();
/// assert_eq!(options.separator, ';');
/// assert!(options.skip_empty_lines);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// CSV field separator; ignored for TSV.
    pub separator: char,
    /// Drop blank lines before they reach the parser.
    pub skip_empty_lines: bool,
    /// Trim whitespace around unquoted CSV fields.
    pub trim_spaces: bool,
    /// Drop empty unquoted CSV fields from records.
    pub skip_empty_fields: bool,
    /// Accept single-quoted CSV fields next to double-quoted ones.
    pub single_quotes: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            separator: ',',
            skip_empty_lines: true,
            trim_spaces: true,
            skip_empty_fields: false,
            single_quotes: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTerminator {
    #[default]
    Lf,
    CrLf,
}

impl LineTerminator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineTerminator::Lf => "\n",
            LineTerminator::CrLf => "\r\n",
        }
    }
}

/// Settings for opening a record writer through the format dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// CSV field separator; ignored for TSV.
    pub separator: char,
    /// Exact number of fields per line, or 0 to accept any.
    pub field_count: usize,
    /// Quote every CSV field.
    pub quote_always: bool,
    pub line_terminator: LineTerminator,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            separator: ',',
            field_count: 0,
            quote_always: false,
            line_terminator: LineTerminator::Lf,
        }
    }
}
