//! Delimited-text export in a stable column order and a site-appropriate
//! text encoding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KuchikomiError;
use crate::record::ReviewRecord;

/// Output text encoding for CSV files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    /// Shift_JIS, what Japanese spreadsheet software opens by default.
    #[default]
    #[serde(rename = "shift_jis")]
    ShiftJis,
    #[serde(rename = "utf-8")]
    Utf8,
    /// UTF-8 with a byte-order mark.
    #[serde(rename = "utf-8-sig")]
    Utf8Bom,
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

impl TextEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShiftJis => "shift_jis",
            Self::Utf8 => "utf-8",
            Self::Utf8Bom => "utf-8-sig",
        }
    }

    /// Encodes `text`. Characters Shift_JIS cannot represent become numeric
    /// character references; their presence is logged.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf8Bom => {
                let mut out = Vec::with_capacity(UTF8_BOM.len() + text.len());
                out.extend_from_slice(UTF8_BOM);
                out.extend_from_slice(text.as_bytes());
                out
            }
            Self::ShiftJis => {
                let (bytes, _, had_unmappable) = encoding_rs::SHIFT_JIS.encode(text);
                if had_unmappable {
                    let count = text
                        .chars()
                        .filter(|c| {
                            let mut buf = [0u8; 4];
                            encoding_rs::SHIFT_JIS
                                .encode(c.encode_utf8(&mut buf))
                                .2
                        })
                        .count();
                    tracing::warn!(
                        "{} character(s) not representable in Shift_JIS were written as numeric references",
                        count
                    );
                }
                bytes.into_owned()
            }
        }
    }

    /// Decodes `bytes`. A leading BOM always wins over the declared encoding.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, KuchikomiError> {
        let encoding = match self {
            Self::ShiftJis => encoding_rs::SHIFT_JIS,
            Self::Utf8 | Self::Utf8Bom => encoding_rs::UTF_8,
        };
        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            return Err(KuchikomiError::InvalidInput(format!(
                "input is not valid {}",
                self.as_str()
            )));
        }
        Ok(text.into_owned())
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextEncoding {
    type Err = KuchikomiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "shift-jis" | "sjis" | "cp932" => Ok(Self::ShiftJis),
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "utf-8-sig" | "utf8-sig" | "utf-8-bom" => Ok(Self::Utf8Bom),
            _ => Err(KuchikomiError::InvalidInput(format!(
                "unknown encoding '{}'. Valid encodings: shift_jis, utf-8, utf-8-sig",
                s
            ))),
        }
    }
}

/// Exportable review fields, declared in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Score,
    Age,
    SkinType,
    Gender,
    Comment,
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Self::Score => "score",
            Self::Age => "age",
            Self::SkinType => "skin_type",
            Self::Gender => "gender",
            Self::Comment => "comment",
        }
    }

    pub fn value(&self, record: &ReviewRecord) -> String {
        match self {
            Self::Score => record.score.map(|s| s.to_string()).unwrap_or_default(),
            Self::Age => record.age.clone().unwrap_or_default(),
            Self::SkinType => record.skin_type.clone().unwrap_or_default(),
            Self::Gender => record.gender.clone().unwrap_or_default(),
            Self::Comment => record.comment.clone(),
        }
    }
}

/// Writes `records` as CSV text restricted to `columns`, in canonical order.
pub fn records_to_csv(records: &[ReviewRecord], columns: &[Column]) -> Result<String, KuchikomiError> {
    let mut columns = columns.to_vec();
    columns.sort();
    columns.dedup();
    if columns.is_empty() {
        return Err(KuchikomiError::Export("no columns selected".into()));
    }

    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(columns.iter().map(Column::header))?;
    for record in records {
        wtr.write_record(columns.iter().map(|c| c.value(record)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| KuchikomiError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| KuchikomiError::Export(e.to_string()))
}

/// CSV export encoded for the target audience.
pub fn export_records(
    records: &[ReviewRecord],
    columns: &[Column],
    encoding: TextEncoding,
) -> Result<Vec<u8>, KuchikomiError> {
    let text = records_to_csv(records, columns)?;
    Ok(encoding.encode(&text))
}
