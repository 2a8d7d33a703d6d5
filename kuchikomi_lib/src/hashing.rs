//! SHA-256 pseudonymisation of selected CSV columns.

use sha2::{Digest, Sha256};

use crate::error::KuchikomiError;
use crate::export::TextEncoding;

/// Lowercase hex SHA-256 of `value`'s UTF-8 bytes.
pub fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The hashed columns only, in the order they were requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl HashedTable {
    pub fn to_csv(&self) -> Result<String, KuchikomiError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| KuchikomiError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| KuchikomiError::Export(e.to_string()))
    }

    pub fn encode(&self, encoding: TextEncoding) -> Result<Vec<u8>, KuchikomiError> {
        Ok(encoding.encode(&self.to_csv()?))
    }
}

/// Decodes `input`, hashes every value of `columns`, and returns just those
/// columns. Empty cells stay empty.
pub fn hash_columns(
    input: &[u8],
    encoding: TextEncoding,
    columns: &[String],
) -> Result<HashedTable, KuchikomiError> {
    let text = encoding.decode(input)?;
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let indices = columns
        .iter()
        .map(|wanted| {
            headers.iter().position(|h| h == wanted).ok_or_else(|| {
                KuchikomiError::InvalidInput(format!(
                    "column '{}' not found. Available columns: {}",
                    wanted,
                    headers.join(", ")
                ))
            })
        })
        .collect::<Result<Vec<usize>, _>>()?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            indices
                .iter()
                .map(|&i| match record.get(i) {
                    Some(value) if !value.is_empty() => sha256_hex(value),
                    _ => String::new(),
                })
                .collect(),
        );
    }

    Ok(HashedTable {
        headers: columns.to_vec(),
        rows,
    })
}
