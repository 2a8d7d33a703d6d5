use crate::adapter::SiteAdapter;
use crate::error::KuchikomiError;
use crate::record::PageBound;

pub const MAX_PRODUCT_ID_LENGTH: usize = 200;

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a byte-length limit.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, KuchikomiError> {
    if input.len() > max_len {
        return Err(KuchikomiError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(KuchikomiError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

/// Validate a product identifier. Only emptiness and length are checked; an
/// id the site does not know simply yields no reviews.
pub fn validate_product_id(input: &str) -> Result<String, KuchikomiError> {
    sanitize_text(input, MAX_PRODUCT_ID_LENGTH).map_err(|e| match e {
        KuchikomiError::InvalidInput(msg) => {
            KuchikomiError::InvalidInput(format!("product id: {}", msg))
        }
        other => other,
    })
}

/// Validate a page count against the adapter's cap. `None` means all pages.
pub fn validate_max_pages(
    pages: Option<u32>,
    adapter: &SiteAdapter,
) -> Result<PageBound, KuchikomiError> {
    let Some(n) = pages else {
        return Ok(PageBound::All);
    };
    let bound = PageBound::limit(n).ok_or_else(|| {
        KuchikomiError::InvalidInput("page count must be at least 1".to_string())
    })?;
    if let Some(cap) = adapter.max_pages_cap {
        if n > cap {
            return Err(KuchikomiError::InvalidInput(format!(
                "page count {} exceeds the {} limit of {}",
                n, adapter.label, cap
            )));
        }
    }
    Ok(bound)
}

/// Split a comma-separated column list, trimming blanks and duplicates.
pub fn validate_columns(input: &str) -> Result<Vec<String>, KuchikomiError> {
    let mut columns: Vec<String> = Vec::new();
    for part in input.split(',') {
        let name = part.trim();
        if !name.is_empty() && !columns.iter().any(|c| c == name) {
            columns.push(name.to_string());
        }
    }
    if columns.is_empty() {
        return Err(KuchikomiError::InvalidInput(
            "at least one column is required".to_string(),
        ));
    }
    Ok(columns)
}
