use anyhow::Result;
use kuchikomi_lib::{HashedTable, ReviewRecord, SiteAdapter};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

#[derive(Tabled, Serialize)]
struct ReviewRow {
    #[tabled(rename = "#")]
    #[serde(rename = "#")]
    index: usize,
    #[tabled(rename = "Score")]
    #[serde(rename = "Score")]
    score: String,
    #[tabled(rename = "Age")]
    #[serde(rename = "Age")]
    age: String,
    #[tabled(rename = "Skin Type")]
    #[serde(rename = "Skin Type")]
    skin_type: String,
    #[tabled(rename = "Gender")]
    #[serde(rename = "Gender")]
    gender: String,
    #[tabled(rename = "Comment")]
    #[serde(rename = "Comment")]
    comment: String,
}

#[derive(Tabled, Serialize)]
struct SiteRow {
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Site")]
    #[serde(rename = "Site")]
    label: String,
    #[tabled(rename = "Base URL")]
    #[serde(rename = "Base URL")]
    base_url: String,
    #[tabled(rename = "Encoding")]
    #[serde(rename = "Encoding")]
    encoding: String,
    #[tabled(rename = "Max Pages")]
    #[serde(rename = "Max Pages")]
    max_pages: String,
    #[tabled(rename = "Columns")]
    #[serde(rename = "Columns")]
    columns: String,
    #[tabled(rename = "Selectors")]
    #[serde(rename = "Selectors")]
    selectors: String,
}

// -- Row builders --

fn build_review_rows(records: &[ReviewRecord]) -> Vec<ReviewRow> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| ReviewRow {
            index: i + 1,
            score: r.score.map(|s| s.to_string()).unwrap_or_default(),
            age: r.age.clone().unwrap_or_default(),
            skin_type: r.skin_type.clone().unwrap_or_default(),
            gender: r.gender.clone().unwrap_or_default(),
            comment: r.comment.clone(),
        })
        .collect()
}

fn build_site_rows(adapters: &[SiteAdapter]) -> Vec<SiteRow> {
    adapters
        .iter()
        .map(|a| SiteRow {
            name: a.name.clone(),
            label: a.label.clone(),
            base_url: a.base_url.clone(),
            encoding: a.export_encoding.to_string(),
            max_pages: a
                .max_pages_cap
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            columns: a
                .columns()
                .iter()
                .map(|c| c.header())
                .collect::<Vec<_>>()
                .join(", "),
            selectors: a.describe_selectors(),
        })
        .collect()
}

fn build_hashed_table(table: &HashedTable) -> Table {
    let mut builder = Builder::default();
    builder.push_record(table.headers.iter().cloned());
    for row in &table.rows {
        builder.push_record(row.iter().cloned());
    }
    builder.build()
}

// -- Table output --

pub fn print_reviews_table(records: &[ReviewRecord]) {
    println!("{}", Table::new(build_review_rows(records)));
}

pub fn print_sites_table(adapters: &[SiteAdapter]) {
    println!("{}", Table::new(build_site_rows(adapters)));
}

pub fn print_hashed_table(table: &HashedTable) {
    println!("{}", build_hashed_table(table));
}

// -- Markdown output --

pub fn print_reviews_markdown(records: &[ReviewRecord]) {
    let mut table = Table::new(build_review_rows(records));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_sites_markdown(adapters: &[SiteAdapter]) {
    let mut table = Table::new(build_site_rows(adapters));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_hashed_markdown(table: &HashedTable) {
    let mut table = build_hashed_table(table);
    table.with(Style::markdown());
    println!("{}", table);
}

// -- CSV output --

pub fn print_reviews_csv(records: &[ReviewRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_review_rows(records) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_sites_csv(adapters: &[SiteAdapter]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_site_rows(adapters) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_hashed_csv(table: &HashedTable) -> Result<()> {
    print!("{}", table.to_csv()?);
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// Hashed rows as JSON objects keyed by column name.
pub fn hashed_to_json(table: &HashedTable) -> serde_json::Value {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let object: serde_json::Map<String, serde_json::Value> = table
                .headers
                .iter()
                .zip(row)
                .map(|(h, v)| (h.clone(), serde_json::Value::String(v.clone())))
                .collect();
            serde_json::Value::Object(object)
        })
        .collect();
    serde_json::Value::Array(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<ReviewRecord> {
        vec![
            ReviewRecord {
                score: Some(4),
                age: Some("32歳".into()),
                skin_type: Some("乾燥肌".into()),
                gender: None,
                comment: "しっとりします".into(),
            },
            ReviewRecord::new("普通でした"),
        ]
    }

    // -- Row builder tests --

    #[test]
    fn test_build_review_rows_mapping() {
        let rows = build_review_rows(&sample_records());
        assert_eq!(rows.len(), 2);

        let row = &rows[0];
        assert_eq!(row.index, 1);
        assert_eq!(row.score, "4");
        assert_eq!(row.age, "32歳");
        assert_eq!(row.skin_type, "乾燥肌");
        assert_eq!(row.gender, "");
        assert_eq!(row.comment, "しっとりします");
    }

    #[test]
    fn test_build_review_rows_missing_fields_are_blank() {
        let rows = build_review_rows(&sample_records());
        let row = &rows[1];
        assert_eq!(row.index, 2);
        assert_eq!(row.score, "");
        assert_eq!(row.age, "");
        assert_eq!(row.comment, "普通でした");
    }

    #[test]
    fn test_build_review_rows_empty() {
        assert!(build_review_rows(&[]).is_empty());
    }

    #[test]
    fn test_build_site_rows() {
        let rows = build_site_rows(&[SiteAdapter::cosme(), SiteAdapter::qoo10()]);
        assert_eq!(rows[0].name, "cosme");
        assert_eq!(rows[0].encoding, "shift_jis");
        assert_eq!(rows[0].max_pages, "1000");
        assert_eq!(rows[0].columns, "score, age, skin_type, comment");
        assert!(rows[0].selectors.contains("p.read"));

        assert_eq!(rows[1].encoding, "utf-8-sig");
        assert_eq!(rows[1].max_pages, "-");
        assert_eq!(rows[1].columns, "comment");
    }

    // -- Rendering tests --

    #[test]
    fn test_review_table_headers() {
        let rendered = Table::new(build_review_rows(&sample_records())).to_string();
        assert!(rendered.contains("Skin Type"));
        assert!(rendered.contains("しっとりします"));
    }

    #[test]
    fn test_review_markdown_style() {
        let mut table = Table::new(build_review_rows(&sample_records()));
        table.with(Style::markdown());
        let rendered = table.to_string();
        assert!(rendered.starts_with("| #"));
        assert!(rendered.contains("|---"));
    }

    #[test]
    fn test_review_json_keys() {
        let value = serde_json::to_value(build_review_rows(&sample_records())).unwrap();
        assert_eq!(value[0]["Score"], "4");
        assert_eq!(value[1]["Comment"], "普通でした");
    }

    #[test]
    fn test_hashed_table_render() {
        let table = HashedTable {
            headers: vec!["email".into(), "name".into()],
            rows: vec![vec!["aa".into(), String::new()]],
        };
        let rendered = build_hashed_table(&table).to_string();
        assert!(rendered.contains("email"));
        assert!(rendered.contains("aa"));

        let json = hashed_to_json(&table);
        assert_eq!(json[0]["email"], "aa");
        assert_eq!(json[0]["name"], "");
    }
}
