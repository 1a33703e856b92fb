//! CSV catalog loader.
//!
//! Accepts any CSV with a header row. The name and price columns are picked
//! from header keywords, falling back to the first numeric column for price.
//! Rows without a name or a parsable price are skipped.

use std::io::Read;

use csv::StringRecord;
use rewards_core::{RewardsError, RewardsResult};
use tracing::{debug, info};

use crate::catalog::Catalog;

const PRICE_KEYWORDS: &[&str] = &["retail", "price", "msrp", "cost", "value", "amount"];
const NAME_KEYWORDS: &[&str] = &["name", "product", "item", "title", "description"];

/// Parse a price cell such as `"$1,299.00"`. Returns `None` for anything
/// that is not a finite number.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Load a catalog from CSV text.
pub fn load_catalog<R: Read>(reader: R) -> RewardsResult<Catalog> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| RewardsError::Catalog(format!("Failed to read header row: {}", e)))?
        .clone();

    let mut records = Vec::new();
    for (line_num, result) in csv_reader.records().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(e) => debug!(line = line_num + 2, error = %e, "Skipping unreadable catalog row"),
        }
    }

    let (name_col, price_col) = detect_columns(&headers, &records)?;
    debug!(
        name_column = %headers.get(name_col).unwrap_or_default(),
        price_column = %headers.get(price_col).unwrap_or_default(),
        "Catalog columns detected"
    );

    let total = records.len();
    let entries: Vec<(String, f64)> = records
        .iter()
        .filter_map(|record| {
            let name = record.get(name_col)?.trim();
            if name.is_empty() {
                return None;
            }
            let price = parse_price(record.get(price_col)?)?;
            Some((name.to_string(), price))
        })
        .collect();

    let skipped = total - entries.len();
    if skipped > 0 {
        metrics::counter!("rewards.catalog_rows_dropped").increment(skipped as u64);
    }

    let catalog = Catalog::from_entries(entries);
    info!(rows = total, items = catalog.len(), skipped, "Catalog loaded");
    Ok(catalog)
}

/// Pick `(name, price)` column indices.
fn detect_columns(headers: &StringRecord, records: &[StringRecord]) -> RewardsResult<(usize, usize)> {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();

    let price_col = find_by_keywords(&lowered, PRICE_KEYWORDS, None)
        .or_else(|| first_numeric_column(lowered.len(), records));
    let Some(price_col) = price_col else {
        return Err(RewardsError::Catalog("No price column found".into()));
    };

    let name_col = find_by_keywords(&lowered, NAME_KEYWORDS, Some(price_col))
        .or_else(|| (0..lowered.len()).find(|i| *i != price_col));
    let Some(name_col) = name_col else {
        return Err(RewardsError::Catalog("No name column found".into()));
    };

    Ok((name_col, price_col))
}

/// Keywords are tried in priority order, so "Retail Price" beats "Unit Cost".
fn find_by_keywords(headers: &[String], keywords: &[&str], skip: Option<usize>) -> Option<usize> {
    keywords.iter().find_map(|kw| {
        headers
            .iter()
            .enumerate()
            .find(|(i, h)| Some(*i) != skip && h.contains(kw))
            .map(|(i, _)| i)
    })
}

fn first_numeric_column(width: usize, records: &[StringRecord]) -> Option<usize> {
    (0..width).find(|&col| {
        records
            .iter()
            .filter_map(|r| r.get(col))
            .find(|cell| !cell.is_empty())
            .and_then(parse_price)
            .is_some()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_variants() {
        assert_eq!(parse_price("3.50"), Some(3.5));
        assert_eq!(parse_price(" $1,299.00 "), Some(1299.0));
        assert_eq!(parse_price("abc"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("inf"), None);
    }

    #[test]
    fn test_load_with_named_columns() {
        let data = "SKU,Product Name,Retail Price\nA1,Mug,8.00\nA2,Tote,$15.00\n";
        let catalog = load_catalog(data.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.items()[0].name, "Mug");
        assert_eq!(catalog.items()[1].retail_price, 15.0);
    }

    #[test]
    fn test_malformed_rows_dropped() {
        let data = "name,price\nMug,8\nBroken,n/a\n,4\nHoodie,45\n";
        let catalog = load_catalog(data.as_bytes()).unwrap();
        let names: Vec<&str> = catalog.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Mug", "Hoodie"]);
    }

    #[test]
    fn test_numeric_fallback_column() {
        let data = "label,qty\nMug,8\nTote,15\n";
        let catalog = load_catalog(data.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.items()[0].name, "Mug");
        assert_eq!(catalog.items()[0].retail_price, 8.0);
    }

    #[test]
    fn test_retail_preferred_over_cost() {
        let data = "item,unit cost,retail\nMug,3,8\n";
        let catalog = load_catalog(data.as_bytes()).unwrap();
        assert_eq!(catalog.items()[0].retail_price, 8.0);
    }

    #[test]
    fn test_no_price_column_is_error() {
        let data = "name,color\nMug,red\n";
        let err = load_catalog(data.as_bytes()).unwrap_err();
        assert!(matches!(err, RewardsError::Catalog(_)));
    }

    #[test]
    fn test_quoted_names_with_commas() {
        let data = "name,price\n\"Mug, large\",9.5\n";
        let catalog = load_catalog(data.as_bytes()).unwrap();
        assert_eq!(catalog.items()[0].name, "Mug, large");
    }
}
