//! Export rows for the result set, in CSV and JSON.

use std::io::Write;

use rewards_core::{ResultSet, RewardResult, RewardsError, RewardsResult, TierPointsRow};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CSV_HEADER: [&str; 8] = [
    "Item Name",
    "Retail Price",
    "Tier Points",
    "Payback %",
    "Point Cost",
    "Customer Spend Required",
    "Profit From Spend",
    "Profit Impact %",
];

/// One exported line. Money is rounded to cents, profit impact to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub name: String,
    pub retail_price: f64,
    pub tier_points: u64,
    pub payback_percent: f64,
    pub point_cost: u64,
    pub customer_spend_required: f64,
    pub profit_from_spend: f64,
    pub profit_impact: Option<f64>,
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl ExportRow {
    pub fn from_result(r: &RewardResult) -> Self {
        Self {
            name: r.name.clone(),
            retail_price: round_to(r.retail_price, 2),
            tier_points: r.tier_suggested_cost,
            payback_percent: r.tier_payback,
            point_cost: r.point_cost,
            customer_spend_required: round_to(r.customer_spend_required, 2),
            profit_from_spend: round_to(r.profit_from_spend, 2),
            profit_impact: r.profit_impact.map(|p| round_to(p, 1)),
        }
    }

    pub fn from_tier_points(r: &TierPointsRow) -> Self {
        Self {
            name: r.name.clone(),
            retail_price: round_to(r.retail_price, 2),
            tier_points: r.tier_point_cost,
            payback_percent: r.tier_payback,
            point_cost: r.tier_point_cost,
            customer_spend_required: round_to(r.customer_spend, 2),
            profit_from_spend: round_to(r.profit_from_spend, 2),
            profit_impact: r.profit_impact.map(|p| round_to(p, 1)),
        }
    }

    fn to_record(&self) -> [String; 8] {
        [
            self.name.clone(),
            format!("{:.2}", self.retail_price),
            self.tier_points.to_string(),
            self.payback_percent.to_string(),
            self.point_cost.to_string(),
            format!("{:.2}", self.customer_spend_required),
            format!("{:.2}", self.profit_from_spend),
            self.profit_impact
                .map(|p| format!("{:.1}", p))
                .unwrap_or_default(),
        ]
    }
}

pub fn result_rows(set: &ResultSet) -> Vec<ExportRow> {
    set.results.iter().map(ExportRow::from_result).collect()
}

pub fn tier_point_rows(rows: &[TierPointsRow]) -> Vec<ExportRow> {
    rows.iter().map(ExportRow::from_tier_points).collect()
}

/// Write rows as CSV with a header line. Quoting is left to the writer.
pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> RewardsResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER).map_err(csv_error)?;
    for row in rows {
        wtr.write_record(row.to_record()).map_err(csv_error)?;
    }
    wtr.flush()?;
    debug!(rows = rows.len(), "CSV export written");
    Ok(())
}

pub fn to_csv_string(rows: &[ExportRow]) -> RewardsResult<String> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    String::from_utf8(buf).map_err(|e| RewardsError::Internal(e.into()))
}

pub fn to_json(rows: &[ExportRow]) -> RewardsResult<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

fn csv_error(err: csv::Error) -> RewardsError {
    RewardsError::Io(err.into())
}
