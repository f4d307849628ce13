//! Region-by-month wide tables.
//!
//! Both inputs (home values and rents) arrive in the same shape: one row per
//! region, one column per month, plus assorted descriptive columns we ignore.
//! `RegionTable` keeps only the region key and the month columns.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RentalRoiError;
use crate::types::Period;
use crate::RentalRoiResult;

/// Width of a normalized region key (US ZIP).
pub const REGION_ID_WIDTH: usize = 5;

/// Header of the region key column in the source files.
pub const REGION_COLUMN: &str = "RegionName";

/// Normalize a raw region key to a fixed-width zero-padded string.
///
/// Keys exported from spreadsheets sometimes carry a float suffix ("802.0");
/// that suffix is dropped before padding.
pub fn normalize_region_id(raw: &str) -> String {
    let trimmed = raw.trim();
    let key = match trimmed.split_once('.') {
        Some((int_part, frac)) if frac.chars().all(|c| c == '0') => int_part,
        _ => trimmed,
    };
    format!("{key:0>width$}", width = REGION_ID_WIDTH)
}

/// One region's monthly values, aligned with the owning table's periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSeries {
    pub region_id: String,
    pub values: Vec<Option<Decimal>>,
}

impl RegionSeries {
    pub fn new(raw_region: &str, values: Vec<Option<Decimal>>) -> Self {
        Self {
            region_id: normalize_region_id(raw_region),
            values,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionTable {
    periods: Vec<Period>,
    rows: Vec<RegionSeries>,
}

impl RegionTable {
    /// Build a table from already-parsed columns. Every row must carry one
    /// value slot per period.
    pub fn new(periods: Vec<Period>, rows: Vec<RegionSeries>) -> RentalRoiResult<Self> {
        if let Some(bad) = rows.iter().find(|r| r.values.len() != periods.len()) {
            return Err(RentalRoiError::InvalidInput {
                field: "values".into(),
                reason: format!(
                    "Region {} has {} values for {} periods",
                    bad.region_id,
                    bad.values.len(),
                    periods.len()
                ),
            });
        }
        Ok(Self { periods, rows })
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn rows(&self) -> &[RegionSeries] {
        &self.rows
    }

    /// Column index of a period, if the table covers it.
    pub fn column(&self, period: Period) -> Option<usize> {
        self.periods.iter().position(|p| *p == period)
    }

    pub fn find_region(&self, region_id: &str) -> Option<&RegionSeries> {
        let key = normalize_region_id(region_id);
        self.rows.iter().find(|r| r.region_id == key)
    }

    /// Parse a wide CSV. Month columns are headers of the form `YYYY-MM-DD`;
    /// blank or non-numeric cells become `None`.
    #[cfg(feature = "ingest")]
    pub fn from_reader<R: std::io::Read>(reader: R) -> RentalRoiResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();

        let region_idx = headers
            .iter()
            .position(|h| h == REGION_COLUMN)
            .ok_or_else(|| {
                RentalRoiError::MissingData(format!("Table has no '{REGION_COLUMN}' column"))
            })?;

        let month_columns: Vec<(usize, Period)> = headers
            .iter()
            .enumerate()
            .filter_map(|(idx, h)| parse_period(h).map(|p| (idx, p)))
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let Some(raw_region) = record.get(region_idx).filter(|s| !s.is_empty()) else {
                continue;
            };
            let values = month_columns
                .iter()
                .map(|(idx, _)| record.get(*idx).and_then(parse_value))
                .collect();
            rows.push(RegionSeries::new(raw_region, values));
        }

        tracing::debug!(
            regions = rows.len(),
            months = month_columns.len(),
            "parsed region table"
        );

        Ok(Self {
            periods: month_columns.into_iter().map(|(_, p)| p).collect(),
            rows,
        })
    }

    #[cfg(feature = "ingest")]
    pub fn from_path(path: impl AsRef<std::path::Path>) -> RentalRoiResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            RentalRoiError::MissingData(format!("Failed to open '{}': {e}", path.display()))
        })?;
        Self::from_reader(file)
    }
}

fn parse_period(header: &str) -> Option<Period> {
    if header.matches('-').count() != 2 {
        return None;
    }
    Period::parse_from_str(header, "%Y-%m-%d").ok()
}

fn parse_value(cell: &str) -> Option<Decimal> {
    if cell.is_empty() {
        return None;
    }
    cell.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(cell))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_pads_short_keys() {
        assert_eq!(normalize_region_id("802"), "00802");
        assert_eq!(normalize_region_id(" 80903 "), "80903");
        assert_eq!(normalize_region_id("1001.0"), "01001");
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let periods = vec![Period::from_ymd_opt(2025, 5, 31).unwrap()];
        let rows = vec![RegionSeries::new("80903", vec![Some(dec!(1)), None])];
        assert!(RegionTable::new(periods, rows).is_err());
    }

    #[cfg(feature = "ingest")]
    #[test]
    fn test_from_reader_keeps_only_month_columns() {
        let csv = "RegionID,SizeRank,RegionName,State,2025-04-30,2025-05-31\n\
                   1,0,80903,CO,410000.5,412000\n\
                   2,1,802,CO,,abc\n";
        let table = RegionTable::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(table.periods().len(), 2);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0].values, vec![Some(dec!(410000.5)), Some(dec!(412000))]);
        assert_eq!(table.rows()[1].region_id, "00802");
        assert_eq!(table.rows()[1].values, vec![None, None]);
    }

    #[cfg(feature = "ingest")]
    #[test]
    fn test_from_reader_requires_region_column() {
        let csv = "Zip,2025-05-31\n80903,1\n";
        let err = RegionTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, RentalRoiError::MissingData(_)));
    }

    #[cfg(feature = "ingest")]
    #[test]
    fn test_from_path_missing_file() {
        let err = RegionTable::from_path("/nonexistent/zillow_home_values.csv").unwrap_err();
        assert!(matches!(err, RentalRoiError::MissingData(_)));
    }
}
