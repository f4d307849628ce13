//! Aligning the home-value and rent tables onto one month.
//!
//! Rows with a missing, non-numeric or non-positive price or rent are dropped
//! here and never reach the metrics engine. The drop count travels with the
//! result so callers can surface it: a high count usually means one of the
//! source files has thin coverage for the chosen month.

use std::collections::HashMap;

use chrono::Months;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RentalRoiError;
use crate::labels::RegionLabels;
use crate::table::{normalize_region_id, RegionTable};
use crate::types::{Money, Period, RegionObservation};
use crate::RentalRoiResult;

/// Output of [`merge_current`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedRegions {
    pub observations: Vec<RegionObservation>,
    /// Latest month present in both tables
    pub period: Period,
    /// Joined regions discarded for missing or non-positive values
    pub rows_dropped: usize,
}

/// One (price, rent) pair used to fit the national rent model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPoint {
    pub region_id: String,
    pub home_price: Money,
    pub rent: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentPoint {
    pub period: Period,
    pub rent: Money,
}

/// A single region's rent series with its recent summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentHistory {
    pub region_id: String,
    /// Chronological, missing months removed
    pub series: Vec<RentPoint>,
    pub latest_period: Period,
    pub latest_rent: Money,
    /// Mean rent over the latest month and the eleven before it
    pub trailing_12m_average: Money,
}

/// Latest month covered by both tables.
pub fn latest_common_period(home: &RegionTable, rent: &RegionTable) -> RentalRoiResult<Period> {
    home.periods()
        .iter()
        .filter(|p| rent.periods().contains(p))
        .max()
        .copied()
        .ok_or(RentalRoiError::NoCommonPeriod {
            home_periods: home.periods().len(),
            rent_periods: rent.periods().len(),
        })
}

/// Join home values and rents on region for the latest common month.
///
/// With `labels`, only labelled regions are joined and each observation is
/// labelled `"<zip> - <name>"`; without, every region joins and is labelled by
/// its id. Output order follows the home-value table.
pub fn merge_current(
    home: &RegionTable,
    rent: &RegionTable,
    labels: Option<&RegionLabels>,
) -> RentalRoiResult<MergedRegions> {
    let period = latest_common_period(home, rent)?;
    let pairs = join_on_period(home, rent, period)?;

    let mut observations = Vec::new();
    let mut rows_dropped = 0usize;

    for (region_id, price, rent_value) in pairs {
        let label = match labels {
            Some(map) => match map.label(region_id) {
                Some(l) => l,
                None => continue,
            },
            None => region_id.to_string(),
        };

        match positive_pair(price, rent_value) {
            Some((home_price, rent)) => observations.push(RegionObservation {
                region_id: region_id.to_string(),
                label,
                home_price,
                rent,
                as_of: period,
            }),
            None => rows_dropped += 1,
        }
    }

    if rows_dropped > 0 {
        tracing::debug!(%period, rows_dropped, "dropped regions with missing or non-positive values");
    }
    tracing::info!(%period, regions = observations.len(), "merged current observations");

    Ok(MergedRegions {
        observations,
        period,
        rows_dropped,
    })
}

/// Every region in both tables with a positive price and rent for `period`.
pub fn national_training_set(
    home: &RegionTable,
    rent: &RegionTable,
    period: Period,
) -> RentalRoiResult<Vec<TrainingPoint>> {
    let points: Vec<TrainingPoint> = join_on_period(home, rent, period)?
        .into_iter()
        .filter_map(|(region_id, price, rent_value)| {
            positive_pair(price, rent_value).map(|(home_price, rent)| TrainingPoint {
                region_id: region_id.to_string(),
                home_price,
                rent,
            })
        })
        .collect();

    tracing::debug!(%period, samples = points.len(), "built national training set");
    Ok(points)
}

/// Rent series and trailing 12-month average for one region.
pub fn rent_history(rent: &RegionTable, region_id: &str) -> RentalRoiResult<RentHistory> {
    let key = normalize_region_id(region_id);
    let row = rent.find_region(&key).ok_or_else(|| {
        RentalRoiError::InsufficientData(format!("Region {key} is not in the rent table"))
    })?;

    let mut series: Vec<RentPoint> = rent
        .periods()
        .iter()
        .zip(&row.values)
        .filter_map(|(period, value)| value.map(|rent| RentPoint { period: *period, rent }))
        .collect();
    series.sort_by_key(|p| p.period);

    let latest = series.last().cloned().ok_or_else(|| {
        RentalRoiError::InsufficientData(format!("Region {key} has no rent observations"))
    })?;

    let window_start = latest
        .period
        .checked_sub_months(Months::new(11))
        .unwrap_or(Period::MIN);
    let window: Vec<Money> = series
        .iter()
        .filter(|p| p.period >= window_start)
        .map(|p| p.rent)
        .collect();
    let trailing_12m_average =
        window.iter().copied().sum::<Decimal>() / Decimal::from(window.len() as u64);

    Ok(RentHistory {
        region_id: key,
        series,
        latest_period: latest.period,
        latest_rent: latest.rent,
        trailing_12m_average,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type JoinedRow<'a> = (&'a str, Option<Decimal>, Option<Decimal>);

/// Inner join on region id for one month, in home-table order. The first
/// occurrence of a duplicated rent key wins.
fn join_on_period<'a>(
    home: &'a RegionTable,
    rent: &'a RegionTable,
    period: Period,
) -> RentalRoiResult<Vec<JoinedRow<'a>>> {
    let missing = || RentalRoiError::NoCommonPeriod {
        home_periods: home.periods().len(),
        rent_periods: rent.periods().len(),
    };
    let home_col = home.column(period).ok_or_else(missing)?;
    let rent_col = rent.column(period).ok_or_else(missing)?;

    let mut rents: HashMap<&str, Option<Decimal>> = HashMap::with_capacity(rent.rows().len());
    for row in rent.rows() {
        rents
            .entry(row.region_id.as_str())
            .or_insert(row.values[rent_col]);
    }

    Ok(home
        .rows()
        .iter()
        .filter_map(|row| {
            rents
                .get(row.region_id.as_str())
                .map(|r| (row.region_id.as_str(), row.values[home_col], *r))
        })
        .collect())
}

fn positive_pair(price: Option<Decimal>, rent: Option<Decimal>) -> Option<(Money, Money)> {
    match (price, rent) {
        (Some(p), Some(r)) if p > Decimal::ZERO && r > Decimal::ZERO => Some((p, r)),
        _ => None,
    }
}
