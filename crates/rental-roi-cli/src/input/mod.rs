pub mod file;
pub mod stdin;

use rental_roi_core::table::RegionTable;
use rental_roi_core::AssumptionSet;

/// Assumptions from `--assumptions`, else piped stdin, else the defaults.
pub fn load_assumptions(path: Option<&str>) -> Result<AssumptionSet, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json(path);
    }
    match stdin::read_stdin()? {
        Some(data) => Ok(serde_json::from_value(data)?),
        None => Ok(AssumptionSet::default()),
    }
}

/// Load a wide region-by-month CSV.
pub fn load_table(path: &str) -> Result<RegionTable, Box<dyn std::error::Error>> {
    let canonical = file::resolve_path(path)?;
    Ok(RegionTable::from_path(canonical)?)
}
