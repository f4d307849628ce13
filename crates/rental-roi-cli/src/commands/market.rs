use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use rental_roi_core::analysis;
use rental_roi_core::labels::RegionLabels;
use rental_roi_core::screening::{self, MetricField, ScreenCriteria};

use crate::input;

/// Arguments for the market-wide analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Home value CSV (RegionName plus YYYY-MM-DD month columns)
    #[arg(long)]
    pub home: String,

    /// Rent CSV in the same layout
    #[arg(long)]
    pub rent: String,

    /// JSON file of assumption overrides (stdin is read when omitted)
    #[arg(long)]
    pub assumptions: Option<String>,

    /// Region labels: "colorado-springs", "all", or a JSON file of ZIP -> name
    #[arg(long, default_value = "colorado-springs")]
    pub labels: String,

    /// Field to sort the result table by
    #[arg(long, value_enum, default_value = "basic-coc")]
    pub sort_by: SortKey,

    /// Sort ascending instead of descending
    #[arg(long)]
    pub ascending: bool,

    /// Lowest home price to include
    #[arg(long)]
    pub min_price: Option<Decimal>,

    /// Highest home price to include
    #[arg(long)]
    pub max_price: Option<Decimal>,

    /// Keep only the first N rows after sorting
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKey {
    BasicCoc,
    FirstYearRoi,
    TotalRoc,
    TotalReturn,
    HomePrice,
    Rent,
    MonthlyCashFlow,
}

impl From<SortKey> for MetricField {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::BasicCoc => MetricField::BasicCoc,
            SortKey::FirstYearRoi => MetricField::FirstYearRoi,
            SortKey::TotalRoc => MetricField::TotalRoc,
            SortKey::TotalReturn => MetricField::TotalReturn,
            SortKey::HomePrice => MetricField::HomePrice,
            SortKey::Rent => MetricField::Rent,
            SortKey::MonthlyCashFlow => MetricField::MonthlyCashFlow,
        }
    }
}

/// `None` means every region in the tables.
pub fn resolve_labels(choice: &str) -> Result<Option<RegionLabels>, Box<dyn std::error::Error>> {
    match choice {
        "colorado-springs" => Ok(Some(RegionLabels::colorado_springs())),
        "all" => Ok(None),
        path => Ok(Some(input::file::read_json(path)?)),
    }
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let assumptions = input::load_assumptions(args.assumptions.as_deref())?;
    let labels = resolve_labels(&args.labels)?;
    let home = input::load_table(&args.home)?;
    let rent = input::load_table(&args.rent)?;

    let mut output = analysis::analyze_market(&home, &rent, &assumptions, labels.as_ref())?;

    let criteria = ScreenCriteria {
        min_price: args.min_price,
        max_price: args.max_price,
        sort_by: args.sort_by.into(),
        ascending: args.ascending,
    };
    let mut rows = screening::screen(&output.result.metrics, &criteria);
    if let Some(n) = args.top {
        rows.truncate(n);
    }
    tracing::debug!(shown = rows.len(), total = output.result.metrics.len(), "screened regions");
    output.result.metrics = rows;

    Ok(serde_json::to_value(output)?)
}
