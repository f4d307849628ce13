use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::table::normalize_region_id;

/// Neighborhood names for the ZIPs of a local market.
///
/// When a label map is supplied to the merge step, it also acts as the local
/// market filter: regions without a name are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct RegionLabels {
    names: BTreeMap<String, String>,
}

impl From<BTreeMap<String, String>> for RegionLabels {
    fn from(names: BTreeMap<String, String>) -> Self {
        Self::new(names)
    }
}

impl From<RegionLabels> for BTreeMap<String, String> {
    fn from(labels: RegionLabels) -> Self {
        labels.names
    }
}

impl RegionLabels {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            names: entries
                .into_iter()
                .map(|(k, v)| (normalize_region_id(k.as_ref()), v.into()))
                .collect(),
        }
    }

    /// Colorado Springs metro ZIPs.
    pub fn colorado_springs() -> Self {
        Self::new([
            ("80902", "Fort Carson"),
            ("80903", "Downtown"),
            ("80904", "Old Colorado City"),
            ("80905", "Southwest"),
            ("80906", "Broadmoor"),
            ("80907", "North Central"),
            ("80908", "Black Forest"),
            ("80909", "East Central"),
            ("80910", "Southeast"),
            ("80911", "Security-Widefield"),
            ("80915", "Cimarron Hills"),
            ("80916", "South Central"),
            ("80917", "Village Seven"),
            ("80918", "Austin Bluffs"),
            ("80919", "Rockrimmon"),
            ("80920", "Briargate"),
            ("80921", "Northgate"),
            ("80922", "Stetson Hills"),
            ("80923", "Ridgeview"),
            ("80924", "Cordera"),
            ("80925", "Schriever Area"),
            ("80926", "Cheyenne Mountain"),
            ("80927", "Banning Lewis"),
            ("80928", "SE Rural"),
            ("80929", "Ellicott"),
            ("80930", "East Rural"),
            ("80938", "East Springs"),
            ("80939", "BL North"),
            ("80829", "Manitou"),
            ("80817", "Fountain"),
        ])
    }

    pub fn name(&self, region_id: &str) -> Option<&str> {
        self.names.get(region_id).map(String::as_str)
    }

    /// "80903 - Downtown", or `None` for an unlabelled region.
    pub fn label(&self, region_id: &str) -> Option<String> {
        self.name(region_id).map(|n| format!("{region_id} - {n}"))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
