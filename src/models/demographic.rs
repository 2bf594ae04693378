use serde::{Deserialize, Serialize};

/// Reader demographics used by the demographic strategy
///
/// Bounds are stored exactly as entered. Callers read them through
/// [`DemographicFilter::age_range`], which orders them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DemographicFilter {
    pub min_age: u32,
    pub max_age: u32,
    #[serde(default)]
    pub country: String,
}

impl DemographicFilter {
    pub fn new(min_age: u32, max_age: u32, country: impl Into<String>) -> Self {
        Self {
            min_age,
            max_age,
            country: country.into(),
        }
    }

    /// `[low, high]` regardless of the order the bounds were entered in
    pub fn age_range(&self) -> [u32; 2] {
        [
            self.min_age.min(self.max_age),
            self.min_age.max(self.max_age),
        ]
    }

    /// Trimmed country; empty means no country filter
    pub fn country(&self) -> &str {
        self.country.trim()
    }
}

impl Default for DemographicFilter {
    fn default() -> Self {
        Self::new(18, 35, "")
    }
}
