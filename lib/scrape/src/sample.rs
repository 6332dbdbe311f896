use crate::labels::Labels;

/// A single scraped value.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub labels: Labels,
    /// Milliseconds since the unix epoch.
    pub timestamp: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(labels: Labels, timestamp: i64, value: f64) -> Self {
        Self {
            labels,
            timestamp,
            value,
        }
    }
}

/// Destination of scraped samples. Engines call `append` once per scrape
/// with everything the scrape produced.
pub trait Appendable: Send + Sync {
    fn append(&self, samples: &[Sample]);
}
