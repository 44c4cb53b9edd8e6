use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAttribution {
    pub feature: String,
    pub score: f64,
}

/// Ranked attributions; serializes as a `{feature: score}` map in rank order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopAttributions(Vec<FeatureAttribution>);

impl TopAttributions {
    pub fn new(ranked: Vec<FeatureAttribution>) -> Self {
        Self(ranked)
    }

    pub fn as_slice(&self) -> &[FeatureAttribution] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn features(&self) -> Vec<&str> {
        self.0.iter().map(|a| a.feature.as_str()).collect()
    }

    pub fn score(&self, feature: &str) -> Option<f64> {
        self.0.iter().find(|a| a.feature == feature).map(|a| a.score)
    }
}

impl Serialize for TopAttributions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for a in &self.0 {
            map.serialize_entry(&a.feature, &a.score)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub attributions: TopAttributions,
    pub narrative: String,
    /// Model baseline for the predicted class (`None` when unavailable)
    pub expected_value: Option<f64>,
}

impl Explanation {
    pub fn unavailable() -> Self {
        Self {
            attributions: TopAttributions::default(),
            narrative: super::engine::UNAVAILABLE_NARRATIVE.to_string(),
            expected_value: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.expected_value.is_some()
    }
}
