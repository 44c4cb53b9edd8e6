//! Explainer - TreeSHAP attribution for the predicted class
//!
//! Keeps only features pushing toward the prediction (positive scores),
//! ranks them, and renders the operator narrative together with the
//! ledger's frequency table. Failures degrade to an "unavailable"
//! explanation; they never abort classification.

use super::tree_shap::{ensemble_expected_value, ensemble_shap};
use super::types::{Explanation, FeatureAttribution, TopAttributions};
use crate::logic::error::ExplanationError;
use crate::logic::features::{FEATURE_COUNT, FEATURE_LAYOUT};
use crate::logic::ledger::LedgerSnapshot;
use crate::logic::model::TreeEnsemble;

pub const UNAVAILABLE_NARRATIVE: &str = "Feature importance analysis unavailable";

#[derive(Debug, Clone)]
pub struct Explainer {
    enabled: bool,
    top_k: usize,
}

impl Explainer {
    pub fn new(enabled: bool, top_k: usize) -> Self {
        Self { enabled, top_k }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Full SHAP vector (layout order) for `label` on a transformed instance
    pub fn attribute(
        &self,
        model: &dyn TreeEnsemble,
        scaled: &[f64],
        label: &str,
    ) -> Result<(Vec<f64>, f64), ExplanationError> {
        if scaled.len() != FEATURE_COUNT {
            return Err(ExplanationError::FeatureCountMismatch {
                expected: FEATURE_COUNT,
                actual: scaled.len(),
            });
        }
        let class = model
            .class_index(label)
            .ok_or_else(|| ExplanationError::UnknownClass(label.to_string()))?;

        let trees = model.trees();
        let phi = ensemble_shap(trees, scaled, class)?;
        if let Some(i) = phi.iter().position(|p| !p.is_finite()) {
            return Err(ExplanationError::NonFiniteAttribution(FEATURE_LAYOUT[i].to_string()));
        }

        let expected_value = ensemble_expected_value(trees, class)?;

        Ok((phi, expected_value))
    }

    /// Positive scores only, descending, at most `top_k` (ties keep layout order)
    pub fn top_positive(&self, phi: &[f64]) -> TopAttributions {
        let mut positive: Vec<FeatureAttribution> = FEATURE_LAYOUT
            .iter()
            .zip(phi)
            .filter(|(_, score)| **score > 0.0)
            .map(|(name, &score)| FeatureAttribution {
                feature: name.to_string(),
                score,
            })
            .collect();

        positive.sort_by(|a, b| b.score.total_cmp(&a.score));
        positive.truncate(self.top_k);
        TopAttributions::new(positive)
    }

    /// Explain the predicted `label`; `ledger` is the frequency table to print
    pub fn explain(
        &self,
        model: &dyn TreeEnsemble,
        scaled: &[f64],
        label: &str,
        ledger: &LedgerSnapshot,
    ) -> Explanation {
        if !self.enabled {
            log::debug!("Explainer disabled, skipping attribution");
            return Explanation::unavailable();
        }

        match self.attribute(model, scaled, label) {
            Ok((phi, expected_value)) => {
                log::debug!(
                    "SHAP for {}: baseline={:.4} sum={:.4}",
                    label,
                    expected_value,
                    phi.iter().sum::<f64>()
                );
                let attributions = self.top_positive(&phi);
                let narrative = self.narrative(&attributions, ledger);
                Explanation {
                    attributions,
                    narrative,
                    expected_value: Some(expected_value),
                }
            }
            Err(e) => {
                log::warn!("Attribution failed: {}", e);
                Explanation::unavailable()
            }
        }
    }

    fn narrative(&self, attributions: &TopAttributions, ledger: &LedgerSnapshot) -> String {
        let scores: Vec<String> = attributions
            .as_slice()
            .iter()
            .map(|a| format!("{}: {:.3}", a.feature, a.score))
            .collect();

        format!(
            "Top {} Positive SHAP values for the instance:\n{}\n\nFeature Frequency by Attack Type:\n{}",
            self.top_k,
            scores.join("\n"),
            ledger.frequency_report()
        )
    }
}

impl Default for Explainer {
    fn default() -> Self {
        Self::new(true, crate::constants::TOP_ATTRIBUTIONS)
    }
}
