//! Pipeline Orchestrator
//!
//! Sampler → Adapter → Classifier → Explainer → Ledger → Recommendation,
//! synchronously, into one `TrafficReport`. Sampling and inference errors
//! abort the run; explanation degrades.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::logic::config::EngineConfig;
use crate::logic::error::{InferenceError, PipelineError};
use crate::logic::explain::{Explainer, TopAttributions};
use crate::logic::features::{adapt, display_values, FlowRecord, TrafficStats};
use crate::logic::ledger::{AttributionLedger, LedgerSnapshot};
use crate::logic::model::{ClassifierGateway, EngineStatus};
use crate::logic::sampler::{FlowDataset, TrafficSampler};
use crate::logic::threat::recommend;

// ============================================================================
// REPORT
// ============================================================================

/// One classified, explained and advised observation
#[derive(Debug, Clone, Serialize)]
pub struct TrafficReport {
    #[serde(skip)]
    pub run_id: Uuid,
    #[serde(rename = "SourceIP")]
    pub source_ip: String,
    #[serde(rename = "DestinationIP")]
    pub destination_ip: String,
    #[serde(rename = "SourcePort")]
    pub source_port: i64,
    #[serde(rename = "Protocol")]
    pub protocol: String,
    pub traffic_stats: TrafficStats,
    pub prediction: String,
    pub recommendation: String,
    pub interpretation: String,
    pub feature_importance: TopAttributions,
    /// max(class probability) as a percentage
    pub confidence_score: f64,
    pub attack_feature_stats: LedgerSnapshot,
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct Pipeline {
    sampler: TrafficSampler,
    gateway: ClassifierGateway,
    explainer: Explainer,
    ledger: Arc<AttributionLedger>,
}

impl Pipeline {
    pub fn new(
        sampler: TrafficSampler,
        gateway: ClassifierGateway,
        explainer: Explainer,
        ledger: Arc<AttributionLedger>,
    ) -> Self {
        Self { sampler, gateway, explainer, ledger }
    }

    /// Startup: load dataset and model artifact (both fatal on failure)
    pub fn load(config: &EngineConfig) -> Result<Self, PipelineError> {
        let dataset = FlowDataset::load(&config.dataset_path)?;
        let gateway = ClassifierGateway::load(&config.model_path, config.model_sha256.as_deref())?;

        log::info!(
            "Pipeline ready: p_attack={} cooldown={}s explain={}",
            config.sampler.attack_probability,
            config.sampler.cooldown_secs,
            config.explain_enabled
        );

        Ok(Self::new(
            TrafficSampler::new(dataset, config.sampler.clone()),
            gateway,
            Explainer::new(config.explain_enabled, config.top_attributions),
            AttributionLedger::shared(),
        ))
    }

    /// Sample one observation and run it through every stage
    pub fn run(&self) -> Result<TrafficReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let record = self.sampler.sample()?;
        Ok(self.process(run_id, &record)?)
    }

    /// Run the stages after sampling on a given record
    pub fn process(&self, run_id: Uuid, record: &FlowRecord) -> Result<TrafficReport, InferenceError> {
        // 1. Model input + identity
        let (features, display) = adapt(record);
        let traffic_stats = display_values(&features);

        // 2. Classify (errors abort)
        let result = self.gateway.classify(&features)?;
        log::debug!(
            "[{}] {} -> {} ({:.1}%) in {}us",
            run_id,
            display.source_ip,
            result.label,
            result.confidence(),
            result.inference_time_us
        );

        // 3. Explain against the ledger as it was before this run
        let explanation = self.explainer.explain(
            self.gateway.model(),
            &result.scaled,
            &result.label,
            &self.ledger.snapshot(),
        );
        let top_features = explanation.attributions.features();

        // 4. Feed the ledger, then advise
        self.ledger.record(&result.label, &top_features);
        let recommendation = recommend(&result.label, &top_features);

        if result.label != "BENIGN" {
            log::info!(
                "[{}] {} flagged from {} (top: {:?})",
                run_id,
                result.label,
                display.source_ip,
                top_features
            );
        }

        Ok(TrafficReport {
            run_id,
            source_ip: display.source_ip,
            destination_ip: display.destination_ip,
            source_port: display.source_port,
            protocol: display.protocol,
            traffic_stats,
            confidence_score: result.confidence(),
            prediction: result.label,
            recommendation,
            interpretation: explanation.narrative,
            feature_importance: explanation.attributions,
            attack_feature_stats: self.ledger.snapshot(),
        })
    }

    pub fn ledger(&self) -> &Arc<AttributionLedger> {
        &self.ledger
    }

    pub fn ledger_snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    pub fn engine_status(&self) -> EngineStatus {
        self.gateway.status()
    }

    pub fn sampler(&self) -> &TrafficSampler {
        &self.sampler
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;
    use crate::constants::LABEL_COLUMN;
    use crate::logic::config::SamplerConfig;
    use crate::logic::error::SamplingError;
    use crate::logic::explain::UNAVAILABLE_NARRATIVE;
    use crate::logic::features::FieldValue;
    use crate::logic::model::artifact::fixtures;
    use crate::logic::model::{Classifier, DecisionTree, TreeEnsemble};
    use crate::logic::threat::ATTACK_CLOSING;

    fn flow(label: &str, syn: f64) -> FlowRecord {
        vec![
            (LABEL_COLUMN, FieldValue::Text(label.to_string())),
            ("Source IP", FieldValue::Text("192.168.1.20".to_string())),
            ("Destination IP", FieldValue::Text("10.0.0.5".to_string())),
            ("Source Port", FieldValue::Number(51234.0)),
            ("Protocol", FieldValue::Text("TCP".to_string())),
            ("SYN Flag Count", FieldValue::Number(syn)),
            ("Flow Duration", FieldValue::Number(syn)),
            ("Destination Port", FieldValue::Number(syn)),
        ]
        .into_iter()
        .collect()
    }

    /// Writes dataset (JSONL) + model artifact into a temp dir
    fn setup(labels: &[&str], attack_probability: f64, explain: bool) -> (TempDir, EngineConfig) {
        let dir = TempDir::new().unwrap();
        let dataset_path: PathBuf = dir.path().join("flows.jsonl");
        let model_path: PathBuf = dir.path().join("model.json");

        let lines: Vec<String> = labels
            .iter()
            .map(|l| {
                let syn = if *l == "BENIGN" { 0.0 } else { 1.0 };
                serde_json::to_string(&flow(l, syn)).unwrap()
            })
            .collect();
        fs::write(&dataset_path, lines.join("\n")).unwrap();
        fs::write(&model_path, serde_json::to_vec(&fixtures::artifact()).unwrap()).unwrap();

        let config = EngineConfig {
            dataset_path,
            model_path,
            model_sha256: None,
            sampler: SamplerConfig {
                attack_probability,
                cooldown_secs: 30,
                ..Default::default()
            },
            explain_enabled: explain,
            top_attributions: 5,
        };
        (dir, config)
    }

    #[test]
    fn test_benign_run_report_shape() {
        let (_dir, config) = setup(&["BENIGN", "DoS"], 0.0, true);
        let pipeline = Pipeline::load(&config).unwrap();

        let report = pipeline.run().unwrap();
        assert_eq!(report.prediction, "BENIGN");
        assert_eq!(report.source_ip, "192.168.1.20");
        assert_eq!(report.source_port, 51234);
        assert_eq!(report.traffic_stats.len(), 27);
        assert!(report.confidence_score > 50.0 && report.confidence_score <= 100.0);
        assert_eq!(pipeline.ledger_snapshot(), LedgerSnapshot::default());

        let json = serde_json::to_value(&report).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        for key in [
            "SourceIP",
            "DestinationIP",
            "SourcePort",
            "Protocol",
            "traffic_stats",
            "prediction",
            "recommendation",
            "interpretation",
            "feature_importance",
            "confidence_score",
            "attack_feature_stats",
        ] {
            assert!(keys.contains(&key), "missing {}", key);
        }
        assert_eq!(keys.len(), 11);
    }

    #[test]
    fn test_attack_run_updates_ledger_and_advice() {
        let (_dir, config) = setup(&["BENIGN"], 0.0, true);
        let pipeline = Pipeline::load(&config).unwrap();

        let first = pipeline.process(Uuid::new_v4(), &flow("DoS", 1.0)).unwrap();
        assert_eq!(first.prediction, "DoS");
        assert!(first.recommendation.starts_with("DoS attack detected."));
        assert!(first.recommendation.ends_with(ATTACK_CLOSING));
        assert_eq!(first.feature_importance.len(), 3);
        assert_eq!(first.attack_feature_stats.count("DoS", "SYN Flag Count"), 1);
        // Narrative frequency table predates this run's update
        assert!(!first.interpretation.contains("times"));

        let second = pipeline.process(Uuid::new_v4(), &flow("DoS", 1.0)).unwrap();
        assert!(second.interpretation.contains("  SYN Flag Count: 1 times"));
        assert_eq!(second.attack_feature_stats.count("DoS", "SYN Flag Count"), 2);

        let json = serde_json::to_value(&second).unwrap();
        assert_eq!(json["attack_feature_stats"]["DoS"]["SYN Flag Count"], 2);
        assert!(json["feature_importance"]["SYN Flag Count"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_explainer_disabled_still_classifies() {
        let (_dir, config) = setup(&["BENIGN"], 0.0, false);
        let pipeline = Pipeline::load(&config).unwrap();

        let report = pipeline.process(Uuid::new_v4(), &flow("DoS", 1.0)).unwrap();
        assert_eq!(report.prediction, "DoS");
        assert_eq!(report.interpretation, UNAVAILABLE_NARRATIVE);
        assert!(report.feature_importance.is_empty());
        assert_eq!(report.recommendation, "DoS attack detected. Monitor traffic and identify attack sources.");
        assert_eq!(report.attack_feature_stats, LedgerSnapshot::default());
    }

    #[test]
    fn test_sampling_error_aborts_run() {
        let (_dir, config) = setup(&["DoS"], 0.0, true);
        let pipeline = Pipeline::load(&config).unwrap();

        assert!(matches!(
            pipeline.run(),
            Err(PipelineError::Sampling(SamplingError::EmptyCategory(_)))
        ));
        assert_eq!(pipeline.engine_status().inference_count, 0);
    }

    /// Model whose probabilities are broken in a fixed way
    struct Broken(Vec<String>, Vec<f64>);

    impl Classifier for Broken {
        fn classes(&self) -> &[String] {
            &self.0
        }
        fn transform(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
            Ok(features.to_vec())
        }
        fn predict_proba(&self, _scaled: &[f64]) -> Result<Vec<f64>, InferenceError> {
            Ok(self.1.clone())
        }
    }

    impl TreeEnsemble for Broken {
        fn trees(&self) -> &[DecisionTree] {
            &[]
        }
    }

    fn broken_pipeline(proba: Vec<f64>, ledger: Arc<AttributionLedger>) -> Pipeline {
        let dataset = FlowDataset::from_records(vec![flow("BENIGN", 0.0)]).unwrap();
        let classes = vec!["BENIGN".to_string(), "DoS".to_string()];
        Pipeline::new(
            TrafficSampler::new(dataset, SamplerConfig { attack_probability: 0.0, ..Default::default() }),
            ClassifierGateway::new(Broken(classes, proba), "broken", ""),
            Explainer::default(),
            ledger,
        )
    }

    #[test]
    fn test_inference_error_aborts_run_without_touching_ledger() {
        let ledger = AttributionLedger::shared();
        ledger.record("DoS", &["SYN Flag Count"]);
        let before = ledger.snapshot();

        for proba in [vec![], vec![f64::NAN, 1.0], vec![0.4, 0.4]] {
            let pipeline = broken_pipeline(proba, Arc::clone(&ledger));

            assert!(matches!(pipeline.run(), Err(PipelineError::Inference(_))));
            assert!(pipeline.process(Uuid::new_v4(), &flow("DoS", 1.0)).is_err());
            assert_eq!(pipeline.ledger_snapshot(), before);
            assert_eq!(pipeline.engine_status().inference_count, 0);
        }
    }

    #[test]
    fn test_missing_model_is_fatal() {
        let (_dir, mut config) = setup(&["BENIGN"], 0.0, true);
        config.model_path = config.model_path.with_file_name("absent.json");
        assert!(matches!(Pipeline::load(&config), Err(PipelineError::Model(_))));
    }

    #[test]
    fn test_engine_status_tracks_runs() {
        let (_dir, config) = setup(&["BENIGN"], 0.0, true);
        let pipeline = Pipeline::load(&config).unwrap();
        for _ in 0..4 {
            pipeline.run().unwrap();
        }
        let status = pipeline.engine_status();
        assert_eq!(status.inference_count, 4);
        assert!(status.model_path.ends_with("model.json"));
        assert_eq!(status.model_sha256.len(), 64);
    }
}
