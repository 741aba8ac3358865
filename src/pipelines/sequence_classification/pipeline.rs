//! The "easy" entry point: load classifiers by name, tag text, get a report.

use std::collections::HashMap;

use candle_core::Device;

use crate::core::{DetailLevel, Report, Result, SequenceResult};
use crate::models::{BertSequenceClassifier, ModernBertSequenceClassifier};
use crate::utils::load_device;

use super::model::SequenceClassifierModel;
use super::reorder::LengthOrdering;

/// A registry of sequence classifiers, loaded lazily and cached by model id
/// for the life of the registry.
///
/// Loading tries the ModernBERT backend first and falls back to plain BERT;
/// when neither can load the checkpoint a diagnostic is logged and an empty
/// report is returned instead of an error. The registry is not a shared-state
/// type: it takes `&mut self`, so concurrent callers must serialize access.
///
/// ```no_run
/// use easynlp::{DetailLevel, EasySequenceClassifier};
///
/// let mut classifier = EasySequenceClassifier::new();
/// let report = classifier.tag_one(
///     "I love this crate!",
///     "clapAI/modernBERT-base-multilingual-sentiment",
///     DetailLevel::Low,
/// )?;
/// println!("{:?}", report.predictions);
/// # easynlp::Result::Ok(())
/// ```
pub struct EasySequenceClassifier {
    classifiers: HashMap<String, Box<dyn SequenceClassifierModel>>,
    device: Device,
}

impl EasySequenceClassifier {
    /// Create a registry on the default device (CUDA if available, else CPU).
    pub fn new() -> Self {
        Self::with_device(load_device())
    }

    pub fn with_device(device: Device) -> Self {
        Self {
            classifiers: HashMap::new(),
            device,
        }
    }

    /// Register an already-constructed classifier under a name, bypassing the
    /// backend loaders. Subsequent `tag_text` calls with that name dispatch
    /// to it.
    pub fn register(&mut self, name: impl Into<String>, model: Box<dyn SequenceClassifierModel>) {
        self.classifiers.insert(name.into(), model);
    }

    /// Names of the classifiers loaded so far.
    pub fn loaded(&self) -> Vec<&str> {
        self.classifiers.keys().map(String::as_str).collect()
    }

    /// Tag a batch of texts with the labels of the model behind `model_id`,
    /// loading and caching it on first use.
    ///
    /// Inputs are sorted by length descending before inference so padding is
    /// spent on similarly sized batches, and restored to caller order in the
    /// report. An empty input list yields an empty report; so does a model
    /// that no backend can load (with an error logged). Inference failures
    /// propagate.
    pub fn tag_text(
        &mut self,
        texts: &[String],
        model_id: &str,
        batch_size: usize,
        detail_level: DetailLevel,
    ) -> Result<Report> {
        Ok(match self.classify(texts, model_id, batch_size)? {
            Some(result) => result.to_report(detail_level),
            None => Report::empty(),
        })
    }

    /// `tag_text` with the model's class names positionally replaced by
    /// `class_names` in the report's predictions.
    pub fn tag_text_with_class_names(
        &mut self,
        texts: &[String],
        model_id: &str,
        batch_size: usize,
        detail_level: DetailLevel,
        class_names: Vec<String>,
    ) -> Result<Report> {
        Ok(match self.classify(texts, model_id, batch_size)? {
            Some(result) => result.with_class_names(class_names).to_report(detail_level),
            None => Report::empty(),
        })
    }

    /// Dispatch to the cached (or freshly loaded) classifier. `None` is the
    /// sentinel for empty input or a model no backend could load.
    fn classify(
        &mut self,
        texts: &[String],
        model_id: &str,
        batch_size: usize,
    ) -> Result<Option<SequenceResult>> {
        if texts.is_empty() {
            return Ok(None);
        }

        if !self.classifiers.contains_key(model_id) {
            match load_backend(model_id, &self.device) {
                Some(model) => {
                    self.classifiers.insert(model_id.to_string(), model);
                }
                None => return Ok(None),
            }
        }
        let classifier = match self.classifiers.get(model_id) {
            Some(classifier) => classifier,
            None => return Ok(None),
        };

        let ordering = LengthOrdering::by_length_desc(texts);
        let reordered = ordering.apply(texts);
        let labeled = classifier.predict(&reordered, batch_size)?;
        if labeled.len() != texts.len() {
            return Err(crate::core::Error::ShapeMismatch(format!(
                "classifier returned {} items for {} inputs",
                labeled.len(),
                texts.len()
            )));
        }
        let labeled = ordering.restore(labeled);

        Ok(Some(SequenceResult::new(labeled)))
    }

    /// Convenience wrapper for a single text.
    pub fn tag_one(
        &mut self,
        text: &str,
        model_id: &str,
        detail_level: DetailLevel,
    ) -> Result<Report> {
        self.tag_text(&[text.to_string()], model_id, 1, detail_level)
    }

    /// Tag the same texts with every classifier loaded so far, returning one
    /// report per model name.
    pub fn tag_all(
        &mut self,
        texts: &[String],
        batch_size: usize,
        detail_level: DetailLevel,
    ) -> Result<Vec<(String, Report)>> {
        let mut names: Vec<String> = self.classifiers.keys().cloned().collect();
        names.sort();

        names
            .into_iter()
            .map(|name| {
                let report = self.tag_text(texts, &name, batch_size, detail_level)?;
                Ok((name, report))
            })
            .collect()
    }
}

impl Default for EasySequenceClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Try the ModernBERT backend, then BERT. Both failing is logged, not raised.
fn load_backend(model_id: &str, device: &Device) -> Option<Box<dyn SequenceClassifierModel>> {
    match ModernBertSequenceClassifier::from_pretrained(model_id, device) {
        Ok(model) => return Some(Box::new(model)),
        Err(e) => {
            tracing::warn!(model_id, error = %e, "ModernBERT backend failed, trying BERT");
        }
    }

    match BertSequenceClassifier::from_pretrained(model_id, device) {
        Ok(model) => Some(Box::new(model)),
        Err(e) => {
            tracing::error!(model_id, error = %e, "no backend could load this model");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::core::{Label, LabeledText};

    /// Scores "love" texts positive and records the order texts arrive in.
    struct StubClassifier {
        classes: Vec<String>,
        device: Device,
        seen: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl StubClassifier {
        fn new(seen: Arc<Mutex<Vec<Vec<String>>>>) -> Self {
            Self {
                classes: vec!["negative".to_string(), "positive".to_string()],
                device: Device::Cpu,
                seen,
            }
        }
    }

    impl SequenceClassifierModel for StubClassifier {
        fn predict(&self, texts: &[String], _batch_size: usize) -> Result<Vec<LabeledText>> {
            self.seen.lock().unwrap().push(texts.to_vec());
            Ok(texts
                .iter()
                .map(|text| {
                    let positive = if text.contains("love") { 0.9 } else { 0.2 };
                    LabeledText::new(
                        text.clone(),
                        vec![
                            Label {
                                value: "negative".to_string(),
                                score: 1.0 - positive,
                            },
                            Label {
                                value: "positive".to_string(),
                                score: positive,
                            },
                        ],
                    )
                })
                .collect())
        }

        fn classes(&self) -> &[String] {
            &self.classes
        }

        fn device(&self) -> &Device {
            &self.device
        }
    }

    fn registry_with_stub(seen: &Arc<Mutex<Vec<Vec<String>>>>) -> EasySequenceClassifier {
        let mut registry = EasySequenceClassifier::with_device(Device::Cpu);
        registry.register("stub", Box::new(StubClassifier::new(Arc::clone(seen))));
        registry
    }

    #[test]
    fn predictions_come_back_in_caller_order() {
        let seen = Arc::new(Mutex::new(vec![]));
        let mut registry = registry_with_stub(&seen);

        let texts = vec!["I love this".to_string(), "This is terrible".to_string()];
        let report = registry
            .tag_text(&texts, "stub", 32, DetailLevel::Low)
            .unwrap();

        assert_eq!(report.sentences, texts);
        assert_eq!(report.predictions, vec!["positive", "negative"]);
    }

    #[test]
    fn model_sees_texts_longest_first() {
        let seen = Arc::new(Mutex::new(vec![]));
        let mut registry = registry_with_stub(&seen);

        let texts = vec![
            "mid length".to_string(),
            "the longest sentence of them all, with love".to_string(),
            "tiny".to_string(),
        ];
        registry
            .tag_text(&texts, "stub", 32, DetailLevel::Low)
            .unwrap();

        let calls = seen.lock().unwrap();
        assert_eq!(
            calls[0],
            vec![
                "the longest sentence of them all, with love".to_string(),
                "mid length".to_string(),
                "tiny".to_string(),
            ]
        );
    }

    #[test]
    fn empty_input_yields_empty_report_without_dispatch() {
        let seen = Arc::new(Mutex::new(vec![]));
        let mut registry = registry_with_stub(&seen);

        let report = registry
            .tag_text(&[], "stub", 32, DetailLevel::High)
            .unwrap();

        assert!(report.is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn registered_classifier_is_reused_across_calls() {
        let seen = Arc::new(Mutex::new(vec![]));
        let mut registry = registry_with_stub(&seen);

        let texts = vec!["some text".to_string()];
        registry
            .tag_text(&texts, "stub", 32, DetailLevel::Low)
            .unwrap();
        registry
            .tag_text(&texts, "stub", 32, DetailLevel::Low)
            .unwrap();

        assert_eq!(registry.loaded(), vec!["stub"]);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn tag_all_runs_every_cached_model() {
        let seen = Arc::new(Mutex::new(vec![]));
        let mut registry = registry_with_stub(&seen);
        registry.register("second", Box::new(StubClassifier::new(Arc::clone(&seen))));

        let texts = vec!["I love it".to_string()];
        let reports = registry.tag_all(&texts, 8, DetailLevel::Low).unwrap();

        let names: Vec<&str> = reports.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["second", "stub"]);
        for (_, report) in &reports {
            assert_eq!(report.predictions, vec!["positive"]);
        }
    }

    /// Always answers with one item fewer than it was asked about.
    struct TruncatingClassifier {
        classes: Vec<String>,
        device: Device,
    }

    impl SequenceClassifierModel for TruncatingClassifier {
        fn predict(&self, texts: &[String], _batch_size: usize) -> Result<Vec<LabeledText>> {
            Ok(texts
                .iter()
                .take(texts.len().saturating_sub(1))
                .map(|text| {
                    LabeledText::new(
                        text.clone(),
                        vec![Label {
                            value: "negative".to_string(),
                            score: 1.0,
                        }],
                    )
                })
                .collect())
        }

        fn classes(&self) -> &[String] {
            &self.classes
        }

        fn device(&self) -> &Device {
            &self.device
        }
    }

    #[test]
    fn short_model_output_is_a_shape_error_not_a_panic() {
        let mut registry = EasySequenceClassifier::with_device(Device::Cpu);
        registry.register(
            "lossy",
            Box::new(TruncatingClassifier {
                classes: vec!["negative".to_string()],
                device: Device::Cpu,
            }),
        );

        let texts = vec!["first".to_string(), "second".to_string()];
        let err = registry
            .tag_text(&texts, "lossy", 32, DetailLevel::Low)
            .unwrap_err();

        assert!(matches!(err, crate::core::Error::ShapeMismatch(_)));
    }

    #[test]
    fn class_name_override_flows_into_report() {
        let seen = Arc::new(Mutex::new(vec![]));
        let mut registry = registry_with_stub(&seen);

        let texts = vec!["I love this".to_string()];
        let report = registry
            .tag_text_with_class_names(
                &texts,
                "stub",
                32,
                DetailLevel::Medium,
                vec!["bad".to_string(), "good".to_string()],
            )
            .unwrap();

        assert_eq!(report.predictions, vec!["good"]);
        // The model's own class list is still reported.
        assert_eq!(
            report.classes,
            Some(vec!["negative".to_string(), "positive".to_string()])
        );
    }
}
