//! Result types for sequence classification.
//!
//! A classifier backend hands back one [`LabeledText`] per input, carrying the
//! full softmax score vector. [`SequenceResult`] wraps the whole batch and
//! shapes it into a [`Report`] at the caller's chosen [`DetailLevel`].

use serde::Serialize;

/// How much of a classification result to surface in a [`Report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailLevel {
    /// Inputs and the best label per input.
    #[default]
    Low,
    /// Adds score vectors, input/score pairings, and the class list.
    Medium,
    /// Adds the raw labeled items.
    High,
}

/// One class name paired with its score.
#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub value: String,
    pub score: f32,
}

/// A single classified input: the text plus one [`Label`] per model class,
/// in the model's class-id order. Scores sum to ~1.
#[derive(Debug, Clone, Serialize)]
pub struct LabeledText {
    pub text: String,
    pub labels: Vec<Label>,
}

impl LabeledText {
    pub fn new(text: impl Into<String>, labels: Vec<Label>) -> Self {
        Self {
            text: text.into(),
            labels,
        }
    }

    /// The best-scoring label, or `None` when the item carries no labels.
    pub fn prediction(&self) -> Option<&Label> {
        self.labels
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }

    /// The score vector in class-id order.
    pub fn scores(&self) -> Vec<f32> {
        self.labels.iter().map(|l| l.score).collect()
    }
}

/// A batch of classified inputs together with the global class list.
#[derive(Debug, Clone)]
pub struct SequenceResult {
    items: Vec<LabeledText>,
    classes: Vec<String>,
    class_names: Option<Vec<String>>,
}

impl SequenceResult {
    /// Wrap classified items. The class list is taken from the first item's
    /// label order, which all items of one model share.
    pub fn new(items: Vec<LabeledText>) -> Self {
        let classes = items
            .first()
            .map(|i| i.labels.iter().map(|l| l.value.clone()).collect())
            .unwrap_or_default();
        Self {
            items,
            classes,
            class_names: None,
        }
    }

    /// Override the names reported for predictions, positionally replacing the
    /// model's own class names. Useful when a checkpoint ships generic
    /// `label_0`-style names.
    pub fn with_class_names(mut self, class_names: Vec<String>) -> Self {
        self.class_names = Some(class_names);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Original input texts, in caller order.
    pub fn inputs(&self) -> Vec<String> {
        self.items.iter().map(|i| i.text.clone()).collect()
    }

    /// One softmax score vector per input, in class-id order.
    pub fn probabilities(&self) -> Vec<Vec<f32>> {
        self.items.iter().map(LabeledText::scores).collect()
    }

    /// The best classification for each input. With an override in place the
    /// name at the argmax position is taken from `class_names` instead.
    pub fn predictions(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|item| {
                let best = item
                    .labels
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| a.score.total_cmp(&b.score));
                match (best, &self.class_names) {
                    (Some((idx, _)), Some(names)) if idx < names.len() => names[idx].clone(),
                    (Some((_, label)), _) => label.value.clone(),
                    (None, _) => String::new(),
                }
            })
            .collect()
    }

    /// Shape the result into a report at the requested detail level.
    pub fn to_report(&self, detail_level: DetailLevel) -> Report {
        let mut report = Report {
            sentences: self.inputs(),
            predictions: self.predictions(),
            probs: None,
            pairings: None,
            classes: None,
            labeled: None,
        };

        if matches!(detail_level, DetailLevel::Medium | DetailLevel::High) {
            report.probs = Some(self.probabilities());
            report.pairings = Some(
                self.items
                    .iter()
                    .map(|i| (i.text.clone(), i.scores()))
                    .collect(),
            );
            report.classes = Some(self.classes.clone());
        }

        if detail_level == DetailLevel::High {
            report.labeled = Some(self.items.clone());
        }

        report
    }
}

/// A detail-leveled classification report.
///
/// `sentences` and `predictions` are always present; the rest appear from
/// [`DetailLevel::Medium`] upward, `labeled` only at [`DetailLevel::High`].
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub sentences: Vec<String>,
    pub predictions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probs: Option<Vec<Vec<f32>>>,
    /// Input text paired with its score vector, in input order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairings: Option<Vec<(String, Vec<f32>)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labeled: Option<Vec<LabeledText>>,
}

impl Report {
    /// The sentinel returned when a model cannot be loaded or the input list
    /// is empty.
    pub fn empty() -> Self {
        Self {
            sentences: vec![],
            predictions: vec![],
            probs: None,
            pairings: None,
            classes: None,
            labeled: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str, scores: &[(&str, f32)]) -> LabeledText {
        LabeledText::new(
            text,
            scores
                .iter()
                .map(|(value, score)| Label {
                    value: value.to_string(),
                    score: *score,
                })
                .collect(),
        )
    }

    #[test]
    fn prediction_is_argmax() {
        let it = item("good stuff", &[("negative", 0.1), ("positive", 0.9)]);
        assert_eq!(it.prediction().unwrap().value, "positive");

        let res = SequenceResult::new(vec![
            item("good stuff", &[("negative", 0.1), ("positive", 0.9)]),
            item("bad stuff", &[("negative", 0.7), ("positive", 0.3)]),
        ]);
        assert_eq!(res.predictions(), vec!["positive", "negative"]);
    }

    #[test]
    fn low_report_has_no_score_vectors() {
        let res = SequenceResult::new(vec![item("hi", &[("a", 0.4), ("b", 0.6)])]);
        let report = res.to_report(DetailLevel::Low);
        assert!(report.probs.is_none());
        assert!(report.pairings.is_none());
        assert!(report.classes.is_none());
        assert!(report.labeled.is_none());
        assert_eq!(report.sentences, vec!["hi"]);
        assert_eq!(report.predictions, vec!["b"]);
    }

    #[test]
    fn medium_report_adds_probs_pairings_classes() {
        let res = SequenceResult::new(vec![item("hi", &[("a", 0.4), ("b", 0.6)])]);
        let report = res.to_report(DetailLevel::Medium);
        assert_eq!(report.probs, Some(vec![vec![0.4, 0.6]]));
        assert_eq!(
            report.pairings,
            Some(vec![("hi".to_string(), vec![0.4, 0.6])])
        );
        assert_eq!(report.classes, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(report.labeled.is_none());
    }

    #[test]
    fn high_report_carries_raw_items() {
        let res = SequenceResult::new(vec![item("hi", &[("a", 0.4), ("b", 0.6)])]);
        let report = res.to_report(DetailLevel::High);
        let labeled = report.labeled.unwrap();
        assert_eq!(labeled.len(), 1);
        assert_eq!(labeled[0].labels.len(), 2);
    }

    #[test]
    fn class_name_override_replaces_positionally() {
        let res = SequenceResult::new(vec![item("hi", &[("label_0", 0.2), ("label_1", 0.8)])])
            .with_class_names(vec!["ham".to_string(), "spam".to_string()]);
        assert_eq!(res.predictions(), vec!["spam"]);
    }

    #[test]
    fn report_serializes_expected_keys() {
        let res = SequenceResult::new(vec![item("hi", &[("a", 1.0)])]);
        let low = serde_json::to_value(res.to_report(DetailLevel::Low)).unwrap();
        assert!(low.get("sentences").is_some());
        assert!(low.get("predictions").is_some());
        assert!(low.get("probs").is_none());

        let medium = serde_json::to_value(res.to_report(DetailLevel::Medium)).unwrap();
        assert!(medium.get("probs").is_some());
        assert!(medium.get("pairings").is_some());
        assert!(medium.get("classes").is_some());
    }

    #[test]
    fn empty_result_yields_empty_report() {
        let res = SequenceResult::new(vec![]);
        assert!(res.is_empty());
        let report = res.to_report(DetailLevel::High);
        assert!(report.is_empty());
        assert!(report.predictions.is_empty());
    }
}
