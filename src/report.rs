//! Text and JSON report of the final evaluation

use crate::api::EvaluationMetrics;
use crate::model_selection::GridEntry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality band a metric falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// 0.95 and above
    High,
    /// From 0.90 up to 0.95
    Good,
    /// Below 0.90
    Low,
}

impl Tier {
    pub fn of(value: f64) -> Self {
        if value >= 0.95 {
            Tier::High
        } else if value >= 0.90 {
            Tier::Good
        } else {
            Tier::Low
        }
    }
}

/// Metric the analysis sentence is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Precision,
    Recall,
    Specificity,
}

impl Metric {
    fn name(self) -> &'static str {
        match self {
            Metric::Precision => "Precision",
            Metric::Recall => "Recall",
            Metric::Specificity => "Specificity",
        }
    }

    fn definition(self) -> &'static str {
        match self {
            Metric::Precision => "true positives over all predicted positives",
            Metric::Recall => "true positives over all actual positives",
            Metric::Specificity => "true negatives over all actual negatives",
        }
    }
}

/// Interpretation of a metric value
pub fn analysis(metric: Metric, value: f64) -> &'static str {
    match (metric, Tier::of(value)) {
        (Metric::Precision, Tier::High) => {
            "High precision: few benign cases are flagged as cancer, which matters when false alarms are costly."
        }
        (Metric::Precision, Tier::Good) => {
            "Good precision, though false positives could still be reduced."
        }
        (Metric::Precision, Tier::Low) => {
            "Precision is relatively low; the positive predictive value needs improvement."
        }
        (Metric::Recall, Tier::High) => {
            "High recall: nearly all actual cancer cases are caught, which matters when missing one is critical."
        }
        (Metric::Recall, Tier::Good) => {
            "Good recall, with room to capture more of the positive cases."
        }
        (Metric::Recall, Tier::Low) => {
            "Recall is relatively low; sensitivity needs improvement."
        }
        (Metric::Specificity, Tier::High) => {
            "High specificity: benign cases are reliably recognised, keeping false alarms rare."
        }
        (Metric::Specificity, Tier::Good) => {
            "Good specificity, with room to cut misclassified negatives further."
        }
        (Metric::Specificity, Tier::Low) => {
            "Specificity is relatively low; the negative predictive value needs improvement."
        }
    }
}

/// Everything printed after the search finishes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub best_c: f64,
    pub best_gamma: f64,
    /// Mean cross-validated accuracy of the best grid point
    pub cv_accuracy: f64,
    pub confusion: EvaluationMetrics,
    pub precision: f64,
    pub recall: f64,
    pub specificity: f64,
    pub test_samples: usize,
    pub total_samples: usize,
    pub n_support_vectors: usize,
    pub bias: f64,
}

impl Report {
    pub fn new(
        best: &GridEntry,
        confusion: EvaluationMetrics,
        total_samples: usize,
        n_support_vectors: usize,
        bias: f64,
    ) -> Self {
        Self {
            best_c: best.c,
            best_gamma: best.gamma,
            cv_accuracy: best.mean_score,
            confusion,
            precision: confusion.precision(),
            recall: confusion.recall(),
            specificity: confusion.specificity(),
            test_samples: confusion.total(),
            total_samples,
            n_support_vectors,
            bias,
        }
    }

    /// Fraction of the cleaned dataset the metrics were computed on
    pub fn test_share(&self) -> f64 {
        if self.total_samples == 0 {
            0.0
        } else {
            self.test_samples as f64 / self.total_samples as f64
        }
    }

    fn metrics(&self) -> [(Metric, f64); 3] {
        [
            (Metric::Precision, self.precision),
            (Metric::Recall, self.recall),
            (Metric::Specificity, self.specificity),
        ]
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Test Set Metrics ===")?;
        for (metric, value) in self.metrics() {
            writeln!(
                f,
                "* {}: {:.4} ({})",
                metric.name(),
                value,
                metric.definition()
            )?;
        }

        writeln!(f)?;
        writeln!(f, "=== Analysis ===")?;
        for (metric, value) in self.metrics() {
            writeln!(f, "{}: {:.2}%", metric.name(), value * 100.0)?;
            writeln!(f, "   {}", analysis(metric, value))?;
        }

        let cm = &self.confusion;
        writeln!(f)?;
        writeln!(f, "=== Confusion Matrix ===")?;
        writeln!(
            f,
            "{:<18} {:>20} {:>16}",
            "", "Predicted Non-Cancer", "Predicted Cancer"
        )?;
        writeln!(
            f,
            "{:<18} {:>20} {:>16}",
            "Actual Non-Cancer", cm.true_negatives, cm.false_positives
        )?;
        writeln!(
            f,
            "{:<18} {:>20} {:>16}",
            "Actual Cancer", cm.false_negatives, cm.true_positives
        )?;

        writeln!(f)?;
        writeln!(f, "Legend:")?;
        writeln!(
            f,
            " - True Positive (TP): {} cases of cancer correctly classified as cancer.",
            cm.true_positives
        )?;
        writeln!(
            f,
            " - False Negative (FN): {} cases of cancer incorrectly classified as non-cancer.",
            cm.false_negatives
        )?;
        writeln!(
            f,
            " - True Negative (TN): {} cases of non-cancer correctly classified as non-cancer.",
            cm.true_negatives
        )?;
        writeln!(
            f,
            " - False Positive (FP): {} cases of non-cancer incorrectly classified as cancer.",
            cm.false_positives
        )?;

        writeln!(f)?;
        writeln!(
            f,
            "Metrics were computed on the held-out test set: {} of {} samples ({:.1}% of the cleaned dataset).",
            self.test_samples,
            self.total_samples,
            self.test_share() * 100.0
        )?;

        writeln!(f)?;
        writeln!(
            f,
            "Best parameters: C={}, gamma={}",
            self.best_c, self.best_gamma
        )?;
        writeln!(f, "Cross-validated accuracy: {:.4}", self.cv_accuracy)?;
        write!(
            f,
            "Final model: {} support vectors, bias {:.6}",
            self.n_support_vectors, self.bias
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> Report {
        let best = GridEntry {
            c: 10.0,
            gamma: 0.01,
            mean_score: 0.97,
            std_score: 0.01,
            fold_scores: vec![0.96, 0.97, 0.98],
        };
        // 150 TP, 250 TN, 6 FP, 4 FN
        Report::new(&best, EvaluationMetrics::new(150, 250, 6, 4), 683, 42, -0.25)
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Tier::of(1.0), Tier::High);
        assert_eq!(Tier::of(0.95), Tier::High);
        assert_eq!(Tier::of(0.949), Tier::Good);
        assert_eq!(Tier::of(0.90), Tier::Good);
        assert_eq!(Tier::of(0.899), Tier::Low);
        assert_eq!(Tier::of(0.0), Tier::Low);
    }

    #[test]
    fn test_report_values() {
        let report = sample_report();
        assert_eq!(report.test_samples, 410);
        assert_eq!(report.precision, 150.0 / 156.0);
        assert_eq!(report.recall, 150.0 / 154.0);
        assert_eq!(report.specificity, 250.0 / 256.0);
        assert!((report.test_share() - 410.0 / 683.0).abs() < 1e-12);
    }

    #[test]
    fn test_report_rendering() {
        let report = sample_report();
        let text = report.to_string();

        assert!(text.contains("Predicted Non-Cancer"));
        assert!(text.contains("Predicted Cancer"));
        assert!(text.contains("Actual Non-Cancer"));
        assert!(text.contains("Actual Cancer"));
        assert!(text.contains("True Positive (TP): 150 cases"));
        assert!(text.contains("False Negative (FN): 4 cases"));
        assert!(text.contains("True Negative (TN): 250 cases"));
        assert!(text.contains("False Positive (FP): 6 cases"));
        assert!(text.contains("410 of 683 samples (60.0% of the cleaned dataset)"));
        assert!(text.contains("Best parameters: C=10, gamma=0.01"));
        assert!(text.contains("Cross-validated accuracy: 0.9700"));
        assert!(text.contains("42 support vectors"));
        assert!(text.contains(analysis(Metric::Precision, report.precision)));
    }

    #[test]
    fn test_analysis_picks_tier() {
        assert!(analysis(Metric::Recall, 0.99).starts_with("High recall"));
        assert!(analysis(Metric::Recall, 0.92).starts_with("Good recall"));
        assert!(analysis(Metric::Recall, 0.5).starts_with("Recall is relatively low"));
        assert!(analysis(Metric::Specificity, 0.91).starts_with("Good specificity"));
    }

    #[test]
    fn test_report_json() {
        let json = serde_json::to_value(sample_report()).expect("Should serialize");
        assert_eq!(json["best_c"], 10.0);
        assert_eq!(json["confusion"]["true_positives"], 150);
        assert_eq!(json["n_support_vectors"], 42);
    }
}
