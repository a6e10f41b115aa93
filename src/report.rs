//! Plain-text training report.

use crate::analysis::{model_recommendations, Recommendation};
use crate::error::Result;
use crate::model::{EnergyModel, Evaluation, FeatureImportance};
use serde::Serialize;
use std::fmt;
use std::path::Path;

const RULE_WIDTH: usize = 60;

/// Model accuracy and the inputs that drive it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    /// Rows in the input table
    pub n_records: usize,
    /// Rows the final model was fit on
    pub n_training_samples: usize,
    /// Reference year used for `building_age`
    pub reference_year: i32,
    /// Hold-out (or in-sample) accuracy
    pub evaluation: Evaluation,
    /// Out-of-bag R² of the final model
    pub oob_score: Option<f64>,
    /// Most important features, descending
    pub top_features: Vec<FeatureImportance>,
    /// Model-level advice
    pub recommendations: Vec<Recommendation>,
}

impl TrainingReport {
    /// Collects the report for `model`, listing `top_n` features.
    #[must_use]
    pub fn new(n_records: usize, evaluation: Evaluation, model: &EnergyModel, top_n: usize) -> Self {
        let mut top_features = model.ranked_importances();
        top_features.truncate(top_n);
        Self {
            n_records,
            n_training_samples: model.n_training_samples(),
            reference_year: model.encoding().reference_year(),
            evaluation,
            oob_score: model.forest().oob_score(),
            top_features,
            recommendations: model_recommendations(model),
        }
    }

    /// Writes the rendered report, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be written.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_string())?;
        tracing::info!(path = %path.display(), "report written");
        Ok(())
    }
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        let thin = "-".repeat(RULE_WIDTH);
        let eval = &self.evaluation;

        writeln!(f, "{rule}")?;
        writeln!(f, "BUILDING ENERGY CONSUMPTION MODEL")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Records:            {}", self.n_records)?;
        writeln!(f, "Training samples:   {}", self.n_training_samples)?;
        writeln!(f, "Reference year:     {}", self.reference_year)?;
        writeln!(f)?;

        writeln!(f, "ACCURACY")?;
        writeln!(f, "{thin}")?;
        if eval.in_sample {
            writeln!(
                f,
                "Too few rows for a hold-out set; scores are on {} training rows.",
                eval.n_test
            )?;
        } else {
            writeln!(f, "Hold-out: {} train / {} test rows", eval.n_train, eval.n_test)?;
        }
        writeln!(f, "MAE:   {:.2} kWh", eval.mae)?;
        writeln!(f, "RMSE:  {:.2} kWh", eval.rmse)?;
        writeln!(f, "R2:    {:.3}", eval.r2)?;
        if let Some(oob) = self.oob_score {
            writeln!(f, "OOB R2 (final model): {oob:.3}")?;
        }
        writeln!(f)?;

        writeln!(f, "TOP FEATURES")?;
        writeln!(f, "{thin}")?;
        for (rank, feature) in self.top_features.iter().enumerate() {
            let percent = feature.importance * 100.0;
            let bar = "#".repeat((percent / 5.0) as usize);
            writeln!(
                f,
                "{}. {:<22} {:>5.1}% {bar}",
                rank + 1,
                feature.name,
                percent
            )?;
        }
        writeln!(f)?;

        writeln!(f, "RECOMMENDATIONS")?;
        writeln!(f, "{thin}")?;
        if self.recommendations.is_empty() {
            writeln!(f, "- No issues found; keep monitoring consumption")?;
        }
        for recommendation in &self.recommendations {
            writeln!(f, "- {recommendation}")?;
        }
        write!(f, "{rule}")
    }
}
