//! Interpreting predictions and summarizing the dataset.
//!
//! - [`assess`]: estimate, consumption per square foot, efficiency rating
//!   and recommendations for one building
//! - [`DatasetSummary`]: counts and per-type statistics for a dataset

use crate::data::{BuildingProfile, ColumnStats, Dataset};
use crate::error::Result;
use crate::features::CategoryEncoder;
use crate::model::{EnergyModel, FeatureImportance};
use serde::Serialize;
use std::fmt;

/// Age above which heating modernization is suggested.
const OLD_BUILDING_YEARS: i32 = 30;
/// `square_footage` importance above which large-space advice is given.
const AREA_IMPORTANCE: f64 = 0.3;
/// `avg_temperature` importance above which insulation advice is given.
const TEMPERATURE_IMPORTANCE: f64 = 0.2;

/// Efficiency class from consumption per square foot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EfficiencyRating {
    /// Well below typical consumption
    Excellent,
    /// Typical consumption
    Good,
    /// Above typical consumption
    Low,
}

impl EfficiencyRating {
    /// Classifies `kwh_per_sqft` for a building type.
    ///
    /// Commercial buildings are rated against 0.8 / 1.2 kWh per sq ft,
    /// every other type against 0.6 / 1.0.
    #[must_use]
    pub fn classify(kwh_per_sqft: f64, building_type: &str) -> Self {
        let (excellent, good) = if building_type == "Commercial" {
            (0.8, 1.2)
        } else {
            (0.6, 1.0)
        };
        if kwh_per_sqft < excellent {
            Self::Excellent
        } else if kwh_per_sqft < good {
            Self::Good
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for EfficiencyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Low => "Low",
        };
        f.write_str(label)
    }
}

/// Rule-based energy saving advice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    /// Floor area dominates the model
    OptimizeLargeSpaces,
    /// Outdoor temperature matters a lot
    ImproveInsulation,
    /// Building is older than 30 years
    ModernizeHeating,
    /// Electric heating
    ReviewElectricTariffs,
    /// Any non-electric heating
    CheckBoilerEfficiency,
    /// Rated [`EfficiencyRating::Low`]
    EnergyAudit,
    /// The most important model input
    FocusOnFeature(String),
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OptimizeLargeSpaces => {
                f.write_str("Optimize heating and cooling of large spaces")
            }
            Self::ImproveInsulation => {
                f.write_str("Improve thermal insulation to reduce temperature sensitivity")
            }
            Self::ModernizeHeating => f.write_str("Consider modernizing the heating system"),
            Self::ReviewElectricTariffs => {
                f.write_str("Electric heating: review tariffs and shift load off-peak")
            }
            Self::CheckBoilerEfficiency => f.write_str("Check the efficiency of the heating system"),
            Self::EnergyAudit => f.write_str("Schedule an energy audit to locate losses"),
            Self::FocusOnFeature(name) => {
                write!(f, "'{name}' has the strongest influence on consumption; start there")
            }
        }
    }
}

/// Everything reported about one predicted building.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    /// Predicted consumption (kWh)
    pub estimate: f64,
    /// Predicted consumption per square foot
    pub kwh_per_sqft: f64,
    /// Efficiency class of `kwh_per_sqft`
    pub rating: EfficiencyRating,
    /// Age relative to the model's reference year
    pub building_age: i32,
    /// Model importances in feature order
    pub importances: Vec<FeatureImportance>,
    /// Advice, most general first
    pub recommendations: Vec<Recommendation>,
}

/// Predicts and interprets consumption for one building.
///
/// # Errors
///
/// Same as [`EnergyModel::predict`].
pub fn assess(model: &EnergyModel, profile: &BuildingProfile) -> Result<Assessment> {
    let estimate = model.predict(profile)?;
    let building_age = model.encoding().building_age(profile.year_built, 0)?;
    let kwh_per_sqft = estimate / profile.square_footage;
    let rating = EfficiencyRating::classify(kwh_per_sqft, &profile.building_type);
    let importances = model.feature_importances();

    let mut recommendations = Vec::new();
    if model.importance_of("square_footage").unwrap_or(0.0) > AREA_IMPORTANCE {
        recommendations.push(Recommendation::OptimizeLargeSpaces);
    }
    if model.importance_of("avg_temperature").unwrap_or(0.0) > TEMPERATURE_IMPORTANCE {
        recommendations.push(Recommendation::ImproveInsulation);
    }
    if building_age > OLD_BUILDING_YEARS {
        recommendations.push(Recommendation::ModernizeHeating);
    }
    if profile.heating_type == "Electric" {
        recommendations.push(Recommendation::ReviewElectricTariffs);
    } else {
        recommendations.push(Recommendation::CheckBoilerEfficiency);
    }
    if rating == EfficiencyRating::Low {
        recommendations.push(Recommendation::EnergyAudit);
    }

    tracing::debug!(estimate, kwh_per_sqft, %rating, n_recommendations = recommendations.len(), "building assessed");
    Ok(Assessment {
        estimate,
        kwh_per_sqft,
        rating,
        building_age,
        importances,
        recommendations,
    })
}

/// Advice derived from the model alone, for the training report.
#[must_use]
pub fn model_recommendations(model: &EnergyModel) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    if let Some(top) = model.ranked_importances().first() {
        recommendations.push(Recommendation::FocusOnFeature(top.name.clone()));
    }
    if model.importance_of("square_footage").unwrap_or(0.0) > AREA_IMPORTANCE {
        recommendations.push(Recommendation::OptimizeLargeSpaces);
    }
    if model.importance_of("avg_temperature").unwrap_or(0.0) > TEMPERATURE_IMPORTANCE {
        recommendations.push(Recommendation::ImproveInsulation);
    }
    recommendations
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearTrend {
    /// Change in y per unit of x
    pub slope: f64,
    /// y at x = 0
    pub intercept: f64,
}

impl LinearTrend {
    /// Fits a line through `points`.
    ///
    /// `None` for fewer than three points or when every x is the same.
    #[must_use]
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
        let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
        if sxx <= f64::EPSILON {
            return None;
        }
        let sxy: f64 = points
            .iter()
            .map(|p| (p.0 - mean_x) * (p.1 - mean_y))
            .sum();
        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    /// Value of the line at `x`.
    #[must_use]
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Statistics for one building type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSummary {
    /// Building type
    pub building_type: String,
    /// Records of this type
    pub count: usize,
    /// Labeled records of this type
    pub labeled: usize,
    /// Mean consumption over labeled records
    pub mean_consumption: Option<f64>,
    /// (square_footage, energy_consumption) of labeled records
    pub consumption_by_area: Vec<(f64, f64)>,
}

/// Overview of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    /// All records
    pub n_records: usize,
    /// Records with a target
    pub n_labeled: usize,
    /// One entry per building type, in first-seen order
    pub by_type: Vec<TypeSummary>,
    /// Consumption against outdoor temperature
    pub temperature_trend: Option<LinearTrend>,
    /// Numeric column statistics
    pub columns: Vec<ColumnStats>,
}

impl DatasetSummary {
    /// Summarizes `dataset`.
    #[must_use]
    pub fn of(dataset: &Dataset) -> Self {
        let types = CategoryEncoder::fit("building_type", dataset.iter().map(|r| &r.building_type));

        let by_type = types
            .classes()
            .iter()
            .map(|building_type| {
                let rows: Vec<_> = dataset
                    .iter()
                    .filter(|r| &r.building_type == building_type)
                    .collect();
                let consumption_by_area: Vec<(f64, f64)> = rows
                    .iter()
                    .filter_map(|r| r.energy_consumption.map(|e| (r.square_footage, e)))
                    .collect();
                let mean_consumption = (!consumption_by_area.is_empty()).then(|| {
                    consumption_by_area.iter().map(|p| p.1).sum::<f64>()
                        / consumption_by_area.len() as f64
                });
                TypeSummary {
                    building_type: building_type.clone(),
                    count: rows.len(),
                    labeled: consumption_by_area.len(),
                    mean_consumption,
                    consumption_by_area,
                }
            })
            .collect();

        let temperature_points: Vec<(f64, f64)> = dataset
            .iter()
            .filter_map(|r| r.energy_consumption.map(|e| (r.avg_temperature, e)))
            .collect();

        Self {
            n_records: dataset.len(),
            n_labeled: dataset.labeled_count(),
            by_type,
            temperature_trend: LinearTrend::fit(&temperature_points),
            columns: dataset.describe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;
    use crate::data::BuildingRecord;
    use crate::features::derive_features;

    fn record(building_type: &str, sqft: f64, temp: f64, energy: Option<f64>) -> BuildingRecord {
        BuildingRecord {
            id: 0,
            building_type: building_type.to_string(),
            square_footage: sqft,
            year_built: 1985,
            heating_type: "Gas".to_string(),
            occupant_count: 3,
            month: 1,
            avg_temperature: temp,
            avg_humidity: 50.0,
            energy_consumption: energy,
        }
    }

    fn dataset(records: Vec<BuildingRecord>) -> Dataset {
        let mut dataset = Dataset::new();
        for r in records {
            dataset.append(r).expect("valid");
        }
        dataset
    }

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(EfficiencyRating::classify(0.7, "Commercial"), EfficiencyRating::Excellent);
        assert_eq!(EfficiencyRating::classify(0.7, "Residential"), EfficiencyRating::Good);
        assert_eq!(EfficiencyRating::classify(1.1, "Commercial"), EfficiencyRating::Good);
        assert_eq!(EfficiencyRating::classify(1.1, "Residential"), EfficiencyRating::Low);
        assert_eq!(EfficiencyRating::classify(1.2, "Commercial"), EfficiencyRating::Low);
        assert_eq!(EfficiencyRating::Low.to_string(), "Low");
    }

    #[test]
    fn test_trend_exact_line() {
        let trend = LinearTrend::fit(&[(0.0, 10.0), (1.0, 8.0), (2.0, 6.0), (3.0, 4.0)])
            .expect("enough points");
        assert!((trend.slope + 2.0).abs() < 1e-12);
        assert!((trend.intercept - 10.0).abs() < 1e-12);
        assert!((trend.at(5.0)).abs() < 1e-12);
    }

    #[test]
    fn test_trend_needs_three_distinct_points() {
        assert!(LinearTrend::fit(&[(0.0, 1.0), (1.0, 2.0)]).is_none());
        assert!(LinearTrend::fit(&[(4.0, 1.0), (4.0, 2.0), (4.0, 3.0)]).is_none());
    }

    #[test]
    fn test_summary_per_type() {
        let summary = DatasetSummary::of(&dataset(vec![
            record("Residential", 1000.0, 0.0, Some(900.0)),
            record("Commercial", 2000.0, 10.0, Some(3000.0)),
            record("Residential", 1500.0, 20.0, Some(1100.0)),
            record("Residential", 1200.0, 5.0, None),
        ]));

        assert_eq!(summary.n_records, 4);
        assert_eq!(summary.n_labeled, 3);
        assert_eq!(summary.by_type.len(), 2);

        let residential = &summary.by_type[0];
        assert_eq!(residential.building_type, "Residential");
        assert_eq!(residential.count, 3);
        assert_eq!(residential.labeled, 2);
        assert_eq!(residential.mean_consumption, Some(1000.0));
        assert_eq!(residential.consumption_by_area, vec![(1000.0, 900.0), (1500.0, 1100.0)]);

        assert_eq!(summary.by_type[1].mean_consumption, Some(3000.0));
        assert!(summary.temperature_trend.is_some());
        assert!(!summary.columns.is_empty());
    }

    #[test]
    fn test_summary_of_empty_dataset() {
        let summary = DatasetSummary::of(&Dataset::new());
        assert_eq!(summary.n_records, 0);
        assert!(summary.by_type.is_empty());
        assert!(summary.temperature_trend.is_none());
    }

    #[test]
    fn test_assess_old_gas_building() {
        let data = dataset(
            (0..12)
                .map(|i| {
                    let sqft = 1000.0 + 100.0 * f64::from(i);
                    record("Residential", sqft, 5.0, Some(2.0 * sqft))
                })
                .collect(),
        );
        let table = derive_features(&data, 2024).expect("derivable");
        let model =
            EnergyModel::fit(&table, &ForestConfig::default().with_n_estimators(10)).expect("fit");

        let assessment = assess(&model, &data.records()[0].profile()).expect("known categories");
        assert_eq!(assessment.building_age, 39);
        assert!((assessment.kwh_per_sqft - assessment.estimate / 1000.0).abs() < 1e-12);
        // roughly 2 kWh per sq ft, far above the residential threshold
        assert_eq!(assessment.rating, EfficiencyRating::Low);
        assert!(assessment
            .recommendations
            .contains(&Recommendation::ModernizeHeating));
        assert!(assessment
            .recommendations
            .contains(&Recommendation::CheckBoilerEfficiency));
        assert!(assessment.recommendations.contains(&Recommendation::EnergyAudit));
        // area is the only varying input
        assert!(assessment
            .recommendations
            .contains(&Recommendation::OptimizeLargeSpaces));
        assert!(!assessment
            .recommendations
            .contains(&Recommendation::ReviewElectricTariffs));

        let report_advice = model_recommendations(&model);
        assert_eq!(
            report_advice[0],
            Recommendation::FocusOnFeature("square_footage".to_string())
        );
    }
}
