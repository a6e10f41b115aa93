//! Property-based tests using proptest.
//!
//! These tests verify invariants of feature derivation and the forest.

use building_energy::features::{derive_features, CategoryEncoder};
use building_energy::model_selection::train_test_indices;
use building_energy::prelude::*;
use proptest::prelude::*;

const BUILDING_TYPES: [&str; 3] = ["Commercial", "Residential", "Warehouse"];
const HEATING_TYPES: [&str; 3] = ["Electric", "Gas", "HeatPump"];

// Strategy for one labeled or unlabeled record built no later than 2024
fn record_strategy() -> impl Strategy<Value = BuildingRecord> {
    (
        0usize..3,
        100.0f64..50_000.0,
        1900i32..=2024,
        0usize..3,
        0u32..500,
        1u8..=12,
        -30.0f64..40.0,
        0.0f64..=100.0,
        proptest::option::of(0.0f64..100_000.0),
    )
        .prop_map(
            |(bt, sqft, year, ht, occupants, month, temp, humidity, energy)| BuildingRecord {
                id: 0,
                building_type: BUILDING_TYPES[bt].to_string(),
                square_footage: sqft,
                year_built: year,
                heating_type: HEATING_TYPES[ht].to_string(),
                occupant_count: occupants,
                month,
                avg_temperature: temp,
                avg_humidity: humidity,
                energy_consumption: energy,
            },
        )
}

fn dataset_strategy(max_len: usize) -> impl Strategy<Value = Dataset> {
    proptest::collection::vec(record_strategy(), 0..max_len).prop_map(|records| {
        let mut dataset = Dataset::new();
        for record in records {
            dataset.append(record).expect("generated records are valid");
        }
        dataset
    })
}

// Strategy for a small labeled training table
fn labeled_dataset_strategy() -> impl Strategy<Value = Dataset> {
    proptest::collection::vec(
        record_strategy().prop_map(|mut r| {
            r.energy_consumption = Some(r.energy_consumption.unwrap_or(0.0) + r.square_footage);
            r
        }),
        1..25,
    )
    .prop_map(|records| Dataset::from_records(records).expect("generated records are valid"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn derive_is_idempotent_through_csv(dataset in dataset_strategy(20), year in 2024i32..2100) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("processed.csv");

        let first = derive_features(&dataset, year).expect("derivable");
        first.save_csv(&path).expect("write");
        let reloaded = Dataset::load(&path).expect("reload");
        let second = derive_features(&reloaded, year).expect("derivable");

        let ages = |t: &DerivedTable| t.records().iter().map(|r| r.building_age).collect::<Vec<_>>();
        prop_assert_eq!(ages(&first), ages(&second));
        prop_assert_eq!(first.encoding(), second.encoding());
    }

    #[test]
    fn building_age_is_reference_minus_construction(dataset in dataset_strategy(20), year in 2024i32..2100) {
        let table = derive_features(&dataset, year).expect("derivable");
        for derived in table.records() {
            prop_assert_eq!(derived.building_age, year - derived.record.year_built);
            prop_assert!(derived.building_age >= 0);
        }
    }

    #[test]
    fn encoding_is_deterministic(values in proptest::collection::vec(0usize..3, 0..30)) {
        let names: Vec<&str> = values.iter().map(|&i| BUILDING_TYPES[i]).collect();
        let a = CategoryEncoder::fit("building_type", &names);
        let b = CategoryEncoder::fit("building_type", &names);
        prop_assert_eq!(&a, &b);

        // codes are dense and follow first appearance
        for (code, class) in a.classes().iter().enumerate() {
            prop_assert_eq!(a.transform(class).expect("seen"), code);
            let first = names.iter().position(|n| n == class).expect("present");
            let earlier_new = names[..first].iter().filter(|n| a.transform(n).expect("seen") >= code).count();
            prop_assert_eq!(earlier_new, 0);
        }
    }

    #[test]
    fn importances_are_a_distribution(dataset in labeled_dataset_strategy(), seed in any::<u64>()) {
        let table = derive_features(&dataset, 2024).expect("derivable");
        let config = ForestConfig::default()
            .with_n_estimators(5)
            .with_max_features(MaxFeatures::Sqrt)
            .with_random_state(Some(seed));
        let model = EnergyModel::fit(&table, &config).expect("labeled rows");

        let importances = model.feature_importances();
        prop_assert_eq!(importances.len(), FEATURE_NAMES.len());
        prop_assert!(importances.iter().all(|f| f.importance >= 0.0));
        let total: f64 = importances.iter().map(|f| f.importance).sum();
        prop_assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn predictions_stay_within_target_range(dataset in labeled_dataset_strategy()) {
        let table = derive_features(&dataset, 2024).expect("derivable");
        let model = EnergyModel::fit(&table, &ForestConfig::default().with_n_estimators(5))
            .expect("labeled rows");

        let targets: Vec<f64> = dataset.iter().filter_map(|r| r.energy_consumption).collect();
        let lo = targets.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = targets.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for record in dataset.iter() {
            let estimate = model.predict(&record.profile()).expect("known categories");
            prop_assert!(estimate >= lo - 1e-6 && estimate <= hi + 1e-6);
        }
    }

    #[test]
    fn split_partitions_rows(n in 10usize..200, test_size in 0.1f64..0.9, seed in any::<u64>()) {
        let split = train_test_indices(n, test_size, Some(seed)).expect("valid split");
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        prop_assert_eq!(all, (0..n).collect::<Vec<_>>());
    }
}
