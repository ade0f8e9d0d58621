mod common;

use approx::assert_abs_diff_eq;
use price_estimator::align::align;
use price_estimator::preprocessing::{EncodedRecord, ScalerAdapter};
use price_estimator::{FeatureSchema, InferenceRecord, SchemaBuilder, TrainingDataset};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn schema_strategy() -> impl Strategy<Value = FeatureSchema> {
    prop::collection::btree_set("[A-Za-z]{1,8}(_[A-Z]{1,4})?", 0..12)
        .prop_map(|names| FeatureSchema::new(names).unwrap())
}

fn record_strategy() -> impl Strategy<Value = BTreeMap<String, f64>> {
    prop::collection::btree_map("[A-Za-z]{1,8}(_[A-Z]{1,4})?", -1e6f64..1e6, 0..16)
}

proptest! {
    #[test]
    fn prop_aligned_length_equals_schema(
        schema in schema_strategy(),
        values in record_strategy(),
    ) {
        let record: EncodedRecord = values.into_iter().collect();
        prop_assert_eq!(align(&record, &schema).len(), schema.len());
    }

    #[test]
    fn prop_unknown_columns_are_dropped(
        schema in schema_strategy(),
        values in record_strategy(),
    ) {
        let known: EncodedRecord = values
            .iter()
            .filter(|(name, _)| schema.position(name).is_some())
            .map(|(name, value)| (name.clone(), *value))
            .collect();
        let all: EncodedRecord = values.into_iter().collect();

        prop_assert_eq!(align(&all, &schema), align(&known, &schema));
    }

    #[test]
    fn prop_aligned_values_follow_schema(
        schema in schema_strategy(),
        values in record_strategy(),
    ) {
        let record: EncodedRecord = values.iter().map(|(k, v)| (k.clone(), *v)).collect();
        let aligned = align(&record, &schema).to_vec();
        for (i, name) in schema.iter().enumerate() {
            let expected = values.get(name).copied().unwrap_or(0.0);
            prop_assert_eq!(aligned[i], expected);
        }
    }

    #[test]
    fn prop_encoder_output_aligns_to_schema(
        living_area in 0u32..5000,
        peb in prop::sample::select(vec!["A++", "A", "B", "C", "G", "Unknown", "Z"]),
        state in prop::sample::select(vec!["GOOD", "AS_NEW", "TO_RESTORE", "BROKEN"]),
        include_state in any::<bool>(),
    ) {
        let ds = TrainingDataset::from_reader(common::training_csv(24).as_bytes(), "Price").unwrap();
        let fit = SchemaBuilder::new().build(ds.features()).unwrap();

        let mut record = InferenceRecord::new()
            .with("LivingArea", living_area)
            .with("PEB", format!("PEB_{}", peb));
        if include_state {
            record.insert("StateOfBuilding", format!("StateOfBuilding_{}", state));
        }
        let encoded = fit.encoder.encode_record(&record).unwrap();
        let aligned = align(&encoded, &fit.schema);

        prop_assert_eq!(aligned.len(), fit.schema.len());
        let mut hot = 0;
        for (name, value) in fit.schema.iter().zip(aligned.values().iter()) {
            if name == "LivingArea" {
                prop_assert_eq!(*value, f64::from(living_area));
            } else if name.contains('_') {
                prop_assert!(*value == 0.0 || *value == 1.0);
                hot += usize::from(*value == 1.0);
            } else {
                prop_assert_eq!(*value, 0.0);
            }
        }
        prop_assert!(hot <= 2);
    }
}

#[test]
fn test_zero_fill_example() {
    let schema =
        FeatureSchema::new(["LivingArea", "PEB_B", "PEB_C", "StateOfBuilding_AS_NEW"]).unwrap();
    let record: EncodedRecord = [("LivingArea", 120.0), ("PEB_B", 1.0)].into_iter().collect();

    assert_eq!(align(&record, &schema).to_vec(), vec![120.0, 1.0, 0.0, 0.0]);
}

#[test]
fn test_schema_stability() {
    let csv = common::training_csv(30);
    let first = TrainingDataset::from_reader(csv.as_bytes(), "Price").unwrap();
    let second = TrainingDataset::from_reader(csv.as_bytes(), "Price").unwrap();

    let a = SchemaBuilder::new().build(first.features()).unwrap();
    let b = SchemaBuilder::new().build(second.features()).unwrap();
    assert_eq!(a.schema, b.schema);
}

#[test]
fn test_scaler_fit_is_idempotent_and_transform_is_pure() {
    let ds = TrainingDataset::from_reader(common::training_csv(30).as_bytes(), "Price").unwrap();
    let fit = SchemaBuilder::new().build(ds.features()).unwrap();

    let mut once = ScalerAdapter::new();
    once.fit(&fit.encoded, &fit.schema).unwrap();
    let mut twice = ScalerAdapter::new();
    twice.fit(&fit.encoded, &fit.schema).unwrap();
    twice.fit(&fit.encoded, &fit.schema).unwrap();
    assert_eq!(once.fitted(), twice.fitted());

    let record = InferenceRecord::new()
        .with("LivingArea", 150_i64)
        .with("PEB", "PEB_C");
    let aligned = align(&fit.encoder.encode_record(&record).unwrap(), &fit.schema);
    let before = once.fitted().cloned();
    let first = once.transform(&aligned).unwrap();
    let second = once.transform(&aligned).unwrap();
    assert_eq!(first, second);
    assert_eq!(once.fitted().cloned(), before);

    // Standardized training columns have zero mean.
    let scaled_living = fit
        .encoded
        .column("LivingArea")
        .unwrap()
        .mapv(|v| {
            let fitted = once.fitted().unwrap();
            let idx = fit.schema.position("LivingArea").unwrap();
            (v - fitted.mean()[idx]) / fitted.std()[idx]
        });
    assert_abs_diff_eq!(scaled_living.mean().unwrap(), 0.0, epsilon = 1e-9);
}
