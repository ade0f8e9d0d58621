#![allow(dead_code)]

use price_estimator::model::{LinearParams, ModelArtifact, ModelParams};
use price_estimator::schema::SchemaBuilder;
use price_estimator::{Config, FeatureSchema, TrainingDataset};
use std::fmt::Write as _;
use std::path::Path;

pub const HEADER: &str = "PostalCode,BathroomCount,BedroomCount,ConstructionYear,NumberOfFacades,\
SurfaceOfPlot,LivingArea,GardenArea,SwimmingPool,Terrace,Fireplace,Furnished,ToiletCount,\
RoomCount,PEB,StateOfBuilding,Price";

const PEB: [&str; 6] = ["A", "B", "C", "D", "E", "F"];
const STATES: [&str; 4] = ["AS_NEW", "GOOD", "TO_RENOVATE", "JUST_RENOVATED"];

/// Deterministic listings covering every form field.
pub fn training_csv(rows: usize) -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for i in 0..rows {
        let living = 60 + (i * 37) % 240;
        let price = 50_000 + living * 1_900 + (i % 5) * 7_500;
        writeln!(
            csv,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            1000 + (i * 131) % 8000,
            1 + i % 3,
            1 + i % 5,
            1900 + (i * 7) % 120,
            2 + i % 3,
            100 + (i * 53) % 900,
            living,
            (i * 17) % 300,
            i % 7 == 0,
            i % 2,
            i % 4 == 1,
            0,
            1 + i % 2,
            3 + i % 8,
            PEB[i % PEB.len()],
            STATES[i % STATES.len()],
            price,
        )
        .unwrap();
    }
    csv
}

pub fn derive_schema(data: &Path) -> FeatureSchema {
    let dataset = TrainingDataset::load(data, "Price").unwrap();
    SchemaBuilder::new().build(dataset.features()).unwrap().schema
}

/// Write `artifact` named `name` into `dir`, with weights for `schema`.
pub fn write_artifact(dir: &Path, name: &str, schema: &FeatureSchema) {
    let weights: Vec<f64> = (0..schema.len()).map(|i| 1_000.0 * (i as f64 + 1.0)).collect();
    ModelArtifact::new(ModelParams::Linear(LinearParams {
        weights,
        bias: 250_000.0,
    }))
    .with_feature_names(schema.iter())
    .save_to_file(dir.join(name))
    .unwrap();
}

/// Training data plus one matching model artifact in `dir`.
pub fn fixture(dir: &Path) -> Config {
    let data = dir.join("cleaned_data.csv");
    std::fs::write(&data, training_csv(40)).unwrap();
    let schema = derive_schema(&data);
    write_artifact(dir, "model.bin", &schema);

    Config::default().with_data_path(data).with_model_dir(dir)
}
