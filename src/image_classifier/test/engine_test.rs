use crate::classifier::trained_model::TrainedModel;
use crate::classifier::trainer::{Trainer, TrainerConfig};
use crate::dataset::loader::DatasetLoader;
use crate::error::ClassifierError;
use crate::feature_extractor::impl_fake::ScorerFake;
use crate::fixture::{synthetic_frame, Fixture, Pose};
use crate::image_classifier::inference_engine::InferenceEngine;
use crate::image_classifier::interface::ImageClassifier;
use crate::model_store::model_storage::ModelStore;
use crate::preprocess::settings::PreprocessSettings;
use image::{DynamicImage, ImageBuffer, Rgb};
use std::sync::Arc;

fn trained(f: &Fixture) -> TrainedModel {
    let dataset = DatasetLoader::new(vec!["jpg".to_string()], f.logger())
        .load(&f.dataset_path(6))
        .unwrap();
    Trainer::new(
        PreprocessSettings::default(),
        f.scorer.clone(),
        TrainerConfig::default(),
        f.logger(),
    )
    .train(&dataset)
    .unwrap()
}

fn held_out() -> Vec<DynamicImage> {
    Pose::all()
        .iter()
        .flat_map(|pose| (500..503).map(move |seed| synthetic_frame(*pose, seed)))
        .collect()
}

#[test]
fn test_loaded_model_classifies_like_the_trained_one() {
    let f = Fixture::new();
    let model = trained(&f);
    ModelStore::new(f.logger()).save(&model, &f.config.model_path).unwrap();
    let in_memory = InferenceEngine::new(model, f.scorer.clone()).unwrap();

    let loaded =
        InferenceEngine::load_model(&f.config.model_path, f.scorer.clone(), f.logger()).unwrap();

    for image in held_out() {
        assert_eq!(
            in_memory.classify(&image).unwrap(),
            loaded.classify(&image).unwrap()
        );
    }
}

#[test]
fn test_classify_is_idempotent() {
    let f = Fixture::new();
    let engine = InferenceEngine::new(trained(&f), f.scorer.clone()).unwrap();
    let image = synthetic_frame(Pose::Falling, 42);

    let first = engine.classify(&image).unwrap();

    for _ in 0..10 {
        assert_eq!(engine.classify(&image).unwrap(), first);
    }
}

#[test]
fn test_predictions_stay_within_trained_labels() {
    let f = Fixture::new();
    let engine = InferenceEngine::new(trained(&f), f.scorer.clone()).unwrap();

    for image in held_out() {
        let prediction = engine.classify(&image).unwrap();
        assert!(engine.labels().contains(&prediction.predicted_label));
        assert_eq!(prediction.scores.len(), 3);
    }
}

#[test]
fn test_ambiguous_image_still_gets_a_known_label() {
    let f = Fixture::new();
    let engine = InferenceEngine::new(trained(&f), f.scorer.clone()).unwrap();
    let grey = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(33, 91, Rgb([117, 117, 117])));

    let prediction = engine.classify(&grey).unwrap();

    assert!(!prediction.predicted_label.is_empty());
    assert!(engine.labels().contains(&prediction.predicted_label));
}

#[test]
fn test_classify_is_safe_to_share_across_threads() {
    let f = Fixture::new();
    let engine = Arc::new(InferenceEngine::new(trained(&f), f.scorer.clone()).unwrap());
    let image = synthetic_frame(Pose::Standing, 77);
    let expected = engine.classify(&image).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            let image = image.clone();
            std::thread::spawn(move || engine.classify(&image).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_scorer_with_different_output_layer_is_rejected() {
    let f = Fixture::new();
    let model = trained(&f);
    let other = Arc::new(ScorerFake::new(4).with_output_layer("mixed4"));

    let result = InferenceEngine::new(model, other);

    assert!(matches!(result, Err(ClassifierError::ModelCorrupt(_))));
}

#[test]
fn test_missing_model_is_not_found() {
    let f = Fixture::new();

    let result = InferenceEngine::load_model(&f.config.model_path, f.scorer.clone(), f.logger());

    assert!(matches!(result, Err(ClassifierError::ModelNotFound(_))));
}
