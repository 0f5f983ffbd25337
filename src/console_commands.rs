use crate::classifier::trained_model::TrainingSummary;
use crate::classifier::trainer::Trainer;
use crate::config::Config;
use crate::dataset::loader::DatasetLoader;
use crate::device_camera::interface::DeviceCamera;
use crate::device_display::impl_console::DeviceDisplayConsole;
use crate::device_display::impl_gui::DeviceDisplayGui;
use crate::device_display::interface::DeviceDisplay;
use crate::error::Result;
use crate::feature_extractor::impl_tract_onnx::ScorerTractOnnx;
use crate::feature_extractor::interface::Scorer;
use crate::image_classifier::inference_engine::InferenceEngine;
use crate::library::logger::interface::Logger;
use crate::model_store::model_storage::ModelStore;
use crate::preprocess::settings::{PreprocessSettings, IMAGE_HEIGHT, IMAGE_WIDTH};
use crate::realtime::run::{RealtimeLoop, RealtimeReport};
use crate::realtime::stop_signal::{EnterListener, StopSignal};
use std::path::Path;
use std::sync::Arc;

/// The two operator commands: train a model from a labelled directory, and
/// run live detection with the saved model.
pub struct ConsoleCommands {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    scorer: Option<Arc<dyn Scorer>>,
}

impl ConsoleCommands {
    pub fn new(config: Config, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            config,
            logger,
            scorer: None,
        }
    }

    /// Uses `scorer` instead of loading the network named in the config.
    #[allow(dead_code)]
    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    fn scorer(&self) -> Result<Arc<dyn Scorer>> {
        match &self.scorer {
            Some(scorer) => Ok(scorer.clone()),
            None => Ok(Arc::new(ScorerTractOnnx::new(
                &self.config.feature_extractor,
                (IMAGE_WIDTH as usize, IMAGE_HEIGHT as usize),
                self.logger.clone(),
            )?)),
        }
    }

    pub fn train(&self, dataset_path: &Path) -> Result<TrainingSummary> {
        println!("Starting custom model training...");

        let dataset = DatasetLoader::new(self.config.dataset_extensions.clone(), self.logger.clone())
            .load(dataset_path)?;

        let trainer = Trainer::new(
            PreprocessSettings::default(),
            self.scorer()?,
            self.config.trainer.clone(),
            self.logger.clone(),
        );
        let model = trainer.train(&dataset)?;

        ModelStore::new(self.logger.clone()).save(&model, &self.config.model_path)?;

        println!("Custom model training done.");
        println!(
            "{} samples, {:.1}% training accuracy, saved to {:?}",
            model.summary.samples,
            model.summary.training_accuracy * 100.0,
            self.config.model_path
        );

        Ok(model.summary)
    }

    /// Streams until the camera runs dry or the operator presses Enter, then
    /// waits for one more Enter before returning.
    pub fn test(&self, use_gui: bool) -> Result<RealtimeReport> {
        println!("Starting Falling Detector...");

        let stop_signal = StopSignal::new();
        let listener = EnterListener::spawn(stop_signal.clone());
        println!("Press Enter to stop.");

        let mut camera = self.camera();
        let result = if use_gui {
            let mut display = DeviceDisplayGui::new(stop_signal.clone());
            self.stream(camera.as_mut(), &mut display, stop_signal)
        } else {
            let mut display = DeviceDisplayConsole::new();
            self.stream(camera.as_mut(), &mut display, stop_signal)
        };

        match &result {
            Ok(report) => println!(
                "Stopped ({:?}) after {} frames, phases {:?}.",
                report.reason, report.frames_classified, report.phases
            ),
            Err(e) => eprintln!("{}", e),
        }

        listener.drain();
        println!("Press Enter to exit.");
        listener.wait();

        result
    }

    pub fn stream(
        &self,
        camera: &mut dyn DeviceCamera,
        display: &mut dyn DeviceDisplay,
        stop_signal: StopSignal,
    ) -> Result<RealtimeReport> {
        println!("Loading custom model...");
        let engine = InferenceEngine::load_model(&self.config.model_path, self.scorer()?, self.logger.clone())?;

        RealtimeLoop::new(
            self.config.clone(),
            self.logger.clone(),
            Arc::new(engine),
            stop_signal,
        )
        .run(camera, display)
    }

    #[cfg(feature = "opencv")]
    fn camera(&self) -> Box<dyn DeviceCamera> {
        Box::new(crate::device_camera::impl_opencv::DeviceCameraOpenCv::new(
            self.config.frame_delay(),
            self.logger.clone(),
        ))
    }

    #[cfg(not(feature = "opencv"))]
    fn camera(&self) -> Box<dyn DeviceCamera> {
        Box::new(
            crate::device_camera::impl_image_sequence::DeviceCameraImageSequence::new(
                self.config.frames_directory.clone(),
                self.config.dataset_extensions.clone(),
                self.logger.clone(),
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_camera::impl_fake::DeviceCameraFake;
    use crate::device_display::impl_fake::DeviceDisplayFake;
    use crate::error::ClassifierError;
    use crate::fixture::{synthetic_frame, Fixture, Pose};
    use crate::realtime::core::StopReason;

    fn commands(f: &Fixture) -> ConsoleCommands {
        let config = Config {
            frame_delay_ms: 0,
            ..f.config.clone()
        };
        ConsoleCommands::new(config, f.logger()).with_scorer(f.scorer.clone())
    }

    #[test]
    fn test_train_saves_model_to_configured_path() {
        let f = Fixture::new();

        let summary = commands(&f).train(&f.dataset_path(10)).unwrap();

        assert_eq!(summary.samples, 30);
        assert!(summary.training_accuracy >= 0.9);
        assert!(f.config.model_path.is_file());
    }

    #[test]
    fn test_train_on_missing_dataset_saves_nothing() {
        let f = Fixture::new();

        let result = commands(&f).train(&f.dir.path().join("nowhere"));

        assert!(matches!(result, Err(ClassifierError::Dataset(_))));
        assert!(!f.config.model_path.exists());
    }

    #[test]
    fn test_stream_with_trained_model() {
        let f = Fixture::new();
        let commands = commands(&f);
        commands.train(&f.dataset_path(6)).unwrap();
        let frames = Pose::all()
            .iter()
            .map(|pose| synthetic_frame(*pose, 900))
            .collect();
        let mut camera = DeviceCameraFake::new(f.logger(), frames);
        let mut display = DeviceDisplayFake::new(f.logger());

        let report = commands
            .stream(&mut camera, &mut display, StopSignal::new())
            .unwrap();

        assert_eq!(report.frames_classified, 3);
        assert_eq!(report.reason, StopReason::EndOfStream);
        let renders = f
            .logger
            .lines()
            .into_iter()
            .filter(|l| l.contains("render("))
            .count();
        assert_eq!(renders, 3);
    }

    #[test]
    fn test_stream_without_model_is_not_found() {
        let f = Fixture::new();
        let mut camera = DeviceCameraFake::new(f.logger(), vec![]);
        let mut display = DeviceDisplayFake::new(f.logger());

        let result = commands(&f).stream(&mut camera, &mut display, StopSignal::new());

        assert!(matches!(result, Err(ClassifierError::ModelNotFound(_))));
    }
}
