use crate::config::Config;
use crate::device_camera::interface::DeviceCamera;
use crate::device_display::interface::DeviceDisplay;
use crate::error::{ClassifierError, Result};
use crate::image_classifier::interface::ImageClassifier;
use crate::library::logger::interface::Logger;
use crate::realtime::core::{init, transition, Effect, Event, Phase, State, StopReason};
use crate::realtime::indicator::IndicatorMap;
use crate::realtime::stop_signal::StopSignal;
use image::DynamicImage;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeReport {
    pub phases: Vec<Phase>,
    pub frames_classified: usize,
    pub reason: StopReason,
}

/// Holds the camera and display for one streaming session and gives both
/// back when dropped, whichever way the loop exits.
struct Session<'a> {
    camera: &'a mut dyn DeviceCamera,
    display: &'a mut dyn DeviceDisplay,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl<'a> Session<'a> {
    fn open(
        camera: &'a mut dyn DeviceCamera,
        display: &'a mut dyn DeviceDisplay,
        device_index: i32,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self> {
        camera
            .open(device_index)
            .map_err(|e| ClassifierError::DeviceUnavailable {
                device_index,
                reason: e.to_string(),
            })?;

        if let Err(e) = display.open() {
            if let Err(release_error) = camera.release() {
                let _ = logger.error(&format!("Failed to release camera: {}", release_error));
            }
            return Err(ClassifierError::Display(e.to_string()));
        }

        Ok(Self {
            camera,
            display,
            logger,
        })
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.display.close() {
            let _ = self.logger.error(&format!("Failed to close display: {}", e));
        }
        if let Err(e) = self.camera.release() {
            let _ = self.logger.error(&format!("Failed to release camera: {}", e));
        }
        let _ = self.logger.info("Devices released");
    }
}

pub struct RealtimeLoop {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    image_classifier: Arc<dyn ImageClassifier>,
    indicators: IndicatorMap,
    stop_signal: StopSignal,
    state: Mutex<State>,
}

impl RealtimeLoop {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        image_classifier: Arc<dyn ImageClassifier>,
        stop_signal: StopSignal,
    ) -> Self {
        Self {
            indicators: IndicatorMap::new(&config.indicators),
            config,
            logger: logger.with_namespace("realtime"),
            image_classifier,
            stop_signal,
            state: Mutex::new(State::Idle),
        }
    }

    /// The state reached by the most recent `run`.
    #[allow(dead_code)]
    pub fn state(&self) -> State {
        self.state
            .lock()
            .map(|state| state.clone())
            .unwrap_or(State::Idle)
    }

    /// Streams from `camera` to `display` until the stream ends, the stop
    /// signal fires, or a frame fails. Blocks the calling thread.
    pub fn run(
        &self,
        camera: &mut dyn DeviceCamera,
        display: &mut dyn DeviceDisplay,
    ) -> Result<RealtimeReport> {
        let (mut state, effects) = init();
        if let Ok(mut shared) = self.state.lock() {
            *shared = state.clone();
        }
        let mut phases = vec![state.phase()];
        let mut pending: VecDeque<Effect> = effects.into();

        let mut devices = Some((camera, display));
        let mut session: Option<Session> = None;
        let mut frame: Option<DynamicImage> = None;
        let mut failure: Option<ClassifierError> = None;

        while let Some(effect) = pending.pop_front() {
            let event = match effect {
                Effect::OpenDevices => match devices.take() {
                    Some((camera, display)) => match Session::open(
                        camera,
                        display,
                        self.config.device_index,
                        self.logger.clone(),
                    ) {
                        Ok(opened) => {
                            session = Some(opened);
                            Some(Event::DevicesOpened)
                        }
                        Err(e) => {
                            let message = e.to_string();
                            failure = Some(e);
                            Some(Event::DevicesFailed(message))
                        }
                    },
                    None => None,
                },

                Effect::CaptureFrame => match session.as_mut() {
                    _ if self.stop_signal.is_triggered() => Some(Event::StopRequested),
                    Some(session) => match session.camera.capture_frame() {
                        Ok(Some(captured)) => {
                            frame = Some(captured);
                            Some(Event::FrameCaptured)
                        }
                        Ok(None) => Some(Event::EndOfStream),
                        Err(e) => {
                            let error = ClassifierError::Frame(e.to_string());
                            let message = error.to_string();
                            failure = Some(error);
                            Some(Event::FrameFailed(message))
                        }
                    },
                    None => None,
                },

                Effect::ClassifyAndRender => match (session.as_mut(), frame.take()) {
                    (Some(session), Some(captured)) => match self.classify_and_render(session, &captured) {
                        Ok(()) => Some(Event::FrameRendered),
                        Err(e) => {
                            let message = e.to_string();
                            failure = Some(e);
                            Some(Event::FrameFailed(message))
                        }
                    },
                    _ => None,
                },

                Effect::WaitFrameDelay => {
                    std::thread::sleep(self.config.frame_delay());
                    None
                }

                Effect::ReleaseDevices => {
                    session = None;
                    None
                }
            };

            if let Some(event) = event {
                let (next, effects) = transition(state, event);
                if phases.last() != Some(&next.phase()) {
                    let _ = self.logger.info(&format!("{:?}", next));
                    phases.push(next.phase());
                }
                if let Ok(mut shared) = self.state.lock() {
                    *shared = next.clone();
                }
                state = next;
                pending.extend(effects);
            }
        }

        drop(session);

        if let Some(error) = failure {
            let _ = self.logger.error(&error.to_string());
            return Err(error);
        }

        match state {
            State::Stopped {
                reason,
                frames_classified,
            } => Ok(RealtimeReport {
                phases,
                frames_classified,
                reason,
            }),
            other => Err(ClassifierError::Frame(format!(
                "realtime loop ended in {:?}",
                other
            ))),
        }
    }

    fn classify_and_render(&self, session: &mut Session, frame: &DynamicImage) -> Result<()> {
        let prediction = self.image_classifier.classify(frame)?;
        let indicator = self.indicators.lookup(&prediction.predicted_label);

        let _ = self.logger.info(&format!(
            "Detected: {} {:?}",
            prediction.predicted_label, prediction.scores
        ));

        session
            .display
            .render(frame, &indicator)
            .map_err(|e| ClassifierError::Display(e.to_string()))
    }
}
