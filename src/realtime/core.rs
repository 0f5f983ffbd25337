/// The loop's lifecycle. `Stopped` is terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Idle,
    Streaming { frames_classified: usize },
    Stopped {
        reason: StopReason,
        frames_classified: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    EndOfStream,
    Cancelled,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Streaming,
    Stopped,
}

impl State {
    pub fn phase(&self) -> Phase {
        match self {
            State::Idle => Phase::Idle,
            State::Streaming { .. } => Phase::Streaming,
            State::Stopped { .. } => Phase::Stopped,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    DevicesOpened,
    DevicesFailed(String),
    StopRequested,
    FrameCaptured,
    EndOfStream,
    FrameFailed(String),
    FrameRendered,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    OpenDevices,
    CaptureFrame,
    ClassifyAndRender,
    WaitFrameDelay,
    ReleaseDevices,
}

pub fn init() -> (State, Vec<Effect>) {
    (State::Idle, vec![Effect::OpenDevices])
}

pub fn transition(state: State, event: Event) -> (State, Vec<Effect>) {
    match (state, event) {
        (State::Idle, Event::DevicesOpened) => (
            State::Streaming {
                frames_classified: 0,
            },
            vec![Effect::CaptureFrame],
        ),
        // Nothing was acquired, so there is nothing to release.
        (State::Idle, Event::DevicesFailed(_)) => (State::Idle, vec![]),

        (state @ State::Streaming { .. }, Event::FrameCaptured) => {
            (state, vec![Effect::ClassifyAndRender])
        }
        (State::Streaming { frames_classified }, Event::FrameRendered) => (
            State::Streaming {
                frames_classified: frames_classified + 1,
            },
            vec![Effect::WaitFrameDelay, Effect::CaptureFrame],
        ),
        (State::Streaming { frames_classified }, Event::EndOfStream) => (
            State::Stopped {
                reason: StopReason::EndOfStream,
                frames_classified,
            },
            vec![Effect::ReleaseDevices],
        ),
        (State::Streaming { frames_classified }, Event::StopRequested) => (
            State::Stopped {
                reason: StopReason::Cancelled,
                frames_classified,
            },
            vec![Effect::ReleaseDevices],
        ),
        (State::Streaming { frames_classified }, Event::FrameFailed(message)) => (
            State::Stopped {
                reason: StopReason::Failed(message),
                frames_classified,
            },
            vec![Effect::ReleaseDevices],
        ),

        (state, _) => (state, vec![]),
    }
}
