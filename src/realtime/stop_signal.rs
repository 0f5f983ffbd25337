use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

/// Shared flag asking the realtime loop to stop. The loop checks it once
/// per frame cycle.
#[derive(Clone, Default)]
pub struct StopSignal {
    triggered: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}

/// Reads stdin on a background thread. Every Enter triggers the stop signal
/// and is queued so the console can also wait for a final acknowledgment.
pub struct EnterListener {
    presses: Receiver<()>,
}

impl EnterListener {
    pub fn spawn(signal: StopSignal) -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                if line.is_err() {
                    break;
                }
                signal.trigger();
                if tx.send(()).is_err() {
                    break;
                }
            }
        });

        Self { presses: rx }
    }

    /// Forgets presses already consumed as a stop request.
    pub fn drain(&self) {
        while self.presses.try_recv().is_ok() {}
    }

    /// Blocks until the next Enter, or returns at once if stdin is closed.
    pub fn wait(&self) {
        let _ = self.presses.recv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_flag() {
        let signal = StopSignal::new();
        let other = signal.clone();

        assert!(!signal.is_triggered());
        other.trigger();

        assert!(signal.is_triggered());
    }

    #[test]
    fn test_trigger_from_another_thread() {
        let signal = StopSignal::new();
        let remote = signal.clone();

        std::thread::spawn(move || remote.trigger()).join().unwrap();

        assert!(signal.is_triggered());
    }
}
