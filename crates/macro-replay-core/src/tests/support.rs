//! Fakes standing in for OS capture and injection.

#![allow(clippy::unwrap_used)]

use crate::{
    CaptureSource, Captured, Clock, EngineError, EngineResult, InjectionError, InjectorFactory,
    InputInjector, RawInput, model::Event,
};

use std::{
    panic::Location,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crossbeam_channel::Sender;
use error_location::ErrorLocation;
use uuid::Uuid;

/// Capture source fed by the test instead of an OS hook.
#[derive(Default)]
pub(crate) struct ChannelCapture {
    sink: Mutex<Option<Sender<Captured>>>,
    refusal: Option<String>,
}

impl ChannelCapture {
    pub(crate) fn refusing(reason: &str) -> Self {
        Self {
            sink: Mutex::new(None),
            refusal: Some(reason.to_string()),
        }
    }

    /// Deliver `input` stamped `at_ms` on the capture clock. False when nobody
    /// is subscribed.
    pub(crate) fn emit(&self, at_ms: u64, input: RawInput) -> bool {
        let sink = self.sink.lock().unwrap().clone();
        match sink {
            Some(sink) => sink
                .send(Captured {
                    at: Duration::from_millis(at_ms),
                    input,
                })
                .is_ok(),
            None => false,
        }
    }

    pub(crate) fn is_subscribed(&self) -> bool {
        self.sink.lock().unwrap().is_some()
    }
}

impl CaptureSource for ChannelCapture {
    fn subscribe(&self, sink: Sender<Captured>) -> EngineResult<()> {
        if let Some(reason) = &self.refusal {
            return Err(EngineError::CaptureUnavailable {
                reason: reason.clone(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        *self.sink.lock().unwrap() = Some(sink);
        Ok(())
    }

    fn unsubscribe(&self) {
        self.sink.lock().unwrap().take();
    }
}

/// An injection as observed by [`RecordingInjector`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Injected {
    pub(crate) at: Duration,
    pub(crate) event: Event,
}

pub(crate) type InjectionLog = Arc<Mutex<Vec<Injected>>>;

/// Called after each successful injection with the running total.
pub(crate) type AfterInject = Arc<dyn Fn(usize) + Send + Sync>;

/// Behaviour knobs for [`RecordingInjector`].
#[derive(Clone, Default)]
pub(crate) struct InjectorScript {
    /// Refuse the injection with this 0-based running index.
    pub(crate) fail_at: Option<usize>,
    pub(crate) after_inject: Option<AfterInject>,
}

/// Logs every event with the clock reading at injection time.
pub(crate) struct RecordingInjector {
    clock: Arc<dyn Clock>,
    log: InjectionLog,
    script: InjectorScript,
}

impl InputInjector for RecordingInjector {
    fn inject(&mut self, event: &Event) -> Result<(), InjectionError> {
        let count = {
            let mut log = self.log.lock().unwrap();
            if self.script.fail_at == Some(log.len()) {
                return Err(InjectionError::new("synthetic failure"));
            }
            log.push(Injected {
                at: self.clock.now(),
                event: event.clone(),
            });
            log.len()
        };

        if let Some(hook) = &self.script.after_inject {
            hook(count);
        }
        Ok(())
    }
}

pub(crate) fn recording_factory(
    clock: Arc<dyn Clock>,
    log: InjectionLog,
    script: InjectorScript,
) -> Arc<dyn InjectorFactory> {
    Arc::new(move || -> EngineResult<Box<dyn InputInjector>> {
        Ok(Box::new(RecordingInjector {
            clock: Arc::clone(&clock),
            log: Arc::clone(&log),
            script: script.clone(),
        }))
    })
}

pub(crate) fn unavailable_factory() -> Arc<dyn InjectorFactory> {
    Arc::new(|| -> EngineResult<Box<dyn InputInjector>> {
        Err(EngineError::InjectorUnavailable {
            reason: "no display".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    })
}

pub(crate) fn click(t: f64, x: i32, y: i32, pressed: bool) -> Event {
    Event::MouseClick {
        t,
        x,
        y,
        button: crate::MouseButton::Left,
        pressed,
    }
}

pub(crate) fn key_press(t: f64, key: &str) -> Event {
    Event::KeyPress {
        t,
        key: key.to_string(),
    }
}

pub(crate) fn key_release(t: f64, key: &str) -> Event {
    Event::KeyRelease {
        t,
        key: key.to_string(),
    }
}

pub(crate) fn mouse_move(t: f64, x: i32, y: i32) -> Event {
    Event::MouseMove { t, x, y }
}

/// Poll `condition` until it holds or `timeout` elapses.
pub(crate) fn wait_for(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Fresh directory under the system temp dir.
pub(crate) fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("macro-replay-test-{}", Uuid::new_v4()))
}
