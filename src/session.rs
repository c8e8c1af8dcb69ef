use log::{debug, info, warn};
use serde::Serialize;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;

use crate::models::ValidatedMrz;
use crate::processing::{Frame, TextRecognizer};
use crate::scanner::MrzScanner;
use crate::utils::{ErrorKind, ScanError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    FrameInFlight,
    Completed,
    Failed,
    Stopped,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Stopped
        )
    }
}

/// What `submit` did with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    /// A frame is still being recognized; this one was dropped.
    Throttled,
    /// The session has a result, failed or was stopped.
    Closed,
}

/// Receives the single terminal event of a session. Called from a runtime
/// worker thread. Once `ScanSession::stop` has returned no callback runs, and
/// a callback may itself call `stop`.
pub trait ResultListener: Send + Sync + 'static {
    fn on_success(&self, mrz: ValidatedMrz);
    fn on_error(&self, kind: ErrorKind, message: String);
}

struct SessionInner<R> {
    recognizer: R,
    scanner: MrzScanner,
    listener: Arc<dyn ResultListener>,
    commit_delay: Duration,
    runtime: Handle,
    throttled: AtomicBool,
    // Set once by whichever terminal event wins, success or failure
    result_committed: AtomicBool,
    stopped: AtomicBool,
    state: Mutex<SessionState>,
    // Held while a listener callback runs; `stop` waits on it
    dispatch: Mutex<()>,
}

thread_local! {
    // Address of the dispatch lock this thread is calling a listener under
    static DISPATCHING: Cell<usize> = Cell::new(0);
}

struct DispatchMark;

impl DispatchMark {
    fn enter(lock: &Mutex<()>) -> Self {
        DISPATCHING.with(|current| current.set(lock as *const Mutex<()> as usize));
        DispatchMark
    }

    fn is_set(lock: &Mutex<()>) -> bool {
        DISPATCHING.with(|current| current.get() == lock as *const Mutex<()> as usize)
    }
}

impl Drop for DispatchMark {
    fn drop(&mut self) {
        DISPATCHING.with(|current| current.set(0));
    }
}

/// One scanning session: frames go in, exactly one validated MRZ or one
/// error comes out through the listener.
pub struct ScanSession<R: TextRecognizer> {
    inner: Arc<SessionInner<R>>,
}

impl<R: TextRecognizer> Clone for ScanSession<R> {
    fn clone(&self) -> Self {
        ScanSession {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: TextRecognizer> ScanSession<R> {
    /// Must be called from within a tokio runtime. Frames are processed on
    /// that runtime, so `submit` itself can be called from any thread.
    pub fn new(
        recognizer: R,
        scanner: MrzScanner,
        listener: Arc<dyn ResultListener>,
        commit_delay: Duration,
    ) -> Result<Self, ScanError> {
        let runtime = Handle::try_current().map_err(|e| {
            ScanError::Runtime(format!("scan session needs a tokio runtime: {}", e))
        })?;

        info!(
            "Scan session started with {} recognizer, commit delay {:?}",
            recognizer.name(),
            commit_delay
        );

        Ok(ScanSession {
            inner: Arc::new(SessionInner {
                recognizer,
                scanner,
                listener,
                commit_delay,
                runtime,
                throttled: AtomicBool::new(false),
                result_committed: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
                state: Mutex::new(SessionState::Idle),
                dispatch: Mutex::new(()),
            }),
        })
    }

    /// Hand a frame to the session without waiting for it to be processed.
    pub fn submit(&self, frame: Frame) -> Admission {
        let inner = &self.inner;
        if inner.is_closed() {
            return Admission::Closed;
        }

        if inner.throttled.swap(true, Ordering::AcqRel) {
            return Admission::Throttled;
        }

        // Stop or commit may have landed between the two checks
        if inner.is_closed() {
            inner.throttled.store(false, Ordering::Release);
            return Admission::Closed;
        }

        inner.set_state(SessionState::FrameInFlight);
        let task = Arc::clone(inner);
        inner.runtime.spawn(async move {
            task.run_frame(frame).await;
        });

        Admission::Accepted
    }

    /// Stop the session. Safe to call from any thread at any time; a result
    /// still waiting out its commit delay is never delivered. If a listener
    /// callback is already running on another thread this waits for it.
    pub fn stop(&self) {
        let inner = &self.inner;
        if !inner.stopped.swap(true, Ordering::SeqCst) {
            info!("Scan session stopped");
        }

        if !DispatchMark::is_set(&inner.dispatch) {
            drop(inner.lock_dispatch());
        }
        inner.force_state(SessionState::Stopped);
    }

    pub fn state(&self) -> SessionState {
        *self.inner.lock_state()
    }

    pub fn is_throttled(&self) -> bool {
        self.inner.throttled.load(Ordering::Acquire)
    }
}

impl<R: TextRecognizer> SessionInner<R> {
    async fn run_frame(self: Arc<Self>, frame: Frame) {
        let text = match self.recognizer.recognize(&frame).await {
            Ok(text) => text,
            Err(e) => {
                self.fail(e);
                return;
            }
        };

        if self.is_closed() {
            debug!("Frame finished after the session closed, dropping it");
            self.finish_frame(SessionState::Idle);
            return;
        }

        match self.scanner.process(&text).into_validated() {
            Some(mrz) => self.commit(mrz).await,
            None => self.finish_frame(SessionState::Idle),
        }
    }

    async fn commit(&self, mrz: ValidatedMrz) {
        if self
            .result_committed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("{} result arrived after commit, discarding", mrz.format());
            self.finish_frame(SessionState::Idle);
            return;
        }

        self.finish_frame(SessionState::Completed);
        info!("{} MRZ accepted, delivering in {:?}", mrz.format(), self.commit_delay);

        tokio::time::sleep(self.commit_delay).await;

        let format = mrz.format();
        if !self.deliver(|listener| listener.on_success(mrz)) {
            debug!("Session stopped before the {} result was delivered", format);
        }
    }

    fn fail(&self, error: ScanError) {
        if self.stopped.load(Ordering::SeqCst) {
            debug!("Recognizer error after stop ignored: {}", error);
            self.finish_frame(SessionState::Idle);
            return;
        }

        if self
            .result_committed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Recognizer error after commit ignored: {}", error);
            self.finish_frame(SessionState::Idle);
            return;
        }

        warn!("Scan session failed: {}", error);
        self.finish_frame(SessionState::Failed);
        if !self.deliver(|listener| listener.on_error(error.kind(), error.to_string())) {
            debug!("Session stopped before the failure was delivered");
        }
    }

    /// Call the listener unless the session was stopped. Returns whether it
    /// was called.
    fn deliver<F>(&self, notify: F) -> bool
    where
        F: FnOnce(&dyn ResultListener),
    {
        let _dispatch = self.lock_dispatch();
        if self.stopped.load(Ordering::SeqCst) {
            return false;
        }

        let _mark = DispatchMark::enter(&self.dispatch);
        notify(self.listener.as_ref());
        true
    }

    /// Release the throttle and leave the in-flight state in one step, so a
    /// frame admitted right after cannot have its state overwritten.
    fn finish_frame(&self, next: SessionState) {
        let mut state = self.lock_state();
        self.throttled.store(false, Ordering::Release);
        if !state.is_terminal() {
            *state = next;
        }
    }

    fn is_closed(&self) -> bool {
        self.stopped.load(Ordering::SeqCst) || self.result_committed.load(Ordering::Acquire)
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_dispatch(&self) -> MutexGuard<'_, ()> {
        self.dispatch.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Terminal states only change to `Stopped`.
    fn set_state(&self, next: SessionState) {
        let mut state = self.lock_state();
        if !state.is_terminal() {
            *state = next;
        }
    }

    fn force_state(&self, next: SessionState) {
        *self.lock_state() = next;
    }
}
