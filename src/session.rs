use std::fmt::Display;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::Notify;

use crate::detect::{FieldPointer, detect_active_field};
use crate::draft::RecipeDraft;
use crate::error::SessionError;
use crate::options::Options;
use crate::repair::{attempt_parse, exact_parse};

/// Where the engine writes its output. Owned by the consumer, not the engine.
///
/// `set_draft` fully replaces the externally observed draft — the engine
/// never performs partial or merge writes. `set_active_field` publishes the
/// field the presentation layer should scroll to and focus; `None` means the
/// previous pointer's UI effect should not be repeated.
#[async_trait]
pub trait DraftSink: Send {
    async fn set_draft(&mut self, draft: RecipeDraft);
    async fn set_active_field(&mut self, field: Option<FieldPointer>);
}

/// Lifecycle of one generation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Streaming,
    Finalizing,
    Completed,
    Failed,
    Cancelled,
}

/// The single terminal notification of a session: the final draft, a
/// human-readable failure reason, or consumer-initiated cancellation.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Completed(RecipeDraft),
    Failed(String),
    Cancelled,
}

#[derive(Default)]
struct CancelInner {
    flag: AtomicBool,
    notify: Notify,
}

/// Cloneable handle that aborts a session cooperatively.
///
/// `cancel` is idempotent and safe to call after the session has already
/// reached a terminal state. The session checks the flag before processing
/// each chunk and races the notification against the pending stream read, so
/// an in-flight await is abandoned promptly.
#[derive(Clone, Default)]
pub struct CancelHandle {
    inner: Arc<CancelInner>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        if !self.inner.flag.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        // Registered first, then re-checked: a cancel landing in between is
        // caught by the flag, one landing after wakes the waiter.
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// Tracks the in-flight session of one consumer context. Exactly one session
/// may be active per context: registering a new one implicitly cancels the
/// previous one, and closing the context cancels whatever is left.
#[derive(Default)]
pub struct SessionSlot {
    active: Option<CancelHandle>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt `handle` as the active session, cancelling any prior one.
    pub fn replace(&mut self, handle: CancelHandle) {
        if let Some(prev) = self.active.take() {
            prev.cancel();
        }
        self.active = Some(handle);
    }

    pub fn cancel_active(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.cancel();
        }
    }
}

/// Append-only text accumulator tolerating UTF-8 sequences split across chunk
/// boundaries: the valid prefix of each chunk is decoded immediately, an
/// incomplete trailing sequence is carried into the next chunk.
#[derive(Default)]
struct TextAccumulator {
    text: String,
    carry: Vec<u8>,
}

impl TextAccumulator {
    fn push_bytes(&mut self, chunk: &[u8]) -> Result<(), SessionError> {
        self.carry.extend_from_slice(chunk);
        let pending = std::mem::take(&mut self.carry);
        match std::str::from_utf8(&pending) {
            Ok(s) => self.text.push_str(s),
            Err(e) => {
                if e.error_len().is_some() {
                    return Err(SessionError::InvalidUtf8);
                }
                let valid = e.valid_up_to();
                self.text.push_str(
                    std::str::from_utf8(&pending[..valid])
                        .map_err(|_| SessionError::InvalidUtf8)?,
                );
                self.carry = pending[valid..].to_vec();
            }
        }
        Ok(())
    }

    fn text(&self) -> &str {
        &self.text
    }
}

/// Drives one generation session: owns the accumulated text and the latest
/// successful candidate, invokes the repair parser and change detector after
/// every chunk, and performs the authoritative parse once the stream ends.
///
/// Chunk handling is strictly sequential — the write/publish step for chunk
/// *n* completes before chunk *n+1* is read — so no synchronization is needed
/// around the accumulator or the previous candidate.
pub struct StreamSession<S: DraftSink> {
    opts: Options,
    sink: S,
    cancel: CancelHandle,
    state: SessionState,
    acc: TextAccumulator,
    candidate: Option<RecipeDraft>,
}

impl<S: DraftSink> StreamSession<S> {
    pub fn new(sink: S, opts: Options) -> Self {
        Self {
            opts,
            sink,
            cancel: CancelHandle::new(),
            state: SessionState::Idle,
            acc: TextAccumulator::default(),
            candidate: None,
        }
    }

    /// Handle for cancelling this session from the consumer side.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Consume the byte stream to its end (or until error/cancellation) and
    /// return the session's single terminal notification.
    pub async fn run<St, E>(mut self, mut stream: St) -> SessionOutcome
    where
        St: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        self.set_state(SessionState::Streaming);
        let cancel = self.cancel.clone();
        loop {
            if cancel.is_cancelled() {
                return self.cancelled();
            }
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.cancelled(),
                item = stream.next() => item,
            };
            match next {
                None => break,
                Some(Err(e)) => {
                    return self.failed(SessionError::Transport(e.to_string())).await;
                }
                Some(Ok(chunk)) => {
                    if let Err(err) = self.acc.push_bytes(&chunk) {
                        return self.failed(err).await;
                    }
                    self.process_snapshot().await;
                }
            }
        }
        self.finalize().await
    }

    /// One repair attempt over the full accumulator. A failed attempt writes
    /// and publishes nothing — the previously published state stands.
    async fn process_snapshot(&mut self) {
        let Some(draft) = attempt_parse(self.acc.text(), &self.opts).into_draft() else {
            return;
        };
        let pointer = detect_active_field(self.candidate.as_ref(), &draft);
        self.sink.set_active_field(pointer).await;
        self.sink.set_draft(draft.clone()).await;
        self.candidate = Some(draft);
    }

    /// End of stream: one authoritative exact parse of the complete text. If
    /// it fails the last streaming candidate is kept as the final result —
    /// best effort is not an error as long as something was ever usable.
    async fn finalize(&mut self) -> SessionOutcome {
        self.set_state(SessionState::Finalizing);
        if self.cancel.is_cancelled() {
            return self.cancelled();
        }
        let final_draft = match exact_parse(self.acc.text(), &self.opts) {
            Some(draft) => Some(draft),
            None => {
                log::debug!(
                    "authoritative final parse failed over {} bytes; falling back to last streaming candidate",
                    self.acc.text().len()
                );
                if self.opts.repair_final {
                    attempt_parse(self.acc.text(), &self.opts)
                        .into_draft()
                        .or_else(|| self.candidate.take())
                } else {
                    self.candidate.take()
                }
            }
        };
        match final_draft {
            Some(mut draft) => {
                draft.ensure_placeholders();
                self.sink.set_draft(draft.clone()).await;
                self.sink.set_active_field(None).await;
                self.set_state(SessionState::Completed);
                SessionOutcome::Completed(draft)
            }
            None => self.failed(SessionError::NoUsableDraft).await,
        }
    }

    fn cancelled(&mut self) -> SessionOutcome {
        // Consumer-initiated: no further sink calls of any kind. The draft and
        // pointer as of the last processed chunk remain in place.
        self.set_state(SessionState::Cancelled);
        SessionOutcome::Cancelled
    }

    async fn failed(&mut self, err: SessionError) -> SessionOutcome {
        self.set_state(SessionState::Failed);
        // The pointer is cleared on failure, but already-written drafts are
        // not rolled back; the consumer may keep the best effort so far.
        self.sink.set_active_field(None).await;
        SessionOutcome::Failed(err.to_string())
    }

    fn set_state(&mut self, next: SessionState) {
        log::debug!("session {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
