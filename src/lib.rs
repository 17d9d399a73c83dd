pub mod cli;
mod detect;
mod draft;
pub mod error;
mod options;
mod repair;
pub mod session;

pub use detect::{FieldPointer, IngredientPart, detect_active_field};
pub use draft::{Ingredient, RecipeDraft};
pub use error::SessionError;
pub use options::Options;
pub use repair::{ParseAttempt, attempt_parse, exact_parse};
pub use session::{
    CancelHandle, DraftSink, SessionOutcome, SessionSlot, SessionState, StreamSession,
};

use bytes::Bytes;
use futures::Stream;
use std::convert::Infallible;
use std::fmt::Display;

/// Drive one full generation session over `stream`, writing into `sink`.
/// Returns the session's single terminal notification. To cancel a running
/// session, construct a [`StreamSession`] directly and keep its
/// [`CancelHandle`].
pub async fn run_session<S, St, E>(sink: S, stream: St, opts: Options) -> SessionOutcome
where
    S: DraftSink,
    St: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    StreamSession::new(sink, opts).run(stream).await
}

/// Replay a generator transcript already split into text chunks through a
/// real session. Useful for tests and for diagnosing a misbehaving generator
/// from a captured transcript.
pub async fn replay_transcript<'a, S, I>(chunks: I, sink: S, opts: Options) -> SessionOutcome
where
    S: DraftSink,
    I: IntoIterator<Item = &'a str>,
{
    let items: Vec<Result<Bytes, Infallible>> = chunks
        .into_iter()
        .map(|c| Ok(Bytes::copy_from_slice(c.as_bytes())))
        .collect();
    StreamSession::new(sink, opts).run(futures::stream::iter(items)).await
}

#[cfg(test)]
mod tests;
