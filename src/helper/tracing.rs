use std::future::Future;

#[cfg(feature = "tracing")]
use tracing::Instrument;

/// Attaches a harness span to a future when the `tracing` feature is on
pub trait MaybeInstrument: Future + Sized {
    #[cfg(feature = "tracing")]
    fn maybe_instrument(self, op: &'static str, command: &str) -> impl Future<Output = Self::Output> {
        let span = tracing::debug_span!("stub_harness", op = op, command = command);
        self.instrument(span)
    }

    #[cfg(not(feature = "tracing"))]
    fn maybe_instrument(self, _op: &'static str, _command: &str) -> Self {
        self
    }
}

impl<F: Future> MaybeInstrument for F {}
