//! Decoder teardown off the UI thread

use crate::decoder::Decoder;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendError};
use log::{debug, warn};
use std::io;
use std::time::Duration;

/// Completion signal of a background decoder release
#[derive(Debug)]
pub struct ReleaseHandle {
    session: u64,
    done: Receiver<()>,
    finished: bool,
}

impl ReleaseHandle {
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Non-blocking check
    pub fn is_finished(&mut self) -> bool {
        if !self.finished {
            // A dropped sender means the worker ended, even if it panicked
            self.finished = !matches!(
                self.done.try_recv(),
                Err(crossbeam_channel::TryRecvError::Empty)
            );
        }
        self.finished
    }

    /// Block until the release finished or `timeout` passed
    pub fn wait(&mut self, timeout: Duration) -> bool {
        if self.finished {
            return true;
        }
        self.finished = !matches!(self.done.recv_timeout(timeout), Err(RecvTimeoutError::Timeout));
        self.finished
    }
}

/// Release `decoder` on a worker thread
///
/// The worker owns the decoder and touches nothing else; it only signals
/// completion. When no worker can be started the decoder is released
/// inline.
pub(crate) fn release_in_background(session: u64, decoder: Box<dyn Decoder>) -> ReleaseHandle {
    release_with(session, decoder, |name, work| {
        std::thread::Builder::new().name(name).spawn(work).map(|_| ())
    })
}

type Work = Box<dyn FnOnce() + Send + 'static>;

fn release_with<S>(session: u64, mut decoder: Box<dyn Decoder>, spawn: S) -> ReleaseHandle
where
    S: FnOnce(String, Work) -> io::Result<()>,
{
    let (done_tx, done_rx) = bounded(1);
    let (job_tx, job_rx) = bounded::<Box<dyn Decoder>>(1);

    let work: Work = Box::new(move || {
        if let Ok(mut decoder) = job_rx.recv() {
            decoder.release();
        }
        let _ = done_tx.send(());
    });

    let mut handle = ReleaseHandle {
        session,
        done: done_rx,
        finished: false,
    };

    if let Err(e) = spawn(format!("decoder-release-{}", session), work) {
        warn!("Could not spawn release worker for session {}, releasing inline: {}", session, e);
        decoder.release();
        handle.finished = true;
        return handle;
    }

    match job_tx.send(decoder) {
        Ok(()) => debug!("Releasing decoder of session {} in background", session),
        Err(SendError(mut decoder)) => {
            warn!("Release worker of session {} exited early, releasing inline", session);
            decoder.release();
            handle.finished = true;
        }
    }
    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DecoderCall, ScriptedDecoderFactory};
    use crate::decoder::DecoderFactory;

    #[test]
    fn test_release_runs_on_worker() {
        let factory = ScriptedDecoderFactory::new();
        let decoder = factory.create_decoder().unwrap();

        let mut handle = release_in_background(4, decoder);
        assert!(handle.wait(Duration::from_secs(5)));
        assert!(handle.is_finished());
        assert_eq!(handle.session(), 4);

        let log = factory.calls();
        assert_eq!(log.last().map(|(_, c)| c.clone()), Some(DecoderCall::Release));
    }

    #[test]
    fn test_release_inline_when_spawn_fails() {
        let factory = ScriptedDecoderFactory::new();
        let decoder = factory.create_decoder().unwrap();

        let mut handle = release_with(7, decoder, |_, _| {
            Err(io::Error::new(io::ErrorKind::Other, "no threads left"))
        });
        assert!(handle.is_finished());
        assert_eq!(handle.session(), 7);

        let log = factory.calls();
        assert_eq!(log.last().map(|(_, c)| c.clone()), Some(DecoderCall::Release));
    }
}
