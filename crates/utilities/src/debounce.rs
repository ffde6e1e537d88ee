//! Trailing-edge debouncing backed by a single timer thread.

use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

const THREAD_NAME: &str = "debounce";

enum Signal<A> {
    Call(A),
    Cancel,
}

/// Collapses bursts of calls into one delayed invocation of the wrapped
/// function, using the arguments of the last call in the burst.
///
/// Every [`Debouncer::call`] restarts the wait. At most one invocation is
/// pending at any time. The wrapped function runs on the debouncer's timer
/// thread; dropping the debouncer discards any pending call and lets the
/// thread exit.
pub struct Debouncer<A: Send + 'static> {
    tx: Sender<Signal<A>>,
    wait: Duration,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new<F>(wait: Duration, func: F) -> Self
    where
        F: FnMut(A) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        // A failed spawn drops the receiver, so later calls are no-ops.
        let _ = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || timer_loop(rx, wait, func));
        Self { tx, wait }
    }

    /// Schedule `args`, replacing whatever call was pending.
    pub fn call(&self, args: A) {
        let _ = self.tx.send(Signal::Call(args));
    }

    /// Drop the pending call, if any, without invoking it.
    pub fn cancel(&self) {
        let _ = self.tx.send(Signal::Cancel);
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }
}

impl<A: Send + 'static> fmt::Debug for Debouncer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("wait", &self.wait)
            .finish_non_exhaustive()
    }
}

/// Shorthand for [`Debouncer::new`].
pub fn debounce<A, F>(wait: Duration, func: F) -> Debouncer<A>
where
    A: Send + 'static,
    F: FnMut(A) + Send + 'static,
{
    Debouncer::new(wait, func)
}

fn timer_loop<A, F>(rx: Receiver<Signal<A>>, wait: Duration, mut func: F)
where
    F: FnMut(A),
{
    let mut pending: Option<A> = None;

    loop {
        let signal = if pending.is_some() {
            match rx.recv_timeout(wait) {
                Ok(signal) => signal,
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(args) = pending.take() {
                        func(args);
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => return,
            }
        } else {
            match rx.recv() {
                Ok(signal) => signal,
                Err(_) => return,
            }
        };

        match signal {
            Signal::Call(args) => pending = Some(args),
            Signal::Cancel => pending = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::channel;
    use std::time::Instant;

    use super::*;

    const WAIT: Duration = Duration::from_millis(50);
    const PATIENCE: Duration = Duration::from_secs(2);

    #[test]
    fn does_not_fire_before_the_wait_elapses() {
        let (tx, rx) = channel();
        let debounced = debounce(WAIT, move |()| {
            let _ = tx.send(Instant::now());
        });

        let called_at = Instant::now();
        debounced.call(());

        let fired_at = rx.recv_timeout(PATIENCE).expect("debounced call fires");
        assert!(fired_at.duration_since(called_at) >= WAIT);
    }

    #[test]
    fn forwards_arguments() {
        let (tx, rx) = channel();
        let debounced = debounce(WAIT, move |args: (&'static str, &'static str)| {
            let _ = tx.send(args);
        });

        debounced.call(("arg1", "arg2"));

        assert_eq!(rx.recv_timeout(PATIENCE), Ok(("arg1", "arg2")));
    }

    #[test]
    fn burst_collapses_into_the_last_call() {
        let (tx, rx) = channel();
        let debounced = debounce(Duration::from_millis(100), move |value: u32| {
            let _ = tx.send(value);
        });

        debounced.call(1);
        debounced.call(2);
        debounced.call(3);

        assert_eq!(rx.recv_timeout(PATIENCE), Ok(3));
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[test]
    fn zero_wait_still_fires() {
        let (tx, rx) = channel();
        let debounced = debounce(Duration::ZERO, move |()| {
            let _ = tx.send(());
        });

        debounced.call(());

        assert_eq!(rx.recv_timeout(PATIENCE), Ok(()));
        assert_eq!(debounced.wait(), Duration::ZERO);
    }

    #[test]
    fn reusable_across_bursts() {
        let (tx, rx) = channel();
        let debounced = debounce(WAIT, move |value: u32| {
            let _ = tx.send(value);
        });

        debounced.call(1);
        assert_eq!(rx.recv_timeout(PATIENCE), Ok(1));
        debounced.call(2);
        assert_eq!(rx.recv_timeout(PATIENCE), Ok(2));
    }

    #[test]
    fn runs_on_the_named_timer_thread() {
        let (tx, rx) = channel();
        let debounced = debounce(Duration::ZERO, move |()| {
            let _ = tx.send(thread::current().name().map(str::to_owned));
        });

        debounced.call(());

        assert_eq!(rx.recv_timeout(PATIENCE), Ok(Some(THREAD_NAME.to_owned())));
    }

    #[test]
    fn cancel_discards_pending_call() {
        let (tx, rx) = channel();
        let debounced = debounce(Duration::from_millis(100), move |value: u32| {
            let _ = tx.send(value);
        });

        debounced.call(1);
        debounced.cancel();

        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    }
}
