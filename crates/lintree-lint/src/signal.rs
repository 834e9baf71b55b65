//! Relays OS termination signals to the running linter.

use std::io;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use lintree_core::InterruptCause;

use crate::kill::KillSwitch;

#[derive(Debug, Default)]
struct RelayState {
    attached: Mutex<Option<Arc<KillSwitch>>>,
    terminated: OnceLock<String>,
}

impl RelayState {
    fn deliver(&self, signal: &str) {
        if self.terminated.set(signal.to_string()).is_ok() {
            tracing::info!(signal, "Received termination signal");
        }
        let attached = self
            .attached
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(switch) = attached.as_ref() {
            switch.interrupt(InterruptCause::Signal(signal.to_string()));
        }
    }
}

/// Receives termination signals for the whole lint phase.
///
/// A signal kills whichever invocation is attached at that moment and
/// latches the relay as terminated, so no further invocation starts. Once
/// every installed relay has been dropped, a signal exits the process with
/// the conventional `128 + signo` status.
#[derive(Debug)]
pub struct SignalRelay {
    state: Arc<RelayState>,
}

impl SignalRelay {
    /// Register with the process-wide signal listener, starting it on first use.
    pub fn install() -> io::Result<Self> {
        start_listener()?;
        Ok(Self::registered(&DISPATCHER))
    }

    fn registered(dispatcher: &Dispatcher) -> Self {
        let relay = Self::detached();
        dispatcher.register(&relay.state);
        relay
    }

    /// A relay that never hears from the OS; signals only arrive through
    /// [`deliver`](Self::deliver).
    pub fn detached() -> Self {
        Self {
            state: Arc::new(RelayState::default()),
        }
    }

    /// Attach a running invocation until the returned guard is dropped.
    pub fn attach(&self, switch: Arc<KillSwitch>) -> RelayGuard<'_> {
        *self
            .state
            .attached
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(switch.clone());

        // A signal that arrived before attaching still has to stop this process.
        if let Some(signal) = self.terminated() {
            switch.interrupt(InterruptCause::Signal(signal.to_string()));
        }
        RelayGuard { relay: self }
    }

    /// Name of the first signal received, if any.
    pub fn terminated(&self) -> Option<&str> {
        self.state.terminated.get().map(String::as_str)
    }

    /// Handle `signal` as if the OS had sent it.
    pub fn deliver(&self, signal: &str) {
        self.state.deliver(signal);
    }
}

/// Detaches an invocation from the relay on drop.
#[derive(Debug)]
pub struct RelayGuard<'a> {
    relay: &'a SignalRelay,
}

impl Drop for RelayGuard<'_> {
    fn drop(&mut self) {
        self.relay
            .state
            .attached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// Fans signals out to every live relay.
#[derive(Debug, Default)]
struct Dispatcher {
    relays: Mutex<Vec<Weak<RelayState>>>,
}

impl Dispatcher {
    const fn new() -> Self {
        Self {
            relays: Mutex::new(Vec::new()),
        }
    }

    fn register(&self, state: &Arc<RelayState>) {
        self.relays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::downgrade(state));
    }

    /// Deliver `signal` to the live relays. Returns `false` if there are none.
    fn dispatch(&self, signal: &str) -> bool {
        let live: Vec<Arc<RelayState>> = {
            let mut relays = self.relays.lock().unwrap_or_else(PoisonError::into_inner);
            relays.retain(|relay| relay.strong_count() > 0);
            relays.iter().filter_map(Weak::upgrade).collect()
        };
        for state in &live {
            state.deliver(signal);
        }
        !live.is_empty()
    }
}

static DISPATCHER: Dispatcher = Dispatcher::new();

/// Start the listener thread once per process.
///
/// OS handlers stay registered for the life of the process, so the listener
/// does too and decides per signal whether a lint phase owns it.
fn start_listener() -> io::Result<()> {
    static STARTED: OnceLock<Result<(), io::ErrorKind>> = OnceLock::new();

    (*STARTED.get_or_init(|| {
        spawn_listener(&DISPATCHER).map_err(|e| {
            tracing::warn!(error = %e, "Failed to listen for termination signals");
            e.kind()
        })
    }))
    .map_err(|kind| io::Error::new(kind, "failed to listen for termination signals"))
}

fn spawn_listener(dispatcher: &'static Dispatcher) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let signals = {
        let _context = runtime.enter();
        Signals::new()?
    };

    std::thread::Builder::new()
        .name("lintree-signals".to_string())
        .spawn(move || runtime.block_on(forward(signals, dispatcher)))?;
    Ok(())
}

async fn forward(mut signals: Signals, dispatcher: &'static Dispatcher) {
    while let Some((name, status)) = signals.recv().await {
        if !dispatcher.dispatch(name) {
            tracing::info!(signal = name, "Received termination signal outside of linting");
            std::process::exit(status);
        }
    }
}

/// Registered signal streams, yielding a signal's name and exit status.
#[cfg(unix)]
struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn new() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    async fn recv(&mut self) -> Option<(&'static str, i32)> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Some(("SIGINT", 128 + libc::SIGINT)),
            Some(()) = self.terminate.recv() => Some(("SIGTERM", 128 + libc::SIGTERM)),
            Some(()) = self.hangup.recv() => Some(("SIGHUP", 128 + libc::SIGHUP)),
            else => None,
        }
    }
}

#[cfg(windows)]
struct Signals {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(windows)]
impl Signals {
    fn new() -> io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    async fn recv(&mut self) -> Option<(&'static str, i32)> {
        self.ctrl_c.recv().await.map(|()| ("CTRL_C", 130))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ProcessGroup;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingGroup {
        kills: AtomicUsize,
    }

    impl ProcessGroup for CountingGroup {
        fn configure(&self, _command: &mut tokio::process::Command) {}

        fn kill(&self, _pid: u32) -> io::Result<()> {
            self.kills.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_signal_kills_attached_invocation() {
        let relay = SignalRelay::detached();
        let group = Arc::new(CountingGroup::default());
        let switch = Arc::new(KillSwitch::new(7, group.clone()));

        let guard = relay.attach(switch.clone());
        relay.deliver("SIGTERM");
        drop(guard);

        assert_eq!(relay.terminated(), Some("SIGTERM"));
        assert_eq!(
            switch.mark_exited(),
            Some(InterruptCause::Signal("SIGTERM".into()))
        );
        assert_eq!(group.kills.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detached_invocation_is_untouched() {
        let relay = SignalRelay::detached();
        let group = Arc::new(CountingGroup::default());
        let switch = Arc::new(KillSwitch::new(7, group.clone()));

        drop(relay.attach(switch.clone()));
        relay.deliver("SIGINT");

        assert_eq!(switch.mark_exited(), None);
        assert_eq!(group.kills.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_attach_after_termination_kills_immediately() {
        let relay = SignalRelay::detached();
        relay.deliver("SIGHUP");
        relay.deliver("SIGINT");
        assert_eq!(relay.terminated(), Some("SIGHUP"));

        let group = Arc::new(CountingGroup::default());
        let switch = Arc::new(KillSwitch::new(7, group.clone()));
        let _guard = relay.attach(switch.clone());
        assert_eq!(group.kills.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_reaches_registered_relays() {
        let dispatcher = Dispatcher::default();
        let first = SignalRelay::registered(&dispatcher);
        let second = SignalRelay::registered(&dispatcher);

        assert!(dispatcher.dispatch("SIGTERM"));
        assert_eq!(first.terminated(), Some("SIGTERM"));
        assert_eq!(second.terminated(), Some("SIGTERM"));
    }

    #[test]
    fn test_dropped_relay_releases_signals() {
        let dispatcher = Dispatcher::default();
        let relay = SignalRelay::registered(&dispatcher);
        let group = Arc::new(CountingGroup::default());
        let switch = Arc::new(KillSwitch::new(7, group.clone()));
        drop(relay.attach(switch));
        drop(relay);

        assert!(!dispatcher.dispatch("SIGINT"));
        assert!(dispatcher.relays.lock().unwrap().is_empty());
        assert_eq!(group.kills.load(Ordering::SeqCst), 0);
    }
}
