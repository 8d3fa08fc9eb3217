// Supervisor module - keeps one background child alive for as long as it runs,
// relays termination signals to it and hands its exit status back

pub mod config;
pub mod process;
pub mod signals;

pub use config::SupervisorConfig;
pub use process::ChildExit;

use crate::error::GateError;
use libc::{c_int, pid_t};
use signals::SignalRelay;
use tracing::{debug, info, warn};

/// Signals passed on to the child unchanged
pub const FORWARDED_SIGNALS: [c_int; 3] = [libc::SIGINT, libc::SIGHUP, libc::SIGTERM];

/// All supervisor state in one place: the settings it was built with and
/// the child it is watching (set once, by a successful fork)
pub struct Supervisor {
    config: SupervisorConfig,
    child: Option<pid_t>,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            child: None,
        }
    }

    /// The child's pid, once it has been launched
    pub fn child(&self) -> Option<pid_t> {
        self.child
    }

    /// Launch the child and block until it terminates
    ///
    /// Sets `PATH` and the working directory for the whole process first.
    /// Errors here mean the child never started; once it has, every
    /// outcome is reported as a `ChildExit`.
    pub fn run(&mut self) -> Result<ChildExit, GateError> {
        self.config.validate()?;
        self.prepare_environment()?;

        // Handlers go in before the fork: a signal that lands while the
        // child is being launched waits in the pipe and is forwarded once
        // the pid is known. SIGCHLD only wakes the loop so the child can be
        // reaped.
        let mut relay = SignalRelay::new().map_err(GateError::Launch)?;
        let mut watched = FORWARDED_SIGNALS.to_vec();
        watched.push(libc::SIGCHLD);
        relay.install(&watched).map_err(GateError::Launch)?;

        let pid = process::spawn(&self.config.child_command)?;
        self.child = Some(pid);
        info!(pid, command = ?self.config.child_command, "launched child");

        Ok(self.wait_forwarding(pid, &relay))
    }

    fn prepare_environment(&self) -> Result<(), GateError> {
        std::env::set_var("PATH", &self.config.path_env);
        std::env::set_current_dir(&self.config.workdir).map_err(GateError::Launch)?;
        debug!(workdir = %self.config.workdir.display(), "prepared environment");
        Ok(())
    }

    /// Wait for `pid`, forwarding every relayed termination signal to it
    fn wait_forwarding(&self, pid: pid_t, relay: &SignalRelay) -> ChildExit {
        loop {
            // Reap first: the child may be gone already, and a full pipe
            // can swallow its SIGCHLD wakeup
            match process::try_wait(pid) {
                Ok(Some(exit)) => {
                    info!(pid, ?exit, "child terminated");
                    return exit;
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(pid, %err, "waiting for child failed");
                    return ChildExit::Unknown;
                }
            }

            let signo = match relay.next() {
                Ok(signo) => signo,
                Err(err) => {
                    warn!(%err, "signal relay failed, waiting without it");
                    return block_until_exit(pid);
                }
            };

            if FORWARDED_SIGNALS.contains(&signo) {
                match process::forward(pid, signo) {
                    Ok(()) => debug!(pid, signo, "forwarded signal"),
                    Err(err) => debug!(pid, signo, %err, "could not forward signal"),
                }
            }
        }
    }
}

/// Plain blocking wait, used only when the relay is unusable
fn block_until_exit(pid: pid_t) -> ChildExit {
    let mut status: c_int = 0;
    loop {
        let rc = unsafe { libc::waitpid(pid, &mut status, 0) };
        if rc == pid {
            return ChildExit::from_wait_status(status);
        }
        if std::io::Error::last_os_error().kind() != std::io::ErrorKind::Interrupted {
            return ChildExit::Unknown;
        }
    }
}
