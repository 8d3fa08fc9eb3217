// Signal relay
// Self-pipe: the async handler only writes the signal number to a pipe,
// and the supervisor's main loop reads it back and acts on it

use libc::c_int;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::sync::atomic::{AtomicI32, Ordering};

/// Write end of the active relay's pipe, or -1 when no relay is installed
///
/// The handler gets no context argument, so this is the one piece of
/// state it can reach.
static RELAY_WRITE_FD: AtomicI32 = AtomicI32::new(-1);

extern "C" fn relay_handler(signo: c_int) {
    let fd = RELAY_WRITE_FD.load(Ordering::Relaxed);
    if fd >= 0 {
        let byte = signo as u8;
        // Only async-signal-safe calls in here. A full pipe drops the byte,
        // which is fine: the reader only needs one wakeup per burst.
        // errno belongs to whatever call was interrupted, so it must come
        // back unchanged.
        unsafe {
            let errno = errno_location();
            let saved = *errno;
            libc::write(fd, (&byte as *const u8).cast(), 1);
            *errno = saved;
        }
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
unsafe fn errno_location() -> *mut c_int {
    libc::__errno_location()
}

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly"
))]
unsafe fn errno_location() -> *mut c_int {
    libc::__error()
}

#[cfg(any(target_os = "openbsd", target_os = "netbsd"))]
unsafe fn errno_location() -> *mut c_int {
    libc::__errno()
}

/// Receives signals through a pipe instead of handling them in place
///
/// Dropping the relay restores whatever dispositions were there before.
pub struct SignalRelay {
    read: OwnedFd,
    write: OwnedFd,
    previous: Vec<(c_int, libc::sigaction)>,
}

impl SignalRelay {
    /// Create the pipe. No handlers are installed yet.
    ///
    /// Both ends are close-on-exec so a launched child never inherits them;
    /// the write end is non-blocking so the handler can never stall.
    pub fn new() -> io::Result<Self> {
        let mut fds = [0 as c_int; 2];
        if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let read = unsafe { OwnedFd::from_raw_fd(fds[0]) };
        let write = unsafe { OwnedFd::from_raw_fd(fds[1]) };

        set_cloexec(read.as_raw_fd())?;
        set_cloexec(write.as_raw_fd())?;
        set_nonblocking(write.as_raw_fd())?;

        Ok(Self {
            read,
            write,
            previous: Vec::new(),
        })
    }

    /// Route `signals` into this relay
    pub fn install(&mut self, signals: &[c_int]) -> io::Result<()> {
        RELAY_WRITE_FD.store(self.write.as_raw_fd(), Ordering::SeqCst);

        for &signo in signals {
            let mut action: libc::sigaction = unsafe { std::mem::zeroed() };
            action.sa_sigaction = relay_handler as extern "C" fn(c_int) as libc::sighandler_t;
            action.sa_flags = libc::SA_RESTART;
            let mut old: libc::sigaction = unsafe { std::mem::zeroed() };

            let rc = unsafe {
                libc::sigemptyset(&mut action.sa_mask);
                libc::sigaction(signo, &action, &mut old)
            };
            if rc != 0 {
                return Err(io::Error::last_os_error());
            }
            self.previous.push((signo, old));
        }
        Ok(())
    }

    /// Block until a signal arrives and return its number
    ///
    /// This is the supervisor's only suspension point.
    pub fn next(&self) -> io::Result<c_int> {
        let mut byte = 0u8;
        loop {
            let n = unsafe { libc::read(self.read.as_raw_fd(), (&mut byte as *mut u8).cast(), 1) };
            match n {
                1 => return Ok(c_int::from(byte)),
                0 => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "signal pipe closed",
                    ))
                }
                _ => {
                    let err = io::Error::last_os_error();
                    if err.kind() != io::ErrorKind::Interrupted {
                        return Err(err);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
impl SignalRelay {
    /// Queue `signo` exactly as the handler would
    pub(crate) fn notify(&self, signo: c_int) {
        let byte = signo as u8;
        let n = unsafe { libc::write(self.write.as_raw_fd(), (&byte as *const u8).cast(), 1) };
        assert_eq!(n, 1);
    }
}

/// Tests that point the handler at a pipe take turns on the one global slot
#[cfg(test)]
pub(crate) fn exclusive_slot() -> std::sync::MutexGuard<'static, ()> {
    static SLOT: std::sync::Mutex<()> = std::sync::Mutex::new(());
    SLOT.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Drop for SignalRelay {
    fn drop(&mut self) {
        for (signo, old) in self.previous.drain(..).rev() {
            unsafe {
                libc::sigaction(signo, &old, std::ptr::null_mut());
            }
        }
        // Only clear the slot if it still points at our pipe
        let _ = RELAY_WRITE_FD.compare_exchange(
            self.write.as_raw_fd(),
            -1,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}

fn set_cloexec(fd: RawFd) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
    if flags < 0 || unsafe { libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn set_nonblocking(fd: RawFd) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 || unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
