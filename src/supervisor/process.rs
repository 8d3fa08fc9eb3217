// Child process handling
// fork/exec of the supervised command and translation of its wait status

use crate::error::GateError;
use libc::{c_char, c_int, pid_t};
use std::ffi::CString;
use std::io;
use std::ptr;

/// How the supervised child ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    /// Normal exit with this status
    Exited(u8),
    /// Killed by this signal
    Signaled(c_int),
    /// The wait failed or reported something else
    Unknown,
}

impl ChildExit {
    /// Decode a raw `waitpid` status word
    pub fn from_wait_status(status: c_int) -> Self {
        if libc::WIFEXITED(status) {
            ChildExit::Exited(libc::WEXITSTATUS(status) as u8)
        } else if libc::WIFSIGNALED(status) {
            ChildExit::Signaled(libc::WTERMSIG(status))
        } else {
            ChildExit::Unknown
        }
    }

    /// The status the supervisor itself exits with: the child's own status
    /// for a normal exit, 1 for anything else
    pub fn exit_code(&self) -> u8 {
        match self {
            ChildExit::Exited(code) => *code,
            ChildExit::Signaled(_) | ChildExit::Unknown => 1,
        }
    }
}

/// Fork and exec `command` (program path first, then arguments)
///
/// The program is not looked up on `PATH`. If exec fails, the child prints
/// the reason to stderr and exits with status 1; the parent only finds out
/// through the child's exit status.
pub fn spawn(command: &[String]) -> Result<pid_t, GateError> {
    let argv = command
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| GateError::Launch(io::Error::new(io::ErrorKind::InvalidInput, err)))?;
    let Some(program) = argv.first() else {
        return Err(GateError::Config("child command is empty".to_string()));
    };

    // Everything the child touches is allocated before the fork
    let mut argv_ptrs: Vec<*const c_char> = argv.iter().map(|arg| arg.as_ptr()).collect();
    argv_ptrs.push(ptr::null());
    let exec_context = CString::new(format!("trustgate: exec {}", command[0]))
        .map_err(|err| GateError::Launch(io::Error::new(io::ErrorKind::InvalidInput, err)))?;

    match unsafe { libc::fork() } {
        -1 => Err(GateError::Launch(io::Error::last_os_error())),
        0 => unsafe {
            libc::execv(program.as_ptr(), argv_ptrs.as_ptr());
            // Only reached when exec failed
            libc::perror(exec_context.as_ptr());
            libc::_exit(1)
        },
        pid => Ok(pid),
    }
}

/// Poll the child without blocking
///
/// `Ok(None)` means it is still running.
pub fn try_wait(pid: pid_t) -> io::Result<Option<ChildExit>> {
    let mut status: c_int = 0;
    loop {
        let rc = unsafe { libc::waitpid(pid, &mut status, libc::WNOHANG) };
        match rc {
            0 => return Ok(None),
            -1 => {
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::Interrupted {
                    return Err(err);
                }
            }
            _ => {
                let exit = ChildExit::from_wait_status(status);
                // A stopped/continued report is not a termination
                if exit == ChildExit::Unknown {
                    return Ok(None);
                }
                return Ok(Some(exit));
            }
        }
    }
}

/// Send `signo` to the child
pub fn forward(pid: pid_t, signo: c_int) -> io::Result<()> {
    if unsafe { libc::kill(pid, signo) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
