//! The target transport: one owned process slot and its byte stream.

use std::io::{self, Read, Write};
use std::os::fd::{AsFd, AsRawFd};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

use nix::poll::PollFlags;
use tracing::{debug, instrument, warn};

use crate::command::TargetCommand;
use crate::error::{Result, TransportError};
use crate::nonblock::{await_ready, set_nonblocking};

/// Timeouts advertised to the session layer.
///
/// All zero: the transport grants no retry window, no startup grace and no
/// established-session cap. The per-call deadlines are the only clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransportTimeouts {
    pub session_start_retry: Duration,
    pub session_start: Duration,
    pub session_established: Duration,
}

#[derive(Debug)]
struct TargetProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
}

/// Byte stream to a target process over its standard pipes.
///
/// One process slot: [`open`](Self::open) spawns the target with stdin and
/// stdout piped and both pipe ends non-blocking, [`close`](Self::close)
/// tears it down. Reads and writes take an optional deadline measured from
/// call entry; expiry surfaces [`TransportError::IoTimeout`] and leaves the
/// stream usable. A peer that goes away tears the transport down, surfaces
/// [`TransportError::Closed`], and leaves the slot free to open again.
#[derive(Debug, Default)]
pub struct TargetTransport {
    process: Option<TargetProcess>,
}

impl TargetTransport {
    pub fn new() -> Self {
        TargetTransport { process: None }
    }

    pub fn is_open(&self) -> bool {
        self.process.is_some()
    }

    /// Spawns the target process and attaches its pipes.
    ///
    /// Opening an open transport is rejected; the attached process is never
    /// silently replaced. The target's stderr passes through to the
    /// harness's own.
    #[instrument(skip_all, fields(program = %command.program))]
    pub fn open(&mut self, command: TargetCommand) -> Result<TransportTimeouts> {
        if self.process.is_some() {
            return Err(TransportError::AlreadyOpen);
        }
        debug!(args = ?command.args, cwd = %command.cwd.display(), "spawning target process");
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| TransportError::Spawn {
                program: command.program.clone(),
                source: e,
            })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "child stdin was not piped"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "child stdout was not piped"))?;
        set_nonblocking(stdin.as_raw_fd());
        set_nonblocking(stdout.as_raw_fd());
        self.process = Some(TargetProcess {
            child,
            stdin,
            stdout,
        });
        Ok(TransportTimeouts::default())
    }

    /// Tears the target process down: kill, reap, clear the slot.
    ///
    /// Idempotent and infallible; closing a closed transport does nothing.
    pub fn close(&mut self) {
        if let Some(mut process) = self.process.take() {
            let _ = process.child.kill();
            match process.child.wait() {
                Ok(status) => debug!(%status, "target process reaped"),
                Err(e) => warn!(error = %e, "failed to reap target process"),
            }
        }
    }

    /// Reads up to `max_bytes` from the target.
    ///
    /// Waits for stdout readability under the deadline, then performs one
    /// non-blocking read; whatever arrived is returned, short reads
    /// included. End of stream (0 bytes, `max_bytes` of zero included, since
    /// the two cannot be told apart) and a broken pipe tear the transport
    /// down and surface [`TransportError::Closed`].
    pub fn read(&mut self, max_bytes: usize, timeout: Option<Duration>) -> Result<Vec<u8>> {
        let deadline = call_deadline(timeout);
        let mut buf = vec![0u8; max_bytes];
        loop {
            let process = self.process.as_mut().ok_or(TransportError::Closed)?;
            await_ready(process.stdout.as_fd(), PollFlags::POLLIN, deadline)?;
            match process.stdout.read(&mut buf) {
                Ok(0) => {
                    debug!("target closed its output stream");
                    self.close();
                    return Err(TransportError::Closed);
                }
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(buf);
                }
                // Readiness was spurious or the read was interrupted; wait
                // again on the same deadline.
                Err(e)
                    if e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::Interrupted =>
                {
                    continue
                }
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    self.close();
                    return Err(TransportError::Closed);
                }
                Err(e) => return Err(TransportError::Io(e)),
            }
        }
    }

    /// Writes all of `data` to the target.
    ///
    /// One deadline covers the entire write: each chunk waits for stdin
    /// writability with whatever time remains. A peer that disappears
    /// mid-write tears the transport down and surfaces
    /// [`TransportError::Closed`].
    pub fn write(&mut self, data: &[u8], timeout: Option<Duration>) -> Result<()> {
        if self.process.is_none() {
            return Err(TransportError::Closed);
        }
        let deadline = call_deadline(timeout);
        let mut remaining = data;
        while !remaining.is_empty() {
            let process = self.process.as_mut().ok_or(TransportError::Closed)?;
            await_ready(process.stdin.as_fd(), PollFlags::POLLOUT, deadline)?;
            match process.stdin.write(remaining) {
                Ok(0) => {
                    self.close();
                    return Err(TransportError::Closed);
                }
                Ok(n) => remaining = &remaining[n..],
                Err(e)
                    if e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::Interrupted =>
                {
                    continue
                }
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    self.close();
                    return Err(TransportError::Closed);
                }
                Err(e) => return Err(TransportError::Io(e)),
            }
        }
        Ok(())
    }
}

impl Drop for TargetTransport {
    // A dropped transport must not leave a simulator running.
    fn drop(&mut self) {
        self.close();
    }
}

/// Absolute end time for one call. A timeout too large to represent is
/// treated as no deadline at all.
fn call_deadline(timeout: Option<Duration>) -> Option<Instant> {
    timeout.and_then(|t| Instant::now().checked_add(t))
}
