//! Non-blocking fd setup and readiness waits.

use std::io;
use std::os::fd::{BorrowedFd, RawFd};
use std::time::Instant;

use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

use crate::error::{Result, TransportError};

/// Switches a pipe fd to non-blocking mode and verifies the switch took.
///
/// The transport cannot operate on a blocking pipe, so failure here is a
/// platform defect and panics rather than returning an error.
pub(crate) fn set_nonblocking(fd: RawFd) {
    let bits = fcntl(fd, FcntlArg::F_GETFL).unwrap_or_else(|e| panic!("F_GETFL on fd {fd}: {e}"));
    let flags = OFlag::from_bits_truncate(bits) | OFlag::O_NONBLOCK;
    fcntl(fd, FcntlArg::F_SETFL(flags)).unwrap_or_else(|e| panic!("F_SETFL on fd {fd}: {e}"));
    let bits = fcntl(fd, FcntlArg::F_GETFL).unwrap_or_else(|e| panic!("F_GETFL on fd {fd}: {e}"));
    assert!(
        OFlag::from_bits_truncate(bits).contains(OFlag::O_NONBLOCK),
        "fd {fd} did not switch to non-blocking mode"
    );
}

/// Longest single poll(2) slice. Longer waits re-enter poll until the
/// caller's deadline expires.
const MAX_POLL_SLICE_MS: u16 = u16::MAX;

/// Waits until `fd` is ready for `events` or the deadline passes.
///
/// A deadline of `None` waits forever. POLLERR and POLLHUP count as ready:
/// the caller's next read or write surfaces the actual condition. EINTR
/// re-enters the wait with the time that remains.
pub(crate) fn await_ready(
    fd: BorrowedFd<'_>,
    events: PollFlags,
    deadline: Option<Instant>,
) -> Result<()> {
    loop {
        let timeout = match deadline {
            None => PollTimeout::NONE,
            Some(end) => slice_timeout(end),
        };
        let mut fds = [PollFd::new(fd, events)];
        match poll(&mut fds, timeout) {
            Ok(0) => match deadline {
                Some(end) if Instant::now() >= end => return Err(TransportError::IoTimeout),
                // A bounded poll slice expired before the deadline did.
                _ => continue,
            },
            Ok(_) => return Ok(()),
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(TransportError::Io(io::Error::from_raw_os_error(e as i32))),
        }
    }
}

/// One bounded poll slice toward `end`, rounded up to the next millisecond
/// so the wait cannot come back short of the deadline.
fn slice_timeout(end: Instant) -> PollTimeout {
    let remaining = end.saturating_duration_since(Instant::now());
    let fractional = remaining.subsec_nanos() % 1_000_000 != 0;
    let millis = remaining.as_millis().saturating_add(u128::from(fractional));
    PollTimeout::from(millis.min(u128::from(MAX_POLL_SLICE_MS)) as u16)
}
