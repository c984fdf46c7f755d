//! Low-level socket tuning applied once, right after connect. Uses raw
//! `setsockopt` calls because several of these options (`SO_BUSY_POLL`,
//! `SO_PRIORITY`, `TCP_QUICKACK`) have no wrapper in `std::net` or any
//! dependency already in the tree. Every option is best-effort: a failure
//! is logged and tuning moves on rather than aborting the connection.

use std::io;
use std::os::unix::io::RawFd;

const SEND_RECV_BUFFER_BYTES: libc::c_int = 256 * 1024;
const SOCKET_PRIORITY: libc::c_int = 6;

#[derive(Debug, Clone, Copy, Default)]
pub struct TuningReport {
    pub nodelay: bool,
    pub send_buffer: bool,
    pub recv_buffer: bool,
    pub priority: bool,
    pub quickack: bool,
    pub busy_poll: bool,
}

/// Applies every tuning option to `fd` and returns which ones succeeded.
/// Each setsockopt call is independent; one failing does not skip the
/// rest.
pub fn tune(fd: RawFd) -> TuningReport {
    let mut report = TuningReport::default();

    report.nodelay = set_flag(fd, libc::IPPROTO_TCP, libc::TCP_NODELAY, 1);
    if !report.nodelay {
        tracing::warn!("TCP_NODELAY request failed: {}", io::Error::last_os_error());
    }

    report.send_buffer = set_flag(fd, libc::SOL_SOCKET, libc::SO_SNDBUF, SEND_RECV_BUFFER_BYTES);
    if !report.send_buffer {
        tracing::warn!("SO_SNDBUF request failed: {}", io::Error::last_os_error());
    }

    report.recv_buffer = set_flag(fd, libc::SOL_SOCKET, libc::SO_RCVBUF, SEND_RECV_BUFFER_BYTES);
    if !report.recv_buffer {
        tracing::warn!("SO_RCVBUF request failed: {}", io::Error::last_os_error());
    }

    report.priority = set_flag(fd, libc::SOL_SOCKET, libc::SO_PRIORITY, SOCKET_PRIORITY);
    if !report.priority {
        tracing::warn!("SO_PRIORITY request failed: {}", io::Error::last_os_error());
    }

    report.quickack = set_flag(fd, libc::IPPROTO_TCP, libc::TCP_QUICKACK, 1);
    if !report.quickack {
        tracing::warn!("TCP_QUICKACK request failed: {}", io::Error::last_os_error());
    }

    report.busy_poll = set_flag(fd, libc::SOL_SOCKET, libc::SO_BUSY_POLL, 1);
    if !report.busy_poll {
        tracing::warn!("SO_BUSY_POLL request failed: {}", io::Error::last_os_error());
    }

    tracing::info!(?report, "socket tuning applied");
    report
}

fn set_flag(fd: RawFd, level: libc::c_int, name: libc::c_int, value: libc::c_int) -> bool {
    let ret = unsafe {
        libc::setsockopt(
            fd,
            level,
            name,
            &value as *const libc::c_int as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    ret == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::os::unix::io::AsRawFd;

    #[test]
    fn tuning_a_real_socket_succeeds_on_the_portable_options() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let stream = std::net::TcpStream::connect(addr).unwrap();
        let report = tune(stream.as_raw_fd());
        assert!(report.nodelay);
        assert!(report.send_buffer);
        assert!(report.recv_buffer);
    }
}
