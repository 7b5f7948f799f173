//! `gantry probe`: open the transport and exchange bytes with the target.
//!
//! Probe is a diagnostic, not a protocol client. It optionally writes one
//! payload, reads back at most one buffer, dumps it in hex, and closes the
//! transport again. A silent target is reported, not treated as a failure.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use gantry_options::OptionValue;
use gantry_session::{Session, SessionError, SessionState};
use gantry_transport::TransportError;

pub fn run(
    session: &mut Session,
    send: Option<&Path>,
    send_text: Option<&str>,
    read_max: usize,
    timeout_secs: f64,
    supplied: &HashMap<String, OptionValue>,
) -> Result<()> {
    let timeout = Duration::try_from_secs_f64(timeout_secs)
        .with_context(|| format!("timeout of {timeout_secs} seconds is not usable"))?;
    if session.state() != SessionState::Built {
        bail!("project is not built; run `gantry build` first");
    }

    session.open_transport(supplied)?;
    let outcome = exchange(session, send, send_text, read_max, timeout, timeout_secs);
    session.close_transport();
    outcome
}

fn exchange(
    session: &mut Session,
    send: Option<&Path>,
    send_text: Option<&str>,
    read_max: usize,
    timeout: Duration,
    timeout_secs: f64,
) -> Result<()> {
    let payload = match (send, send_text) {
        (Some(path), _) => {
            Some(fs::read(path).with_context(|| format!("reading {}", path.display()))?)
        }
        (None, Some(text)) => Some(text.as_bytes().to_vec()),
        (None, None) => None,
    };
    if let Some(payload) = &payload {
        session.write_transport(payload, Some(timeout))?;
        println!("sent {} bytes", payload.len());
    }

    match session.read_transport(read_max, Some(timeout)) {
        Ok(data) => {
            println!("received {} bytes", data.len());
            print!("{}", hex_dump(&data));
            Ok(())
        }
        Err(SessionError::Transport(TransportError::IoTimeout)) => {
            println!("no output within {timeout_secs}s");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Sixteen bytes per row: offset, hex columns, printable gutter.
fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in data.chunks(16).enumerate() {
        out.push_str(&format!("{:08x}  ", row * 16));
        for i in 0..16 {
            match chunk.get(i) {
                Some(byte) => out.push_str(&format!("{byte:02x} ")),
                None => out.push_str("   "),
            }
            if i == 7 {
                out.push(' ');
            }
        }
        out.push(' ');
        for byte in chunk {
            let shown = if byte.is_ascii_graphic() || *byte == b' ' {
                *byte as char
            } else {
                '.'
            };
            out.push(shown);
        }
        out.push('\n');
    }
    out
}
