// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Scripted stand-in for the kernel: records what it was asked to do and
//! completes every request with a canned reply.

use std::{
    io,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use sg_raw_rs::{
    models::request::{DataDirection, SgFlags},
    transport::{Completion, ScsiDevice, SgRequest, Transport},
};

pub const INQUIRY: [u8; 6] = [0x12, 0x00, 0x00, 0x00, 0x24, 0x00];
pub const TEST_UNIT_READY: [u8; 6] = [0x00; 6];

/// Standard INQUIRY data of a direct-access block device.
pub fn inquiry_data() -> Vec<u8> {
    let mut d = vec![0u8; 36];
    d[2] = 0x06; // SPC-4
    d[3] = 0x02;
    d[4] = 31;
    d[8..16].copy_from_slice(b"LINUX   ");
    d[16..32].copy_from_slice(b"sg simulator    ");
    d[32..36].copy_from_slice(b"0001");
    d
}

/// Fixed-format sense, current error.
pub fn fixed_sense(key: u8, asc: u8, ascq: u8) -> Vec<u8> {
    let mut s = vec![0u8; 18];
    s[0] = 0x70;
    s[2] = key;
    s[7] = 10;
    s[12] = asc;
    s[13] = ascq;
    s
}

/// What the simulated device does with the next request.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub status: u8,
    pub host_status: u16,
    pub driver_status: u16,
    pub sense: Vec<u8>,
    pub data: Vec<u8>,
    pub resid: i32,
    /// errno returned by the issue call instead of completing
    pub submit_errno: Option<i32>,
    /// errno returned by open
    pub open_errno: Option<i32>,
    /// panic inside the issue call
    pub panic_on_submit: bool,
}

/// One request as the device saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub path: PathBuf,
    pub cdb: Vec<u8>,
    pub direction: DataDirection,
    pub timeout: Duration,
    pub flags: SgFlags,
    pub data_out: Vec<u8>,
    pub transfer_len: usize,
    pub sense_capacity: usize,
}

#[derive(Debug, Default)]
struct SimState {
    reply: Mutex<Reply>,
    seen: Mutex<Vec<Seen>>,
    opens: AtomicUsize,
    live: AtomicUsize,
}

#[derive(Debug, Clone, Default)]
pub struct SimTransport {
    state: Arc<SimState>,
}

impl SimTransport {
    pub fn replying(reply: Reply) -> Self {
        let sim = Self::default();
        *sim.state.reply.lock().expect("reply lock") = reply;
        sim
    }

    /// Successful opens so far.
    pub fn opens(&self) -> usize {
        self.state.opens.load(Ordering::SeqCst)
    }

    /// Handles opened and not yet dropped.
    pub fn live_handles(&self) -> usize {
        self.state.live.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.state.seen.lock().expect("seen lock").clone()
    }
}

#[derive(Debug)]
pub struct SimDevice {
    state: Arc<SimState>,
    path: PathBuf,
}

impl Transport for SimTransport {
    type Device = SimDevice;

    fn open(&self, path: &Path) -> io::Result<SimDevice> {
        let reply = self.state.reply.lock().expect("reply lock").clone();
        if let Some(errno) = reply.open_errno {
            return Err(io::Error::from_raw_os_error(errno));
        }
        self.state.opens.fetch_add(1, Ordering::SeqCst);
        self.state.live.fetch_add(1, Ordering::SeqCst);
        Ok(SimDevice {
            state: Arc::clone(&self.state),
            path: path.to_path_buf(),
        })
    }
}

impl ScsiDevice for SimDevice {
    fn submit(&mut self, request: &mut SgRequest) -> io::Result<()> {
        self.state.seen.lock().expect("seen lock").push(Seen {
            path: self.path.clone(),
            cdb: request.cdb().to_vec(),
            direction: request.direction(),
            timeout: request.timeout(),
            flags: request.flags(),
            data_out: request.data_out().to_vec(),
            transfer_len: request.transfer_len(),
            sense_capacity: request.sense_capacity(),
        });

        let reply = self.state.reply.lock().expect("reply lock").clone();
        if reply.panic_on_submit {
            panic!("simulated device panicked");
        }
        if let Some(errno) = reply.submit_errno {
            return Err(io::Error::from_raw_os_error(errno));
        }

        let buf = request.data_in_mut();
        let n = buf.len().min(reply.data.len());
        buf[..n].copy_from_slice(&reply.data[..n]);

        let sense = request.sense_mut();
        let n = sense.len().min(reply.sense.len());
        sense[..n].copy_from_slice(&reply.sense[..n]);

        let clean = reply.status == 0 && reply.host_status == 0 && reply.driver_status == 0;
        request.complete(Completion {
            status: reply.status,
            host_status: reply.host_status,
            driver_status: reply.driver_status,
            // reports what the device had, not what fit
            sb_len_wr: u8::try_from(reply.sense.len()).unwrap_or(u8::MAX),
            resid: reply.resid,
            duration_ms: 1,
            info: if clean { 0 } else { 1 },
        });
        Ok(())
    }
}

impl Drop for SimDevice {
    fn drop(&mut self) {
        self.state.live.fetch_sub(1, Ordering::SeqCst);
    }
}
