// src/sniff.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use pcap::{Active, Capture, Device};
use tracing::{info, trace, warn};

use crate::error::CaptureError;
use crate::models::TrafficEvent;
use crate::parser::parse_frame;

/// Read timeout, so the loop re-checks the running flag on quiet links.
const READ_TIMEOUT_MS: i32 = 500;
const SNAPLEN: i32 = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    pub frames: u64,
    pub forwarded: u64,
    pub skipped: u64,
}

/// Captures on `interface` (or the default device) and forwards decoded
/// events until `running` is cleared or the receiving side hangs up.
pub fn start_capture(
    interface: Option<&str>,
    sender: Sender<TrafficEvent>,
    running: Arc<AtomicBool>,
) -> Result<CaptureStats, CaptureError> {
    let mut cap = create_capture(interface)?;
    process_packets(&mut cap, &sender, &running)
}

pub fn list_devices() -> Result<Vec<Device>, CaptureError> {
    Ok(Device::list()?)
}

fn create_capture(interface: Option<&str>) -> Result<Capture<Active>, CaptureError> {
    let device = match interface {
        Some(name) => Device::from(name),
        None => Device::lookup()?.ok_or(CaptureError::NoDevice)?,
    };
    info!(device = %device.name, "starting capture");

    let cap = Capture::from_device(device)?
        .promisc(true)
        .snaplen(SNAPLEN) // headers only
        .timeout(READ_TIMEOUT_MS)
        .immediate_mode(true)
        .open()?;
    Ok(cap)
}

fn process_packets(
    cap: &mut Capture<Active>,
    sender: &Sender<TrafficEvent>,
    running: &AtomicBool,
) -> Result<CaptureStats, CaptureError> {
    let mut stats = CaptureStats::default();

    while running.load(Ordering::SeqCst) {
        let packet = match cap.next_packet() {
            Ok(packet) => packet,
            Err(pcap::Error::TimeoutExpired) => continue,
            Err(e) => return Err(e.into()),
        };
        stats.frames += 1;

        match parse_frame(packet.data) {
            Some(event) => {
                if sender.send(event).is_err() {
                    warn!("event channel closed, stopping capture");
                    break;
                }
                stats.forwarded += 1;
            }
            None => {
                stats.skipped += 1;
                trace!(len = packet.data.len(), "skipped non-IP frame");
            }
        }
    }

    info!(
        frames = stats.frames,
        forwarded = stats.forwarded,
        skipped = stats.skipped,
        "capture stopped"
    );
    Ok(stats)
}
