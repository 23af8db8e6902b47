//! Serial reader thread feeding byte chunks to the consume loop.
//!
//! The thread owns the port; everything downstream sees only the channel.
//! Chunks are forwarded exactly as read, in order. Framing is entirely
//! the pipeline's job.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::io::Read;
use std::time::Duration;
use tracing::{error, info, warn};

/// Message from the reader thread to the consume loop.
#[derive(Debug)]
pub enum SerialEvent {
    /// Bytes read from the port, in arrival order.
    Data(Vec<u8>),
    /// The port went away. The pipeline keeps running; liveness notices
    /// the silence on its own.
    Disconnected,
}

/// Spawns the reader thread. Dropping the returned receiver (or a fatal
/// port error with `reconnect` off) ends the thread; the channel
/// disconnecting is the consume loop's shutdown signal.
pub fn spawn_reader_thread(port: String, baud_rate: u32, reconnect: bool) -> Receiver<SerialEvent> {
    let (tx, rx) = bounded::<SerialEvent>(64);

    std::thread::Builder::new()
        .name("serial-reader".into())
        .spawn(move || reader_loop(&tx, &port, baud_rate, reconnect))
        .expect("failed to spawn serial reader thread");

    rx
}

fn reader_loop(tx: &Sender<SerialEvent>, port_path: &str, baud_rate: u32, reconnect: bool) {
    loop {
        match serialport::new(port_path, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(100))
            .open()
        {
            Ok(mut port) => {
                info!("Reading {port_path} at {baud_rate} baud (8N1)");

                let mut buf = [0u8; 4096];
                loop {
                    match port.read(&mut buf) {
                        Ok(0) => {}
                        Ok(n) => {
                            // Blocking send: the channel is bounded, and a
                            // dropped chunk would desync the framer until
                            // the next sentinel pair.
                            if tx.send(SerialEvent::Data(buf[..n].to_vec())).is_err() {
                                return; // consume loop is gone
                            }
                        }
                        Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => {
                            // Quiet line, keep listening
                        }
                        Err(e) => {
                            warn!("Read failed on {port_path}: {e}");
                            let _ = tx.send(SerialEvent::Disconnected);
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                error!("Could not open {port_path}: {e}");
            }
        }

        if !reconnect {
            return;
        }
        std::thread::sleep(Duration::from_secs(2));
    }
}
