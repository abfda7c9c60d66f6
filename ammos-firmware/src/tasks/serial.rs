//! Host serial tasks
//!
//! The RX task accumulates raw UART bytes into newline-terminated lines
//! and forwards them to the control task. The TX task renders
//! acknowledgement tokens and writes them back to the host.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embedded_io_async::{Read, Write};
use heapless::String;

use ammos_protocol::{Ack, MAX_LINE_LEN};

use crate::channels::{ACK_CHANNEL, LINE_CHANNEL};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Serial RX task - accumulates lines from the host
#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx) {
    info!("Serial RX task started");

    let mut line: String<MAX_LINE_LEN> = String::new();
    let mut overflowed = false;
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match byte {
                        b'\n' => {
                            if overflowed {
                                // The line exceeded the wire limit; reject it
                                // whole rather than parse a truncated tail
                                warn!("Oversized line dropped");
                                if ACK_CHANNEL.try_send(Ack::ignored(line.as_str())).is_err() {
                                    warn!("Ack channel full, dropping IGNORED");
                                }
                            } else if !line.is_empty()
                                && LINE_CHANNEL.try_send(line.clone()).is_err()
                            {
                                // Still owe the host a token for this line
                                warn!("Line channel full, dropping line");
                                if ACK_CHANNEL.try_send(Ack::ignored(line.as_str())).is_err() {
                                    warn!("Ack channel full, dropping IGNORED");
                                }
                            }
                            line.clear();
                            overflowed = false;
                        }
                        b'\r' => {}
                        _ => {
                            if line.push(byte as char).is_err() {
                                overflowed = true;
                            }
                        }
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

/// Serial TX task - renders and sends acknowledgements
///
/// Announces `READY` once at startup so the host knows the controller
/// rebooted and must re-home before streaming paths.
#[embassy_executor::task]
pub async fn serial_tx_task(mut tx: BufferedUartTx) {
    info!("Serial TX task started");

    send_line(&mut tx, "READY").await;

    loop {
        let ack = ACK_CHANNEL.receive().await;
        let rendered = ack.render();
        send_line(&mut tx, rendered.as_str()).await;
    }
}

/// Write one line followed by CRLF
async fn send_line(tx: &mut BufferedUartTx, text: &str) {
    if let Err(e) = tx.write_all(text.as_bytes()).await {
        warn!("UART write error: {:?}", e);
        return;
    }
    if let Err(e) = tx.write_all(b"\r\n").await {
        warn!("UART write error: {:?}", e);
    }
    trace!("TX: {}", text);
}
