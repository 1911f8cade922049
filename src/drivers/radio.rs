// Upstair - ESP-NOW Radio
//
// Connectionless broadcast between watches.  The receive callback runs in the
// Wi-Fi task and hands frames to the receive task through a bounded queue.

use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::sync::Arc;

use anyhow::Context;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::espnow::{EspNow, PeerInfo};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{ClientConfiguration, Configuration, EspWifi};

use upstair::config::*;
use upstair::events::{Message, Received};
use upstair::platform::RadioReceiver;

/// Frames buffered between the Wi-Fi task and the receive task.
const RX_QUEUE_LEN: usize = 8;

/// Transmit half, owned by the board.
pub struct RadioTx {
    espnow: Arc<EspNow<'static>>,
}

/// Receive half, owned by the receive task.
pub struct RadioRx {
    rx: Receiver<Received>,
    pending: Option<Received>,
}

/// Bring up Wi-Fi in station mode (no association) and ESP-NOW on top of it.
/// The returned driver must stay alive for the radio to keep working.
pub fn start(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
) -> anyhow::Result<(EspWifi<'static>, RadioTx, RadioRx)> {
    let mut wifi = EspWifi::new(modem, sysloop, Some(nvs)).context("Wi-Fi driver")?;
    wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
    wifi.start().context("Wi-Fi start")?;

    let espnow = Arc::new(EspNow::take().context("ESP-NOW init")?);

    let peer = PeerInfo {
        peer_addr: BROADCAST_ADDR,
        channel: 0,
        encrypt: false,
        ..Default::default()
    };
    espnow.add_peer(peer).context("ESP-NOW broadcast peer")?;

    let (tx, rx): (SyncSender<Received>, _) = mpsc::sync_channel(RX_QUEUE_LEN);
    espnow.register_recv_cb(move |info, data| {
        let received = Received {
            sender: *info.src_addr,
            message: Message::from_payload(data),
        };
        // Queue full: the frame is lost, same as an overflowing radio FIFO.
        let _ = tx.try_send(received);
    })?;

    log::info!("ESP-NOW ready");
    Ok((wifi, RadioTx { espnow }, RadioRx { rx, pending: None }))
}

impl RadioTx {
    pub fn broadcast(&self, payload: &[u8]) -> anyhow::Result<()> {
        self.espnow.send(BROADCAST_ADDR, payload)?;
        Ok(())
    }
}

impl RadioReceiver for RadioRx {
    fn receive_flag(&mut self) -> bool {
        if self.pending.is_none() {
            match self.rx.try_recv() {
                Ok(received) => self.pending = Some(received),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => {}
            }
        }
        self.pending.is_some()
    }

    fn receive(&mut self) -> Option<Received> {
        self.receive_flag();
        self.pending.take()
    }
}
