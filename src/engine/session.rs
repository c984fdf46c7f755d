//! Owns the socket, the receive framer, and the outbound message builder
//! for one FIX session. Connect/login/logout and the throttled send path
//! live here; message interpretation is the strategy's job.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::os::unix::io::AsRawFd;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::framer::ReceiveFramer;
use crate::orders::{Order, SingleQuote};
use crate::socket_tuning;
use crate::throttle::Throttle;
use crate::wire::{FixMessageBuilder, FixReader};

pub struct Session {
    stream: TcpStream,
    framer: ReceiveFramer,
    builder: FixMessageBuilder,
    throttle: Throttle,
    next_seq_num: u64,
    instrument: String,
    running: bool,
}

impl Session {
    /// `colo` connects directly to a pre-resolved address (no DNS lookup,
    /// matching the colocated deployment path); otherwise `host:port` is
    /// resolved normally. `throttle_interval`/`throttle_capacity` size the
    /// outbound send window — convergence uses a tighter 200ms window than
    /// the other strategies (see the per-binary throttle constants).
    pub fn connect(
        host: &str,
        port: &str,
        colo: bool,
        sender_comp_id: &str,
        instrument: &str,
        throttle_interval: Duration,
        throttle_capacity: u32,
    ) -> anyhow::Result<Self> {
        let stream = if colo {
            let addr = format!("{host}:{port}");
            let resolved = addr
                .to_socket_addrs()?
                .next()
                .ok_or_else(|| anyhow::anyhow!("could not resolve colo address {addr}"))?;
            TcpStream::connect(resolved)?
        } else {
            TcpStream::connect((host, port.parse::<u16>()?))?
        };

        let report = socket_tuning::tune(stream.as_raw_fd());
        tracing::info!(?report, "session connected");

        Ok(Session {
            stream,
            framer: ReceiveFramer::new(),
            builder: FixMessageBuilder::new(sender_comp_id),
            throttle: Throttle::new(throttle_interval, throttle_capacity),
            next_seq_num: 1,
            instrument: instrument.to_string(),
            running: true,
        })
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn login(&mut self, username: &str, secret: &str, heartbeat_secs: u32) -> anyhow::Result<()> {
        let now_ms = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis() as u64;
        let seq = self.next_seq_num;
        let msg = self.builder.login(seq, username, secret, heartbeat_secs, now_ms).to_string();
        self.send_raw(&msg)?;

        let response = self.force_receive()?;
        let reader = FixReader::parse(&response);
        anyhow::ensure!(reader.is_message_type("A"), "login unsuccessful: {response}");
        tracing::info!("login successful");
        Ok(())
    }

    pub fn stop(&mut self) -> anyhow::Result<()> {
        if !self.running {
            return Ok(());
        }
        self.running = false;
        let seq = self.next_seq_num;
        let msg = self.builder.logout(seq).to_string();
        self.send_raw(&msg).ok();
        self.stream.shutdown(std::net::Shutdown::Both).ok();
        Ok(())
    }

    pub fn heartbeat(&mut self, test_req_id: Option<&str>) -> anyhow::Result<()> {
        let seq = self.next_seq_num;
        let msg = self.builder.heartbeat(seq, test_req_id).to_string();
        self.send_raw(&msg)
    }

    pub fn market_data_request_top_level(&mut self) -> anyhow::Result<()> {
        let seq = self.next_seq_num;
        let instrument = self.instrument.clone();
        let msg = self.builder.market_data_request_top_level(seq, &instrument).to_string();
        self.send_raw(&msg)
    }

    pub fn send_quote<const PP: u32, const VP: u32>(&mut self, quote: &SingleQuote<PP, VP>) -> anyhow::Result<()> {
        let seq = self.next_seq_num;
        let instrument = self.instrument.clone();
        let msg = self.builder.new_order_single(seq, &instrument, quote).to_string();
        self.send_raw(&msg)
    }

    pub fn cancel_quote(&mut self, order_id: &str) -> anyhow::Result<()> {
        let seq = self.next_seq_num;
        let instrument = self.instrument.clone();
        let msg = self.builder.order_cancel_request(seq, &instrument, order_id).to_string();
        self.send_raw(&msg)
    }

    /// Sends `order` as a limit `NewOrderSingle` against its own symbol
    /// (used by strategies that juggle more than one instrument at once).
    pub fn send_order<const PP: u32, const VP: u32>(&mut self, order: &Order<PP, VP>) -> anyhow::Result<()> {
        let seq = self.next_seq_num;
        let msg = self.builder.new_order_single_from_order(seq, order).to_string();
        self.send_raw(&msg)
    }

    pub fn send_market_order<const PP: u32, const VP: u32>(&mut self, order: &Order<PP, VP>) -> anyhow::Result<()> {
        let seq = self.next_seq_num;
        let msg = self.builder.new_market_order_single(seq, order).to_string();
        self.send_raw(&msg)
    }

    pub fn cancel_order(&mut self, symbol: &str, orig_cl_ord_id: &str) -> anyhow::Result<()> {
        let seq = self.next_seq_num;
        let msg = self.builder.order_cancel_request(seq, symbol, orig_cl_ord_id).to_string();
        self.send_raw(&msg)
    }

    fn send_raw(&mut self, msg: &str) -> anyhow::Result<()> {
        self.throttle.force_send(1);
        self.stream.write_all(msg.as_bytes())?;
        self.next_seq_num += 1;
        Ok(())
    }

    /// Returns a buffered-but-unconsumed message without touching the
    /// socket, or `None` if the framer has nothing pending.
    pub fn try_take_buffered(&mut self) -> Option<String> {
        self.framer.take_message(0).map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Blocks until a complete message is framed.
    pub fn force_receive(&mut self) -> anyhow::Result<String> {
        if let Some(msg) = self.try_take_buffered() {
            return Ok(msg);
        }

        loop {
            let region = self.framer.writable_region();
            let n = self.stream.read(region)?;
            anyhow::ensure!(n > 0, "connection closed by peer");
            if let Some(bytes) = self.framer.take_message(n) {
                return Ok(String::from_utf8_lossy(bytes).into_owned());
            }
        }
    }
}
