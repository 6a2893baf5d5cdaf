//! Device discovery via UDP broadcast.

use std::collections::HashSet;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use log::{debug, warn};

use crate::codec;
use crate::device::DeviceHandle;
use crate::errors::Error;
use crate::runtime::{self, AsyncUdpSocket, Instant, UdpSocket};

type Result<T> = std::result::Result<T, Error>;

/// A single discovery run: one probe, then replies collected until the
/// window closes.
///
/// # Examples
///
/// ```no_run
/// use std::net::Ipv4Addr;
/// use std::time::Duration;
/// use wizard_lights::Discovery;
///
/// # async fn run() -> Result<(), wizard_lights::Error> {
/// let bulbs = Discovery::new(Ipv4Addr::new(192, 168, 1, 255))
///     .window(Duration::from_secs(2))
///     .run()
///     .await?;
/// for bulb in &bulbs {
///     println!("{} at {}", bulb.mac(), bulb.addr());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Discovery {
    broadcast: Ipv4Addr,
    port: u16,
    window: Duration,
    device_timeout: Duration,
}

impl Discovery {
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5);

    pub fn new(broadcast: Ipv4Addr) -> Self {
        Discovery {
            broadcast,
            port: DeviceHandle::PORT,
            window: Self::DEFAULT_WINDOW,
            device_timeout: DeviceHandle::DEFAULT_TIMEOUT,
        }
    }

    /// Port the probe is sent to.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// How long to keep listening for replies after the probe is sent.
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Request timeout given to every returned handle.
    pub fn device_timeout(mut self, timeout: Duration) -> Self {
        self.device_timeout = timeout;
        self
    }

    /// Broadcast the probe and collect one handle per responding address,
    /// in arrival order.
    ///
    /// Only failures to bind, enable broadcast or send the probe are errors.
    /// Replies that cannot be parsed or carry no MAC are skipped, and a
    /// window with no replies yields an empty list.
    pub async fn run(&self) -> Result<Vec<DeviceHandle>> {
        debug!("discovery idle: probing {}:{}", self.broadcast, self.port);

        let socket = UdpSocket::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0))
            .await
            .map_err(|e| Error::discovery("bind", e))?;
        socket
            .set_broadcast(true)
            .map_err(|e| Error::discovery("set_broadcast", e))?;

        let probe = codec::encode_probe()?;
        let target = SocketAddr::new(IpAddr::V4(self.broadcast), self.port);
        debug!("discovery broadcasting to {target}");
        socket
            .send_to(&probe, target)
            .await
            .map_err(|e| Error::discovery("send_to", e))?;

        debug!("discovery collecting for {:?}", self.window);
        let handles = self.collect(&socket).await;
        debug!("discovery complete: {} device(s)", handles.len());
        Ok(handles)
    }

    async fn collect(&self, socket: &UdpSocket) -> Vec<DeviceHandle> {
        let started = Instant::now();
        let mut seen = HashSet::new();
        let mut handles = Vec::new();
        let mut buffer = [0u8; 4096];

        loop {
            let Some(remaining) = self.window.checked_sub(started.elapsed()) else {
                break;
            };
            let (size, origin) =
                match runtime::timeout(remaining, socket.recv_from(&mut buffer)).await {
                    Ok(Ok(received)) => received,
                    Ok(Err(e)) if is_stray_error(&e) => {
                        debug!("discovery receive interrupted: {e}");
                        continue;
                    }
                    Ok(Err(e)) => {
                        warn!("discovery receive failed, ending collection early: {e}");
                        break;
                    }
                    Err(_) => break,
                };

            if seen.contains(&origin) {
                debug!("duplicate reply from {origin}");
                continue;
            }
            match codec::decode_probe_reply(&buffer[..size]) {
                Ok(mac) => {
                    debug!("found {mac} at {origin}");
                    seen.insert(origin);
                    handles.push(
                        DeviceHandle::with_addr(&mac, origin).with_timeout(self.device_timeout),
                    );
                }
                Err(e) => warn!("skipping reply from {origin}: {e}"),
            }
        }

        handles
    }
}

/// One-shot receive errors, such as an ICMP reply to the probe surfacing on
/// the next read. Anything else would repeat on every read.
fn is_stray_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
    )
}

/// Discover bulbs with the default port and request timeout.
///
/// `broadcast` is the subnet's broadcast address (or `255.255.255.255`).
pub async fn discover(broadcast: Ipv4Addr, window: Duration) -> Result<Vec<DeviceHandle>> {
    Discovery::new(broadcast).window(window).run().await
}
