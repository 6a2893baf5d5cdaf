//! Request/response exchanges with a single bulb.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use log::debug;

use crate::codec::{self, Command, Reply};
use crate::config::SystemConfig;
use crate::errors::Error;
use crate::pilot::Pilot;
use crate::runtime::{self, AsyncUdpSocket, UdpSocket};
use crate::scenes::{SceneMode, ScenePresetStore};
use crate::snapshot::StateSnapshot;
use crate::types::{Brightness, Color, Kelvin};

type Result<T> = std::result::Result<T, Error>;

/// One addressable WiZ bulb.
///
/// A handle is identified by the bulb's MAC address and talks to a fixed
/// socket address. Every call is a single connectionless exchange: one
/// request datagram, at most one reply, no retries. Calls on different
/// handles are independent. Calls on the same handle are not serialized
/// here; a caller that needs strict per-device ordering must await each
/// call before issuing the next.
///
/// # Example
///
/// ```
/// use std::net::Ipv4Addr;
/// use wizard_lights::DeviceHandle;
///
/// let bulb = DeviceHandle::new("a8bb50aabbcc", Ipv4Addr::new(192, 168, 1, 100));
/// assert_eq!(bulb.addr().port(), DeviceHandle::PORT);
/// assert!(bulb.last_known().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct DeviceHandle {
    mac: String,
    addr: SocketAddr,
    timeout: Duration,
    last_known: Option<StateSnapshot>,
}

impl DeviceHandle {
    /// UDP port the bulbs listen on.
    pub const PORT: u16 = 38899;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);
    const RECV_BUFFER: usize = 4096;

    pub fn new(mac: &str, ip: Ipv4Addr) -> Self {
        Self::with_addr(mac, SocketAddr::new(IpAddr::V4(ip), Self::PORT))
    }

    /// Create a handle for a bulb listening on a non-standard address.
    pub fn with_addr(mac: &str, addr: SocketAddr) -> Self {
        DeviceHandle {
            mac: mac.to_string(),
            addr,
            timeout: Self::DEFAULT_TIMEOUT,
            last_known: None,
        }
    }

    /// Replace the timeout used by the convenience methods.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn mac(&self) -> &str {
        &self.mac
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn ip(&self) -> IpAddr {
        self.addr.ip()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The snapshot stored by the last [`refresh`](Self::refresh), if any.
    ///
    /// This is a display hint only; the bulb may have changed since.
    pub fn last_known(&self) -> Option<&StateSnapshot> {
        self.last_known.as_ref()
    }

    /// Send one command and wait for its reply.
    ///
    /// Fails with [`Error::InvalidCommand`] before anything is sent when the
    /// command cannot be encoded, [`Error::DeviceUnreachable`] when nothing
    /// arrives within `timeout`, and [`Error::DeviceProtocolError`] when the
    /// reply cannot be decoded.
    pub async fn send(&self, command: &Command, timeout: Duration) -> Result<Reply> {
        let request = codec::encode(command)?;
        debug!(
            "{} -> {}: {}",
            self.mac,
            self.addr,
            String::from_utf8_lossy(&request)
        );

        let response = self.exchange(&request, timeout).await?;
        debug!(
            "{} <- {}: {}",
            self.mac,
            self.addr,
            String::from_utf8_lossy(&response)
        );

        codec::decode_reply(command, &response)
    }

    pub async fn turn_off(&self) -> Result<()> {
        self.execute(&Command::TurnOff).await
    }

    /// Turn the light on with the settings it had before it was switched off.
    pub async fn turn_on(&self) -> Result<()> {
        self.execute(&Command::TurnOn).await
    }

    pub async fn set_color(&self, color: &Color, brightness: &Brightness) -> Result<()> {
        self.execute(&Command::set_color(color, brightness)).await
    }

    /// Start a scene by its display name, e.g. `"Ocean"`.
    pub async fn set_scene(&self, name: &str) -> Result<()> {
        let id = ScenePresetStore::builtin().lookup(name)?;
        self.execute(&Command::set_scene(id)).await
    }

    pub async fn set_scene_mode(&self, scene: &SceneMode) -> Result<()> {
        self.execute(&Command::set_scene(scene.id())).await
    }

    /// Switch to tunable white at the given colour temperature.
    pub async fn set_temperature(&self, temp: &Kelvin, brightness: &Brightness) -> Result<()> {
        let mut pilot = Pilot::from(temp);
        pilot.brightness(brightness);
        self.set_pilot(&pilot).await
    }

    pub async fn set_pilot(&self, pilot: &Pilot) -> Result<()> {
        self.execute(&Command::SetPilot(pilot.clone())).await
    }

    /// Send a command that only expects an acknowledgment.
    pub async fn execute(&self, command: &Command) -> Result<()> {
        self.send(command, self.timeout).await.map(|_| ())
    }

    /// Query the bulb for its current state. Nothing is cached.
    pub async fn query_state(&self) -> Result<StateSnapshot> {
        self.send(&Command::QueryState, self.timeout)
            .await?
            .into_state()
    }

    /// Query the bulb and keep the result as [`last_known`](Self::last_known).
    pub async fn refresh(&mut self) -> Result<&StateSnapshot> {
        let snapshot = self.query_state().await?;
        Ok(&*self.last_known.insert(snapshot))
    }

    pub async fn system_config(&self) -> Result<SystemConfig> {
        self.send(&Command::QuerySystemConfig, self.timeout)
            .await?
            .into_system_config()
    }

    /// One request datagram, one reply datagram. The socket is dropped on
    /// every return path, so a timed-out exchange leaves no listener behind.
    async fn exchange(&self, request: &[u8], timeout: Duration) -> Result<Vec<u8>> {
        let local = match self.addr {
            SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| Error::socket("bind", e))?;

        socket
            .connect(self.addr)
            .await
            .map_err(|e| Error::socket("connect", e))?;

        socket
            .send(request)
            .await
            .map_err(|e| Error::socket("send", e))?;

        let mut buffer = [0u8; Self::RECV_BUFFER];
        let received = runtime::timeout(timeout, socket.recv(&mut buffer)).await;
        drop(socket);

        let bytes = received
            .map_err(|_| Error::DeviceUnreachable {
                addr: self.addr,
                timeout,
            })?
            .map_err(|e| {
                if is_unreachable(&e) {
                    Error::DeviceUnreachable {
                        addr: self.addr,
                        timeout,
                    }
                } else {
                    Error::socket("receive", e)
                }
            })?;

        Ok(buffer[..bytes].to_vec())
    }
}

/// Receive errors that report an ICMP unreachable for the connected peer.
fn is_unreachable(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkUnreachable
    )
}
