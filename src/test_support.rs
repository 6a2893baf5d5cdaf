//! Loopback stand-ins for bulbs, answering with literal JSON fixtures.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub(crate) mod fixtures {
    pub(crate) const RED_80: &str = r#"{"method":"getPilot","env":"pro","result":{"mac":"a8bb50aabbcc","rssi":-55,"state":true,"sceneId":0,"r":255,"g":0,"b":0,"c":0,"w":0,"dimming":80}}"#;
    pub(crate) const OCEAN: &str = r#"{"method":"getPilot","env":"pro","result":{"mac":"a8bb50ddeeff","rssi":-70,"state":true,"sceneId":1,"speed":100,"dimming":60}}"#;
}

async fn bind_loopback() -> UdpSocket {
    UdpSocket::bind("127.0.0.1:0").await.unwrap()
}

/// A bulb that answers `registration`, `getPilot`, `getSystemConfig` and
/// `setPilot`, and forwards the params of every `setPilot` it receives.
pub(crate) struct FakeBulb {
    mac: String,
    socket: Arc<UdpSocket>,
    set_pilots: mpsc::UnboundedReceiver<Value>,
    task: JoinHandle<()>,
}

impl FakeBulb {
    pub(crate) async fn start(mac: &str, state_reply: &str) -> Self {
        let socket = Arc::new(bind_loopback().await);
        let (tx, set_pilots) = mpsc::unbounded_channel();
        let task = tokio::spawn(serve(
            Arc::clone(&socket),
            mac.to_string(),
            state_reply.to_string(),
            tx,
        ));
        FakeBulb {
            mac: mac.to_string(),
            socket,
            set_pilots,
            task,
        }
    }

    pub(crate) fn addr(&self) -> SocketAddr {
        self.socket.local_addr().unwrap()
    }

    pub(crate) async fn next_set_pilot(&mut self) -> Value {
        tokio::time::timeout(Duration::from_secs(1), self.set_pilots.recv())
            .await
            .expect("no setPilot within 1s")
            .expect("bulb task stopped")
    }

    pub(crate) fn try_next_set_pilot(&mut self) -> Option<Value> {
        self.set_pilots.try_recv().ok()
    }

    /// A reply this bulb would send to a discovery probe, `copies` times.
    pub(crate) fn probe_answer(&self, copies: usize) -> ProbeAnswer {
        ProbeAnswer {
            socket: Arc::clone(&self.socket),
            body: registration_reply(&self.mac),
            copies,
        }
    }
}

impl Drop for FakeBulb {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn registration_reply(mac: &str) -> Vec<u8> {
    json!({"method": "registration", "env": "pro", "result": {"mac": mac, "success": true}})
        .to_string()
        .into_bytes()
}

async fn serve(
    socket: Arc<UdpSocket>,
    mac: String,
    state_reply: String,
    set_pilots: mpsc::UnboundedSender<Value>,
) {
    let mut buffer = [0u8; 4096];
    while let Ok((size, peer)) = socket.recv_from(&mut buffer).await {
        let Ok(request) = serde_json::from_slice::<Value>(&buffer[..size]) else {
            continue;
        };
        let reply = match request["method"].as_str() {
            Some("registration") => registration_reply(&mac),
            Some("getPilot") => state_reply.clone().into_bytes(),
            Some("getSystemConfig") => json!({
                "method": "getSystemConfig",
                "env": "pro",
                "result": {"mac": mac, "moduleName": "ESP01_SHRGB1C_31", "fwVersion": "1.25.0"}
            })
            .to_string()
            .into_bytes(),
            Some("setPilot") => {
                let _ = set_pilots.send(request["params"].clone());
                br#"{"method":"setPilot","env":"pro","result":{"success":true}}"#.to_vec()
            }
            _ => continue,
        };
        let _ = socket.send_to(&reply, peer).await;
    }
}

/// A bound socket that never reads or answers.
pub(crate) struct SilentBulb {
    socket: UdpSocket,
}

impl SilentBulb {
    pub(crate) async fn start() -> Self {
        SilentBulb {
            socket: bind_loopback().await,
        }
    }

    pub(crate) fn addr(&self) -> SocketAddr {
        self.socket.local_addr().unwrap()
    }
}

pub(crate) struct ProbeAnswer {
    socket: Arc<UdpSocket>,
    body: Vec<u8>,
    copies: usize,
}

impl ProbeAnswer {
    /// An answer with a custom body, sent from its own socket.
    pub(crate) async fn raw(body: &[u8]) -> Self {
        ProbeAnswer {
            socket: Arc::new(bind_loopback().await),
            body: body.to_vec(),
            copies: 1,
        }
    }
}

/// Stands in for the subnet broadcast address: when a probe arrives, every
/// answer is sent to the prober from its own bulb socket, so each answer
/// has a distinct origin.
pub(crate) struct ProbeResponder {
    socket: Arc<UdpSocket>,
    task: JoinHandle<()>,
}

impl ProbeResponder {
    pub(crate) async fn start(answers: Vec<ProbeAnswer>) -> Self {
        let socket = Arc::new(bind_loopback().await);
        let listener = Arc::clone(&socket);
        let task = tokio::spawn(async move {
            let mut buffer = [0u8; 4096];
            let Ok((size, prober)) = listener.recv_from(&mut buffer).await else {
                return;
            };
            let probe: Value = serde_json::from_slice(&buffer[..size]).unwrap_or(Value::Null);
            if probe["method"] != "registration" {
                return;
            }
            for answer in &answers {
                for _ in 0..answer.copies {
                    let _ = answer.socket.send_to(&answer.body, prober).await;
                }
            }
        });
        ProbeResponder { socket, task }
    }

    pub(crate) fn addr(&self) -> SocketAddr {
        self.socket.local_addr().unwrap()
    }
}

impl Drop for ProbeResponder {
    fn drop(&mut self) {
        self.task.abort();
    }
}
