//! Wire format of the WiZ UDP protocol.
//!
//! Requests are JSON objects of the form `{"method": ..., "params": {...}}`
//! and replies carry either a `result` object or an `error` object. Every
//! function here is a pure transform over bytes; sockets live in
//! [`crate::DeviceHandle`] and [`crate::Discovery`].

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::config::SystemConfig;
use crate::errors::Error;
use crate::pilot::Pilot;
use crate::snapshot::{PilotResult, StateSnapshot};
use crate::types::{Brightness, Color};

type Result<T> = std::result::Result<T, Error>;

/// A single request to a bulb.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Switch the light off.
    TurnOff,
    /// Switch the light on with its previous settings.
    TurnOn,
    /// Switch the light on with the given settings.
    SetPilot(Pilot),
    /// Read the current state (`getPilot`).
    QueryState,
    /// Read MAC, module name and firmware version (`getSystemConfig`).
    QuerySystemConfig,
}

impl Command {
    pub fn set_color(color: &Color, brightness: &Brightness) -> Self {
        let mut pilot = Pilot::from(color);
        pilot.brightness(brightness);
        Command::SetPilot(pilot)
    }

    pub fn set_scene(scene_id: u16) -> Self {
        let mut pilot = Pilot::new();
        pilot.scene_id(scene_id);
        Command::SetPilot(pilot)
    }

    pub fn method(&self) -> &'static str {
        match self {
            Command::TurnOff | Command::TurnOn | Command::SetPilot(_) => "setPilot",
            Command::QueryState => "getPilot",
            Command::QuerySystemConfig => "getSystemConfig",
        }
    }

    fn params(&self) -> Result<Params<'_>> {
        let params = match self {
            Command::TurnOff => Params::state(false, &Pilot::EMPTY),
            Command::TurnOn => Params::state(true, &Pilot::EMPTY),
            Command::SetPilot(pilot) => {
                pilot.validate()?;
                Params::state(true, pilot)
            }
            Command::QueryState | Command::QuerySystemConfig => Params {
                state: None,
                pilot: &Pilot::EMPTY,
            },
        };
        Ok(params)
    }
}

/// A decoded reply, shaped by the command that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The bulb acknowledged a `setPilot`.
    Ack,
    State(StateSnapshot),
    SystemConfig(SystemConfig),
}

impl Reply {
    pub fn into_state(self) -> Result<StateSnapshot> {
        match self {
            Reply::State(state) => Ok(state),
            other => Err(Error::protocol(format!("expected a state reply, got {other:?}"))),
        }
    }

    pub fn into_system_config(self) -> Result<SystemConfig> {
        match self {
            Reply::SystemConfig(config) => Ok(config),
            other => Err(Error::protocol(format!(
                "expected a system config reply, got {other:?}"
            ))),
        }
    }
}

#[derive(Serialize)]
struct Request<'a> {
    method: &'static str,
    params: Params<'a>,
}

#[serde_with::skip_serializing_none]
#[derive(Serialize)]
struct Params<'a> {
    state: Option<bool>,
    #[serde(flatten)]
    pilot: &'a Pilot,
}

impl<'a> Params<'a> {
    fn state(on: bool, pilot: &'a Pilot) -> Self {
        Params {
            state: Some(on),
            pilot,
        }
    }
}

#[derive(Deserialize)]
struct Response<T> {
    result: Option<T>,
    error: Option<DeviceError>,
}

#[derive(Deserialize)]
struct DeviceError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct Probe {
    method: &'static str,
    params: RegistrationParams,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationParams {
    phone_mac: &'static str,
    register: bool,
    phone_ip: &'static str,
    id: &'static str,
}

#[derive(Deserialize)]
struct RegistrationResult {
    mac: Option<String>,
}

/// Serialize a command into request bytes.
///
/// # Examples
///
/// ```
/// use wizard_lights::{Brightness, Color, Command, codec};
///
/// let cmd = Command::set_color(&Color::rgb(255, 0, 0), &Brightness::create(80).unwrap());
/// let bytes = codec::encode(&cmd).unwrap();
/// let text = String::from_utf8(bytes).unwrap();
/// assert!(text.starts_with(r#"{"method":"setPilot""#));
///
/// // A scene cannot be mixed with a color.
/// let mut both = Command::set_color(&Color::rgb(0, 0, 255), &Brightness::new());
/// if let Command::SetPilot(pilot) = &mut both {
///     pilot.scene_id(1);
/// }
/// assert!(codec::encode(&both).is_err());
/// ```
pub fn encode(command: &Command) -> Result<Vec<u8>> {
    let request = Request {
        method: command.method(),
        params: command.params()?,
    };
    serde_json::to_vec(&request).map_err(Error::JsonDump)
}

/// Parse a `getPilot` reply into a snapshot.
pub fn decode(response: &[u8]) -> Result<StateSnapshot> {
    let result: PilotResult = parse_result(response)?;
    StateSnapshot::try_from(result)
}

/// Check a `setPilot` acknowledgment. Any well-formed reply without an
/// `error` object counts as success.
pub fn decode_ack(response: &[u8]) -> Result<()> {
    parse_envelope::<IgnoredAny>(response).map(|_| ())
}

pub fn decode_system_config(response: &[u8]) -> Result<SystemConfig> {
    parse_result(response)
}

/// Decode the reply that `command` expects.
pub fn decode_reply(command: &Command, response: &[u8]) -> Result<Reply> {
    match command {
        Command::QueryState => decode(response).map(Reply::State),
        Command::QuerySystemConfig => decode_system_config(response).map(Reply::SystemConfig),
        Command::TurnOff | Command::TurnOn | Command::SetPilot(_) => {
            decode_ack(response).map(|_| Reply::Ack)
        }
    }
}

/// The broadcast probe used for discovery.
pub fn encode_probe() -> Result<Vec<u8>> {
    let probe = Probe {
        method: "registration",
        params: RegistrationParams {
            phone_mac: "AAAAAAAAAAAA",
            register: false,
            phone_ip: "1.2.3.4",
            id: "1",
        },
    };
    serde_json::to_vec(&probe).map_err(Error::JsonDump)
}

/// Extract the MAC address from a reply to the discovery probe.
pub fn decode_probe_reply(response: &[u8]) -> Result<String> {
    let result: RegistrationResult = parse_result(response)?;
    result
        .mac
        .filter(|mac| !mac.is_empty())
        .ok_or_else(|| Error::protocol("registration reply has no mac"))
}

fn parse_envelope<T: DeserializeOwned>(response: &[u8]) -> Result<Response<T>> {
    let text = std::str::from_utf8(response)
        .map_err(|e| Error::protocol(format!("reply is not utf-8: {e}")))?;
    let envelope: Response<T> = serde_json::from_str(text)
        .map_err(|e| Error::protocol(format!("malformed reply: {e}")))?;
    if let Some(err) = &envelope.error {
        return Err(Error::protocol(format!(
            "device error {}: {}",
            err.code, err.message
        )));
    }
    Ok(envelope)
}

fn parse_result<T: DeserializeOwned>(response: &[u8]) -> Result<T> {
    parse_envelope(response)?
        .result
        .ok_or_else(|| Error::protocol("reply has no result"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::SceneMode;
    use crate::types::{Kelvin, Speed};
    use serde_json::{Value, json};

    fn encoded(command: &Command) -> Value {
        serde_json::from_slice(&encode(command).unwrap()).unwrap()
    }

    #[test]
    fn test_encode_power() {
        assert_eq!(
            encoded(&Command::TurnOff),
            json!({"method": "setPilot", "params": {"state": false}})
        );
        assert_eq!(
            encoded(&Command::TurnOn),
            json!({"method": "setPilot", "params": {"state": true}})
        );
    }

    #[test]
    fn test_encode_queries() {
        assert_eq!(
            encoded(&Command::QueryState),
            json!({"method": "getPilot", "params": {}})
        );
        assert_eq!(
            encoded(&Command::QuerySystemConfig),
            json!({"method": "getSystemConfig", "params": {}})
        );
    }

    #[test]
    fn test_encode_color_and_scene() {
        let cmd = Command::set_color(&Color::rgb(255, 0, 0), &Brightness::create(80).unwrap());
        assert_eq!(
            encoded(&cmd),
            json!({"method": "setPilot", "params": {"state": true, "r": 255, "g": 0, "b": 0, "dimming": 80}})
        );

        let mut pilot = Pilot::from(&SceneMode::Party);
        pilot.speed(&Speed::create(150).unwrap());
        assert_eq!(
            encoded(&Command::SetPilot(pilot)),
            json!({"method": "setPilot", "params": {"state": true, "sceneId": 4, "speed": 150}})
        );
    }

    #[test]
    fn test_color_echo_reproduces_values() {
        for (r, g, b, dimming) in [(0, 0, 0, 0), (255, 255, 255, 100), (255, 0, 0, 80), (17, 128, 254, 1)] {
            let cmd = Command::set_color(&Color::rgb(r, g, b), &Brightness::create(dimming).unwrap());
            let request = encoded(&cmd);
            let echo = json!({"method": "getPilot", "env": "pro", "result": request["params"]});
            let snapshot = decode(echo.to_string().as_bytes()).unwrap();
            assert!(snapshot.power());
            assert_eq!(snapshot.color(), Some(&Color::rgb(r, g, b)));
            assert_eq!(snapshot.brightness().map(|b| b.value()), Some(dimming));
            assert_eq!(snapshot.scene_id(), None);
        }
    }

    #[test]
    fn test_scene_with_light_mode_is_rejected() {
        let conflicts: [fn(&mut Pilot); 3] = [
            |p: &mut Pilot| p.color(&Color::rgb(1, 2, 3)),
            |p: &mut Pilot| p.brightness(&Brightness::create(0).unwrap()),
            |p: &mut Pilot| p.temp(&Kelvin::create(2700).unwrap()),
        ];
        for scene in [SceneMode::Ocean, SceneMode::Rhythm] {
            for conflict in conflicts {
                let mut pilot = Pilot::from(&scene);
                conflict(&mut pilot);
                let err = encode(&Command::SetPilot(pilot)).unwrap_err();
                assert!(matches!(err, Error::InvalidCommand(_)), "{err}");
            }
        }
    }

    #[test]
    fn test_empty_and_speed_only_rejected() {
        assert!(matches!(
            encode(&Command::SetPilot(Pilot::new())),
            Err(Error::InvalidCommand(_))
        ));
        let mut pilot = Pilot::new();
        pilot.speed(&Speed::new());
        assert!(matches!(
            encode(&Command::SetPilot(pilot)),
            Err(Error::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_decode_color_fixture() {
        let reply = br#"{"method":"getPilot","env":"pro","result":{"mac":"a8bb50aabbcc","rssi":-62,"state":true,"sceneId":0,"r":255,"g":0,"b":0,"c":0,"w":0,"dimming":80}}"#;
        let snapshot = decode(reply).unwrap();
        assert!(snapshot.power());
        assert_eq!(snapshot.mac(), Some("a8bb50aabbcc"));
        assert_eq!(snapshot.color(), Some(&Color::rgb(255, 0, 0)));
        assert_eq!(snapshot.brightness().unwrap().value(), 80);
        assert_eq!(snapshot.scene_id(), None);
        assert_eq!(snapshot.rssi(), Some(-62));
        assert!(snapshot.temp().is_none());
    }

    #[test]
    fn test_decode_scene_fixture_omits_color() {
        let reply = br#"{"method":"getPilot","env":"pro","result":{"mac":"a8bb50aabbcc","state":true,"sceneId":1,"speed":100,"dimming":50}}"#;
        let snapshot = decode(reply).unwrap();
        assert_eq!(snapshot.color(), None);
        assert_eq!(snapshot.scene_id(), Some(1));
        assert_eq!(snapshot.scene(), Some(SceneMode::Ocean));
        assert_eq!(snapshot.scene_name(), Some("Ocean"));
        assert_eq!(snapshot.speed().unwrap().value(), 100);
    }

    #[test]
    fn test_decode_partial_and_special_fields() {
        let off = decode(br#"{"result":{"state":false}}"#).unwrap();
        assert!(!off.power());
        assert!(off.color().is_none() && off.brightness().is_none() && off.mac().is_none());

        let partial = decode(br#"{"result":{"state":true,"r":10,"g":20}}"#).unwrap();
        assert!(partial.color().is_none());

        let rhythm = decode(br#"{"result":{"state":true,"sceneId":0,"schdPsetId":9}}"#).unwrap();
        assert_eq!(rhythm.scene(), Some(SceneMode::Rhythm));

        let white = decode(br#"{"result":{"state":true,"temp":2700,"dimming":100}}"#).unwrap();
        assert_eq!(white.temp().unwrap().kelvin(), 2700);
    }

    #[test]
    fn test_decode_protocol_errors() {
        let bad: [&[u8]; 6] = [
            b"\xff\xfe",
            b"not json",
            br#"{"method":"getPilot","env":"pro"}"#,
            br#"{"result":{"r":255,"g":0,"b":0}}"#,
            br#"{"result":{"state":true,"dimming":150}}"#,
            br#"{"method":"getPilot","error":{"code":-32601,"message":"Method not found"}}"#,
        ];
        for reply in bad {
            assert!(matches!(decode(reply), Err(Error::DeviceProtocolError(_))));
        }
    }

    #[test]
    fn test_decode_ack() {
        assert!(decode_ack(br#"{"method":"setPilot","env":"pro","result":{"success":true}}"#).is_ok());
        assert!(decode_ack(br#"{"method":"setPilot"}"#).is_ok());
        assert!(matches!(
            decode_ack(br#"{"error":{"code":-32600,"message":"Invalid Request"}}"#),
            Err(Error::DeviceProtocolError(_))
        ));
        assert!(decode_ack(b"").is_err());
    }

    #[test]
    fn test_decode_reply_dispatch() {
        let state = br#"{"result":{"state":true}}"#;
        assert!(matches!(decode_reply(&Command::QueryState, state), Ok(Reply::State(_))));
        assert_eq!(decode_reply(&Command::TurnOff, state).unwrap(), Reply::Ack);

        let config = br#"{"method":"getSystemConfig","env":"pro","result":{"mac":"a8bb50aabbcc","homeId":123,"roomId":4,"moduleName":"ESP01_SHRGB1C_31","fwVersion":"1.25.0"}}"#;
        let Reply::SystemConfig(config) = decode_reply(&Command::QuerySystemConfig, config).unwrap() else {
            panic!("expected a system config reply");
        };
        assert_eq!(config.mac, "a8bb50aabbcc");
        assert_eq!(config.fw_version.as_deref(), Some("1.25.0"));
        assert_eq!(config.bulb_class(), Some(crate::config::BulbClass::Rgb));
    }

    #[test]
    fn test_probe() {
        let probe: Value = serde_json::from_slice(&encode_probe().unwrap()).unwrap();
        assert_eq!(probe["method"], "registration");
        assert_eq!(probe["params"]["register"], false);
        assert_eq!(probe["params"]["phoneMac"], "AAAAAAAAAAAA");

        let reply = br#"{"method":"registration","env":"pro","result":{"mac":"a8bb50aabbcc","success":true}}"#;
        assert_eq!(decode_probe_reply(reply).unwrap(), "a8bb50aabbcc");
        assert!(decode_probe_reply(br#"{"method":"registration","result":{"success":true}}"#).is_err());
        assert!(decode_probe_reply(&encode_probe().unwrap()).is_err());
    }
}
