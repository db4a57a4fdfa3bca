//! Device selectors: the first query of every handshake.

use std::fmt;
use std::str::FromStr;

use crate::error::TetherError;

/// Which device or emulator subsequent requests on a connection target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Selector {
    /// `host-serial:<serial>[:<port>]`
    Serial { serial: String, port: Option<u16> },
    /// `host:transport:<transport-id>`
    Transport(String),
    /// `host:transport-usb`
    Usb,
    /// `host:transport-local`
    Local,
    /// `host:transport-any`
    #[default]
    Any,
    /// `host:transport-id:<id>`
    TransportId(u64),
    /// Any other query, sent verbatim.
    Custom(String),
}

impl Selector {
    pub fn serial(serial: impl Into<String>) -> Self {
        Self::Serial {
            serial: serial.into(),
            port: None,
        }
    }

    /// Destination for the features query on this selector.
    ///
    /// `host:transport…` selectors move into the `host-transport…`
    /// namespace; everything else just gains a `:features` suffix.
    pub fn features_destination(&self) -> String {
        let query = self.to_string();
        match query.strip_prefix("host:transport") {
            Some(rest) => format!("host-transport{rest}:features"),
            None => format!("{query}:features"),
        }
    }

    /// Human-readable name: the query without its namespace prefix.
    pub fn display_name(&self) -> String {
        let query = self.to_string();
        let name = query
            .strip_prefix("host-serial:")
            .or_else(|| query.strip_prefix("host:"))
            .unwrap_or(&query);
        name.strip_prefix("transport:").unwrap_or(name).to_string()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial { serial, port: None } => write!(f, "host-serial:{serial}"),
            Self::Serial {
                serial,
                port: Some(port),
            } => write!(f, "host-serial:{serial}:{port}"),
            Self::Transport(id) => write!(f, "host:transport:{id}"),
            Self::Usb => f.write_str("host:transport-usb"),
            Self::Local => f.write_str("host:transport-local"),
            Self::Any => f.write_str("host:transport-any"),
            Self::TransportId(id) => write!(f, "host:transport-id:{id}"),
            Self::Custom(query) => f.write_str(query),
        }
    }
}

impl FromStr for Selector {
    type Err = TetherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TetherError::InvalidSelector(s.to_string());

        match s {
            "" => return Err(invalid()),
            "host:transport-usb" => return Ok(Self::Usb),
            "host:transport-local" => return Ok(Self::Local),
            "host:transport-any" => return Ok(Self::Any),
            _ => {}
        }

        if let Some(id) = s.strip_prefix("host:transport-id:") {
            return id.parse().map(Self::TransportId).map_err(|_| invalid());
        }
        if let Some(id) = s.strip_prefix("host:transport:") {
            if id.is_empty() {
                return Err(invalid());
            }
            return Ok(Self::Transport(id.to_string()));
        }
        if let Some(rest) = s.strip_prefix("host-serial:") {
            let (serial, port) = match rest.rsplit_once(':') {
                Some((serial, port)) => match port.parse::<u16>() {
                    Ok(port) => (serial, Some(port)),
                    Err(_) => (rest, None),
                },
                None => (rest, None),
            };
            if serial.is_empty() {
                return Err(invalid());
            }
            return Ok(Self::Serial {
                serial: serial.to_string(),
                port,
            });
        }

        Ok(Self::Custom(s.to_string()))
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_every_variant() {
        assert_eq!(Selector::serial("abc").to_string(), "host-serial:abc");
        assert_eq!(
            Selector::Serial {
                serial: "emulator".into(),
                port: Some(5554)
            }
            .to_string(),
            "host-serial:emulator:5554"
        );
        assert_eq!(Selector::Transport("7".into()).to_string(), "host:transport:7");
        assert_eq!(Selector::Usb.to_string(), "host:transport-usb");
        assert_eq!(Selector::Local.to_string(), "host:transport-local");
        assert_eq!(Selector::Any.to_string(), "host:transport-any");
        assert_eq!(Selector::TransportId(5).to_string(), "host:transport-id:5");
        assert_eq!(Selector::default(), Selector::Any);
    }

    #[test]
    fn parses_what_it_renders() {
        for query in [
            "host-serial:abc",
            "host-serial:emulator:5554",
            "host:transport:7",
            "host:transport-usb",
            "host:transport-local",
            "host:transport-any",
            "host:transport-id:42",
            "host:tport:serial:xyz",
        ] {
            let selector: Selector = query.parse().unwrap();
            assert_eq!(selector.to_string(), query);
        }
        assert_eq!(
            "host:transport-id:42".parse::<Selector>().unwrap(),
            Selector::TransportId(42)
        );
    }

    #[test]
    fn rejects_broken_selectors() {
        assert!("".parse::<Selector>().is_err());
        assert!("host:transport-id:abc".parse::<Selector>().is_err());
        assert!("host:transport:".parse::<Selector>().is_err());
        assert!("host-serial:".parse::<Selector>().is_err());
    }

    #[test]
    fn features_destination_rewrites_transport_namespace() {
        assert_eq!(
            Selector::Transport("7".into()).features_destination(),
            "host-transport:7:features"
        );
        assert_eq!(
            Selector::Any.features_destination(),
            "host-transport-any:features"
        );
        assert_eq!(
            Selector::TransportId(3).features_destination(),
            "host-transport-id:3:features"
        );
        assert_eq!(
            Selector::serial("59652cce").features_destination(),
            "host-serial:59652cce:features"
        );
    }

    #[test]
    fn display_name_strips_prefixes() {
        assert_eq!(Selector::serial("59652cce").display_name(), "59652cce");
        assert_eq!(Selector::Transport("abc".into()).display_name(), "abc");
        assert_eq!(Selector::Usb.display_name(), "transport-usb");
        assert_eq!(Selector::TransportId(5).display_name(), "transport-id:5");
    }
}
