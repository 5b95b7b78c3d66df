//! The game's packet catalog.
//!
//! | Id | Packet | Shape |
//! |---|---|---|
//! | 0 | [`TestPacket`] | `i64` |
//! | 1 | [`LoginPacket`] | `Login{username: str, password: str}` |
//! | 2 | [`PlayerInfoPacket`] | `map<str, any>` |
//! | 3 | sentinel | |

use std::collections::BTreeMap;

use gamewire_registry::{Kind, PacketId, RegistryConfig, RegistryHandle, Shape, TypeRegistry};
use gamewire_value::{Record, Value, ValueError};

use crate::message::{register, Message};

pub const P_TEST: PacketId = PacketId(0);
pub const P_LOGIN: PacketId = PacketId(1);
pub const P_PLAYER_INFO: PacketId = PacketId(2);
/// Upper bound of the catalog; never registered.
pub const P_MAX: PacketId = PacketId(3);

/// Registry config for the catalog: the sentinel is [`P_MAX`].
pub fn registry_config() -> RegistryConfig {
    RegistryConfig {
        sentinel: P_MAX,
        ..RegistryConfig::default()
    }
}

/// A registry holding every catalog packet.
pub fn registry() -> gamewire_registry::Result<TypeRegistry> {
    registry_with_config(registry_config())
}

/// Catalog registry with caller-supplied binding rules. The sentinel is
/// always [`P_MAX`].
pub fn registry_with_config(config: RegistryConfig) -> gamewire_registry::Result<TypeRegistry> {
    let mut registry = TypeRegistry::with_config(RegistryConfig {
        sentinel: P_MAX,
        ..config
    });
    register::<TestPacket>(&mut registry)?;
    register::<LoginPacket>(&mut registry)?;
    register::<PlayerInfoPacket>(&mut registry)?;
    Ok(registry)
}

/// The catalog registry, frozen for sharing.
pub fn handle() -> gamewire_registry::Result<RegistryHandle> {
    registry().map(TypeRegistry::into_handle)
}

/// Id and display name for every catalog packet.
pub fn names() -> [(PacketId, &'static str); 3] {
    [
        (TestPacket::ID, TestPacket::NAME),
        (LoginPacket::ID, LoginPacket::NAME),
        (PlayerInfoPacket::ID, PlayerInfoPacket::NAME),
    ]
}

/// Diagnostic integer packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TestPacket(pub i64);

impl From<TestPacket> for Value {
    fn from(packet: TestPacket) -> Self {
        Value::I64(packet.0)
    }
}

impl TryFrom<Value> for TestPacket {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.as_i64().map(TestPacket).ok_or_else(|| ValueError::TypeMismatch {
            expected: Kind::I64.name().to_string(),
            found: value.kind_name().to_string(),
        })
    }
}

impl Message for TestPacket {
    const ID: PacketId = P_TEST;
    const NAME: &'static str = "test";

    fn shape() -> Shape {
        Shape::primitive(Kind::I64)
    }
}

/// Credentials sent by a client right after connecting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginPacket {
    pub username: String,
    pub password: String,
}

impl From<LoginPacket> for Value {
    fn from(packet: LoginPacket) -> Self {
        Value::Record(
            Record::new(LoginPacket::NAME)
                .with_field("username", packet.username)
                .with_field("password", packet.password),
        )
    }
}

impl TryFrom<Value> for LoginPacket {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut fields = match value {
            Value::Record(record) => record.into_fields().into_iter().collect(),
            Value::Map(map) => map,
            other => {
                return Err(ValueError::TypeMismatch {
                    expected: Self::NAME.to_string(),
                    found: other.kind_name().to_string(),
                })
            }
        };
        Ok(Self {
            username: take_string(&mut fields, "username")?,
            password: take_string(&mut fields, "password")?,
        })
    }
}

impl Message for LoginPacket {
    const ID: PacketId = P_LOGIN;
    const NAME: &'static str = "Login";

    fn shape() -> Shape {
        Shape::record(
            Self::NAME,
            [
                ("username", Shape::primitive(Kind::Str)),
                ("password", Shape::primitive(Kind::Str)),
            ],
        )
    }
}

fn take_string(fields: &mut BTreeMap<String, Value>, name: &str) -> Result<String, ValueError> {
    match fields.remove(name) {
        Some(Value::Str(s)) => Ok(s),
        Some(other) => Err(ValueError::TypeMismatch {
            expected: Kind::Str.name().to_string(),
            found: other.kind_name().to_string(),
        }),
        None => Err(ValueError::MissingField {
            record: LoginPacket::NAME.to_string(),
            field: name.to_string(),
        }),
    }
}

/// Loosely structured player state (`scene`, `hp`, `mp`, `pos`, ...).
///
/// Bound to a generic mapping, so any key set decodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerInfoPacket(pub BTreeMap<String, Value>);

impl PlayerInfoPacket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<PlayerInfoPacket> for Value {
    fn from(packet: PlayerInfoPacket) -> Self {
        Value::Map(packet.0)
    }
}

impl TryFrom<Value> for PlayerInfoPacket {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Map(map) => Ok(Self(map)),
            other => Err(ValueError::TypeMismatch {
                expected: "mapping".to_string(),
                found: other.kind_name().to_string(),
            }),
        }
    }
}

impl Message for PlayerInfoPacket {
    const ID: PacketId = P_PLAYER_INFO;
    const NAME: &'static str = "player_info";

    fn shape() -> Shape {
        Shape::mapping(Shape::Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_registers_every_packet_below_the_sentinel() {
        let registry = registry().unwrap();
        assert_eq!(registry.ids(), vec![P_TEST, P_LOGIN, P_PLAYER_INFO]);
        assert_eq!(registry.config().sentinel, P_MAX);
        assert_eq!(registry.name_of(P_LOGIN), Some("Login"));
        assert_eq!(registry.name_of(P_PLAYER_INFO), Some("player_info"));
        for (id, name) in names() {
            assert_eq!(registry.name_of(id), Some(name));
        }
    }

    #[test]
    fn login_conversions() {
        let login = LoginPacket {
            username: "genius".into(),
            password: "0101001".into(),
        };
        let value = Value::from(login.clone());
        assert!(LoginPacket::shape().check(&value).is_ok());
        assert_eq!(LoginPacket::try_from(value).unwrap(), login);

        let mut map = BTreeMap::new();
        map.insert("username".to_string(), Value::from("a"));
        assert_eq!(
            LoginPacket::try_from(Value::Map(map)),
            Err(ValueError::MissingField {
                record: "Login".into(),
                field: "password".into()
            })
        );
        assert!(LoginPacket::try_from(Value::I64(1)).is_err());
    }

    #[test]
    fn test_packet_accepts_any_integer_width() {
        assert_eq!(TestPacket::try_from(Value::U8(8)).unwrap(), TestPacket(8));
        assert!(TestPacket::try_from(Value::U64(u64::MAX)).is_err());
        assert!(TestPacket::try_from(Value::Nil).is_err());
    }

    #[test]
    fn player_info_wraps_a_mapping() {
        let mut info = PlayerInfoPacket::new();
        assert!(info.is_empty());
        info.insert("hp", 100u16);
        info.insert("name", "genius");
        assert_eq!(info.len(), 2);
        assert_eq!(info.get("hp"), Some(&Value::U16(100)));

        let value = Value::from(info.clone());
        assert!(PlayerInfoPacket::shape().check(&value).is_ok());
        assert_eq!(PlayerInfoPacket::try_from(value).unwrap(), info);
        assert!(PlayerInfoPacket::try_from(Value::Seq(vec![])).is_err());
    }
}
