//! D-Bus transport.
//!
//! Uses zbus to issue method calls on the system (or session) bus.

use super::{BusKind, ChannelError, ObjectHandle, RemoteError, ReplyKind, RpcChannel, Value};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};
use zbus::zvariant::{DynamicType, OwnedObjectPath};
use zbus::{Connection, DBusError, Message};

/// Channel backed by a zbus connection
#[derive(Debug, Clone)]
pub struct DbusChannel {
    connection: Connection,
    bus: BusKind,
}

impl DbusChannel {
    /// Connect to the given bus.
    ///
    /// The system bus usually requires root privileges (or a polkit rule)
    /// for netplan's methods to succeed.
    pub async fn connect(bus: BusKind) -> Result<Self, ChannelError> {
        let connection = match bus {
            BusKind::System => Connection::system().await,
            BusKind::Session => Connection::session().await,
        }
        .map_err(|e| ChannelError::Connect {
            bus,
            message: e.to_string(),
        })?;

        info!("Connected to D-Bus {} bus", bus);
        Ok(Self { connection, bus })
    }

    async fn call<B>(
        &self,
        object: &ObjectHandle,
        interface: &str,
        method: &str,
        body: &B,
    ) -> Result<Message, ChannelError>
    where
        B: Serialize + DynamicType,
    {
        self.connection
            .call_method(
                Some(object.service()),
                object.path(),
                Some(interface),
                method,
                body,
            )
            .await
            .map_err(translate_error)
    }
}

#[async_trait]
impl RpcChannel for DbusChannel {
    async fn invoke(
        &self,
        object: &ObjectHandle,
        interface: &str,
        method: &str,
        args: &[Value],
        reply: ReplyKind,
    ) -> Result<Value, ChannelError> {
        debug!(
            "Calling {}.{} on {}{} with {} argument(s)",
            interface,
            method,
            object.service(),
            object.path(),
            args.len()
        );

        // Each arm fixes the wire signature for one argument shape.
        let message = match args {
            [] => self.call(object, interface, method, &()).await?,
            [Value::Str(a)] => self.call(object, interface, method, &(a.as_str(),)).await?,
            [Value::U32(n)] => self.call(object, interface, method, &(*n,)).await?,
            [Value::Str(a), Value::Str(b)] => {
                self.call(object, interface, method, &(a.as_str(), b.as_str()))
                    .await?
            }
            _ => {
                return Err(ChannelError::UnsupportedArguments {
                    method: method.to_string(),
                });
            }
        };

        decode_reply(&message, method, reply)
    }

    fn bus(&self) -> BusKind {
        self.bus
    }
}

fn decode_reply(message: &Message, method: &str, reply: ReplyKind) -> Result<Value, ChannelError> {
    let unexpected = |_| ChannelError::UnexpectedReply {
        method: method.to_string(),
        expected: reply,
    };
    let body = message.body();

    match reply {
        ReplyKind::Bool => body.deserialize::<bool>().map(Value::Bool).map_err(unexpected),
        ReplyKind::Str => body.deserialize::<String>().map(Value::Str).map_err(unexpected),
        ReplyKind::ObjectPath => body
            .deserialize::<OwnedObjectPath>()
            .map(|path| Value::ObjectPath(path.as_str().to_string()))
            .map_err(unexpected),
    }
}

/// Split zbus errors into remote error replies and transport failures
fn translate_error(err: zbus::Error) -> ChannelError {
    match err {
        zbus::Error::MethodError(name, detail, _) => ChannelError::Remote(RemoteError::new(
            name.as_str(),
            detail.unwrap_or_default(),
        )),
        zbus::Error::FDO(fdo) => ChannelError::Remote(RemoteError::new(
            fdo.name().as_str(),
            fdo.description().unwrap_or_default(),
        )),
        other => ChannelError::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env;
    use test_tag::tag;
    use zbus::fdo;
    use zbus::names::{ErrorName, OwnedErrorName};
    use zbus::zvariant::ObjectPath;

    fn should_run_dbus_tests() -> bool {
        std::env::var(env::test::RUN_DBUS_TESTS_VAR)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    #[test]
    fn test_translate_transport_error() {
        let err = translate_error(zbus::Error::Unsupported);
        assert!(matches!(err, ChannelError::Transport(_)));
    }

    /// Message whose body is `body`, standing in for a method reply
    fn message_with<B: Serialize + DynamicType>(body: &B) -> Message {
        Message::method(env::netplan::ROOT_OBJECT_PATH, "Get")
            .unwrap()
            .build(body)
            .unwrap()
    }

    #[test]
    fn test_translate_method_error_is_remote() {
        let name = OwnedErrorName::from(ErrorName::try_from("io.netplan.Netplan.Error").unwrap());
        let err = translate_error(zbus::Error::MethodError(
            name,
            Some("netplan generate failed".to_string()),
            message_with(&()),
        ));

        assert_eq!(
            err,
            ChannelError::Remote(RemoteError::new(
                "io.netplan.Netplan.Error",
                "netplan generate failed"
            ))
        );
    }

    #[test]
    fn test_translate_method_error_without_detail() {
        let name = OwnedErrorName::from(
            ErrorName::try_from("org.freedesktop.DBus.Error.UnknownObject").unwrap(),
        );
        let err = translate_error(zbus::Error::MethodError(name, None, message_with(&())));

        assert_eq!(
            err.remote(),
            Some(&RemoteError::new("org.freedesktop.DBus.Error.UnknownObject", ""))
        );
    }

    #[test]
    fn test_translate_fdo_error_is_remote() {
        let err = translate_error(zbus::Error::FDO(Box::new(fdo::Error::AccessDenied(
            "root required".to_string(),
        ))));

        assert_eq!(
            err,
            ChannelError::Remote(RemoteError::new(
                "org.freedesktop.DBus.Error.AccessDenied",
                "root required"
            ))
        );
    }

    #[test]
    fn test_decode_reply_of_expected_type() {
        let message = message_with(&(true,));
        assert_eq!(
            decode_reply(&message, "Apply", ReplyKind::Bool),
            Ok(Value::Bool(true))
        );

        let message = message_with(&("network:\n  version: 2\n",));
        assert_eq!(
            decode_reply(&message, "Get", ReplyKind::Str),
            Ok(Value::Str("network:\n  version: 2\n".to_string()))
        );

        let path = ObjectPath::try_from("/io/netplan/Netplan/config/ABC").unwrap();
        let message = message_with(&(path,));
        assert_eq!(
            decode_reply(&message, "Config", ReplyKind::ObjectPath),
            Ok(Value::ObjectPath("/io/netplan/Netplan/config/ABC".to_string()))
        );
    }

    #[test]
    fn test_decode_reply_of_wrong_type() {
        let message = message_with(&("true",));

        assert_eq!(
            decode_reply(&message, "Apply", ReplyKind::Bool),
            Err(ChannelError::UnexpectedReply {
                method: "Apply".to_string(),
                expected: ReplyKind::Bool,
            })
        );
        assert!(matches!(
            decode_reply(&message, "Config", ReplyKind::ObjectPath),
            Err(ChannelError::UnexpectedReply { .. })
        ));
    }

    #[tokio::test]
    #[tag(dbus)]
    async fn test_open_session_on_system_bus() {
        if !should_run_dbus_tests() {
            eprintln!("Skipping: set {}=1 to run", env::test::RUN_DBUS_TESTS_VAR);
            return;
        }

        let channel = DbusChannel::connect(BusKind::System).await.unwrap();
        let root = ObjectHandle::bind(env::netplan::SERVICE_NAME, env::netplan::ROOT_OBJECT_PATH);
        let reply = channel
            .invoke(
                &root,
                env::netplan::ROOT_INTERFACE,
                env::netplan::SESSION_FACTORY_METHOD,
                &[],
                ReplyKind::ObjectPath,
            )
            .await
            .unwrap();

        let path = reply.into_object_path().unwrap();
        assert!(path.starts_with(env::netplan::ROOT_OBJECT_PATH));
    }
}
