use crate::error::MprisError;
use crate::proxy::{MPRIS_BUS_PREFIX, MPRIS_OBJECT_PATH};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use zbus::fdo::DBusProxy;
use zbus::message::Type as MessageType;
use zbus::{Connection, MatchRule, MessageStream};

const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";
const PROPERTIES_CHANGED: &str = "PropertiesChanged";

/// Signals queued per stream before older ones are dropped
const MAX_QUEUED: usize = 64;

/// Forward a `()` into `changes` whenever any MPRIS player changes a property
/// or a player appears on or leaves the bus.
///
/// Notifications are coalesced: a send into a full channel is dropped, the
/// receiver re-reads every player anyway. Runs until `cancel` fires, the
/// receiver is dropped, or the bus closes the streams.
///
/// # Errors
///
/// Returns an error if the signal subscriptions cannot be set up.
pub async fn watch_changes(
    connection: &Connection,
    changes: mpsc::Sender<()>,
    cancel: CancellationToken,
) -> Result<(), MprisError> {
    let rule = MatchRule::builder()
        .msg_type(MessageType::Signal)
        .interface(PROPERTIES_INTERFACE)?
        .member(PROPERTIES_CHANGED)?
        .path(MPRIS_OBJECT_PATH)?
        .build();
    let mut properties = MessageStream::for_match_rule(rule, connection, Some(MAX_QUEUED)).await?;

    let dbus = DBusProxy::new(connection).await?;
    let mut owners = dbus.receive_name_owner_changed().await?;

    info!("Watching MPRIS players for changes");

    loop {
        let notify = tokio::select! {
            () = cancel.cancelled() => {
                debug!("Change watcher shutting down");
                break;
            }
            message = properties.next() => match message {
                Some(Ok(_)) => true,
                Some(Err(e)) => {
                    debug!("Ignoring malformed D-Bus message: {}", e);
                    false
                }
                None => break,
            },
            signal = owners.next() => match signal {
                Some(signal) => signal
                    .args()
                    .is_ok_and(|args| args.name().as_str().starts_with(MPRIS_BUS_PREFIX)),
                None => break,
            },
        };

        if notify && changes.try_send(()).is_err() && changes.is_closed() {
            break;
        }
    }

    Ok(())
}
