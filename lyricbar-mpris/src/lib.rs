pub mod bus;
pub mod error;
pub mod metadata;
pub mod proxy;
pub mod watch;

pub use bus::{MprisBus, MprisPlayer};
pub use error::MprisError;
pub use metadata::track_metadata;
pub use proxy::{PlayerProxy, MPRIS_BUS_PREFIX, MPRIS_OBJECT_PATH};
pub use watch::watch_changes;
