pub mod http;
pub mod peers;
pub mod sync;

pub use http::HttpTransport;
pub use peers::PeerDirectory;
pub use sync::{PeerTransport, ReceiveOutcome, SyncEngine};
