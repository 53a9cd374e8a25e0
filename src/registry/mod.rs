//! Session registry view
//!
//! The live hierarchy the control plane walks:
//!
//! ```text
//!   ServerTree
//!     └─ ServerContext[srv]          sessions: HashMap<SessionId, Session>
//!          └─ Application[app]       relays: RelayQueues
//!               └─ StreamTable       buckets by name hash
//!                    └─ LiveStream   members: [SessionId] in join order
//! ```
//!
//! The RTMP core mutates this structure on the same event loop that runs
//! control requests, so a walk never races a mutation.

pub mod entry;
pub mod key;
pub mod store;

pub use entry::LiveStream;
pub use key::{AppIdentity, StreamKey, StreamTarget};
pub use store::{stream_hash, Application, ServerContext, ServerTree, StreamTable};
