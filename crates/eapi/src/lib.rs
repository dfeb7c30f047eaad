// eapi: Async Rust client for the Arista EOS command API (eAPI)

pub mod api;
pub mod auth;
pub mod error;
pub mod models;
pub mod node;
pub mod transport;

pub use api::acl::{AclAction, AclEntry, AclKind, StandardAcl, StandardAcls};
pub use auth::Credentials;
pub use error::Error;
pub use models::{CommandResult, Encoding};
pub use node::EapiNode;
pub use transport::{TlsMode, TransportConfig};
