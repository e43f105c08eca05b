//! Client modules for the CRM REST API

pub mod moyklass;
pub mod session;
pub mod transport;

// Re-export all client types
pub use moyklass::MoyKlassClient;
pub use session::{Authenticated, CrmSession, Unauthenticated};
pub use transport::{CrmReply, CrmTransport};
