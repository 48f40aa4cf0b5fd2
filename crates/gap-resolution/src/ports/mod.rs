//! Port traits: the inbound API this subsystem offers and the outbound
//! dependencies it requires the host node to provide.

pub mod inbound;
pub mod outbound;

pub use inbound::BlockProcessorApi;
pub use outbound::{BootstrapRequester, Ledger, MonotonicClock, NullBootstrap, TimeSource};
