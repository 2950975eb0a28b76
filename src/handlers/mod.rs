pub mod chat_proxy;

/// Status handler reporting gateway configuration health
pub mod status;

pub use chat_proxy::{
    operator_chat_handler, operator_diagnostics_handler, Persona, ProxyState,
};

pub use status::{status_handler, StatusResponse};
