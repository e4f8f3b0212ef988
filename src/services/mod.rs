pub mod auth_service;
pub mod cashout_service;
pub mod wallet_service;

pub use auth_service::*;
pub use cashout_service::*;
pub use wallet_service::*;
