pub mod cashout_requests;
pub mod users;
pub mod wallet_transactions;
pub mod wallets;

pub use cashout_requests as cashout_request_entity;
pub use users as user_entity;
pub use wallet_transactions as wallet_transaction_entity;
pub use wallets as wallet_entity;
