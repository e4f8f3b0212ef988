pub mod cashout;
pub mod pagination;
pub mod user;
pub mod wallet;

pub use cashout::*;
pub use pagination::*;
pub use user::*;
pub use wallet::*;
