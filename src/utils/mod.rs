pub mod invoice;
pub mod jwt;
pub mod password;
pub mod phone;

pub use invoice::generate_invoice_reference;
pub use jwt::*;
pub use password::*;
pub use phone::*;
