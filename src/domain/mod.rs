pub mod errors;
pub mod models;
pub mod session;

pub use errors::{WalletError, WalletResult};
pub use session::Session;
