pub mod address;
pub mod amount;
pub mod form;
pub mod record;

pub use address::shorten_address;
pub use form::{FormData, FormField};
pub use record::{RawTransaction, TransactionRecord};
