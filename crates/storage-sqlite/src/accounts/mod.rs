mod model;
mod repository;

pub use model::AccountDB;
pub use repository::AccountRepository;

pub(crate) use repository::{apply_balance_delta, ensure_account_exists};
