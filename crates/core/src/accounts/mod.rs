//! Accounts module - domain models, service, and traits.

mod accounts_model;
mod accounts_service;
mod accounts_traits;


// Re-export the public interface
pub use accounts_model::{Account, AccountUpdate, NewAccount, PositionUnit};
pub use accounts_service::AccountService;
pub use accounts_traits::{AccountRepositoryTrait, AccountServiceTrait};
