/// Decimal precision for stored money amounts.
pub const DECIMAL_PRECISION: u32 = 6;

/// Maximum length of an account display name.
pub const MAX_ACCOUNT_NAME_LEN: usize = 100;

/// Maximum length of a ledger entry description.
pub const MAX_TRANSACTION_DESCRIPTION_LEN: usize = 500;

/// Maximum length of snapshot notes.
pub const MAX_SNAPSHOT_NOTES_LEN: usize = 1000;

/// Maximum length of trade notes.
pub const MAX_TRADE_NOTES_LEN: usize = 2000;
