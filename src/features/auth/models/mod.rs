mod account;

pub use account::{Account, AccountPatch, AccountRole, AccountSummary, NewAccount};
