pub mod import;

pub use import::{ImportArgs, ImportKeysCommand};
