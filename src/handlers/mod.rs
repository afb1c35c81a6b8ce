pub mod issue;
pub mod public;
