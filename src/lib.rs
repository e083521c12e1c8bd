pub mod broadcaster;
pub mod completion;
pub mod config;
pub mod corpus;
pub mod decorate;
pub mod discord;
pub mod dispatch;
pub mod emoji;
pub mod error;
pub mod history;
pub mod models;
pub mod persona;
pub mod prompt;
pub mod sanitize;

#[cfg(test)]
pub(crate) mod test_support;
