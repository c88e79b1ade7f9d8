//! Core types and trait definitions for the AskMate Q&A forum.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement the traits in [`store`]; presentation shells
//! depend on those traits, not on any concrete backend.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod age;
pub mod answer;
pub mod comment;
pub mod error;
pub mod ids;
pub mod password;
pub mod query;
pub mod question;
pub mod reputation;
pub mod store;
pub mod tag;

pub use error::{Classify, Entity, Error, ErrorKind, Result};
pub use ids::{AnswerId, CommentId, QuestionId, TagId, UserId};
