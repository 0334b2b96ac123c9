//! Core types and capability traits for the Academia backend.
//!
//! No HTTP or database dependencies. The record tables, identity provider and
//! session storage are reached only through the traits in [`store`];
//! [`login`] resolves a RUT to its role partition and signs the person in.

#![allow(async_fn_in_trait)]

pub mod account;
pub mod error;
pub mod login;
pub mod partition;
pub mod routing;
pub mod session;
pub mod store;

pub use error::{Error, Result};
pub use partition::Partition;
