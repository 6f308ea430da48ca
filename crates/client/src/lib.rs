//! Subprocess-backed client for the SecretHub CLI.
//!
//! [`CommandRunner`] executes the external binary with an argument list, an
//! optional stdin payload, and a credential environment overlay.
//! [`SecretClient`] is the operation seam on top of it: four operations,
//! implemented here by shelling out ([`CliClient`]) and substitutable by
//! anything else that can read, write, and generate secrets.

pub mod client;
pub mod runner;

pub use client::{CliClient, SecretClient};
pub use runner::{CommandOutput, CommandRunner};
