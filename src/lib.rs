//! frontier: efficient-frontier portfolio analytics.
//!
//! Hexagonal architecture: the pure engine lives in [`domain`], collaborator
//! traits in [`ports`], CSV/INI implementations in [`adapters`] and the
//! command-line driver in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
