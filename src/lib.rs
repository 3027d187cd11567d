//! # drip-gateway
//!
//! REST gateway for a Web3 paid-content marketplace.
//!
//! Fans pay a platform wallet from their browser wallet and submit the
//! transaction hash; the gateway validates the claim, consumes the hash at
//! most once, splits the amount between platform and creator, and hands
//! back an access URL whose token is the transaction hash. Admins settle
//! creator earnings through idempotent payouts.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers, extractors, rate limiter (api/)
//!     │
//!     ├── Purchase / Access / Payout / Catalog / Creator services (service/)
//!     ├── PaymentVerifier: trusting or JSON-RPC (verifier/)
//!     │
//!     ├── Validators, fee split, ledger records (domain/)
//!     │
//!     └── LedgerStore: PostgreSQL or in-memory (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod verifier;
