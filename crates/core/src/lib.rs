//! Core library for akamai-usage-reporter
//!
//! This crate implements the **Functional Core** of the reporter, following the
//! Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The project uses a two-crate architecture:
//!
//! - **`akamai_reporter_core`** (this crate): pure transformation functions with zero I/O
//! - **`akamai_reporter`**: HTTP calls, file output and CLI orchestration (the Imperative Shell)
//!
//! Every function here takes plain data (API responses as serde models or raw
//! `serde_json::Value`) and returns plain data (tables, Markdown, signatures). Even
//! EdgeGrid signing is pure: the shell passes in the timestamp and nonce.
//!
//! # Module Organization
//!
//! - [`edgegrid`]: request signing, credential lookup and `.edgerc` parsing
//! - [`envelope`]: tolerant extraction of lists from response envelopes
//! - [`domain`]: apex-domain extraction and file-safe names
//! - [`papi`]: contracts, groups, properties, hostnames and rule trees
//! - [`cps`]: certificate enrollments
//! - [`appsec`]: security configurations and rate policies
//! - [`products`]: Edge DNS, EdgeWorkers, Cloudlets, Cloud Wrapper, network lists
//! - [`gtm`]: Global Traffic Management exports
//! - [`report`]: the `Table` model and output file names
//! - [`checklist`]: Markdown migration checklists
//! - [`probe`]: API permission probing
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use akamai_reporter_core::envelope::parse_items;
//! use akamai_reporter_core::papi::{contract_group_pairs, Contract, Group};
//!
//! let contracts: Vec<Contract> = parse_items(&contracts_json, &["contracts"]);
//! let groups: Vec<Group> = parse_items(&groups_json, &["groups"]);
//!
//! for pair in contract_group_pairs(&contracts, &groups) {
//!     println!("{} + {}", pair.contract_id, pair.group_id);
//! }
//! ```

pub mod appsec;
pub mod checklist;
pub mod cps;
pub mod domain;
pub mod edgegrid;
pub mod envelope;
pub mod gtm;
pub mod papi;
pub mod probe;
pub mod products;
pub mod report;
