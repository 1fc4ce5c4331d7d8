//! # Weave Command Sample
//!
//! A device-cloud API surface built on [`command_framework`]: two resources
//! backed by actor-owned stores, wired together at boot from a TOML config.
//!
//! - **[config]**: bootstrap options (`weave.toml`).
//! - **[model]**: the records ([`PersonalizedInfo`](model::PersonalizedInfo), [`AuthorizedApp`](model::AuthorizedApp)).
//! - **[store]**: the per-type store actor that serializes access to records.
//! - **[personalized_infos]** / **[authorized_apps]**: the resource handlers.
//! - **[lifecycle]**: [`CommandSystem`](lifecycle::CommandSystem), which starts and stops it all.

pub mod authorized_apps;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod personalized_infos;
pub mod store;
