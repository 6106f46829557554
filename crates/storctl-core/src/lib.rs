//! Declarative module semantics for `storctl`.
//!
//! Every module follows the same shape: parse a JSON argument document
//! into a typed parameter struct, read the current remote state once,
//! compute a diff and apply at most one corrective change (skipped in
//! check mode). The result is a JSON document that always carries
//! `changed`.
//!
//! - **[`ModuleInvocation`]**: the argument document, check mode and
//!   parameter validation.
//! - **[`ModuleRunner`]**: dispatches a [`ModuleKind`] to its task.
//! - **[`modules`]**: `na_ontap_cifs_server`, `netapp_e_mgmt_interface`
//!   and `win_group_membership`.
//! - **[`RetryPolicy`]**: bounded retry while a storage system reports
//!   itself unavailable.

pub mod error;
pub mod invocation;
pub mod modules;
pub mod params;
pub mod retry;
pub mod runner;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use invocation::{ModuleInvocation, failure_document};
pub use params::{EseriesHostArgs, OntapHostArgs};
pub use retry::{RetryPolicy, retry_while_unavailable};
pub use runner::{ModuleKind, ModuleRunner};
