#[macro_use]
mod macros;

pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod list;
pub mod logging;
pub mod paths;
pub mod remote;
pub mod session;

pub use catalog::{
    DiscoveryDraft, DiscoveryRecord, Firearm, Narcotic, Resource, ResourceKind, UserAccount,
};
pub use error::{CatalogError, Result};
pub use list::{
    DeletionCoordinator, Draft, FilterState, ListManager, PageState, SaveTarget, SortOrder,
};
pub use remote::{ApiClient, CatalogApi, Credentials, Endpoint};
