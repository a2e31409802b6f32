//! Backends for the storefront's external collaborators

#[cfg(feature = "http")]
pub mod graphql;
#[cfg(feature = "in-memory")]
pub mod in_memory;

#[cfg(feature = "http")]
pub use graphql::GraphQlClient;
#[cfg(feature = "in-memory")]
pub use in_memory::{InMemoryStorefront, NftRecord};
