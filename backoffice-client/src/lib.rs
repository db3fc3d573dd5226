//! Back-office Client - REST Transport
//!
//! [`RestCollectionClient`] implements [`backoffice_core::ResourceClient`]
//! over the back-office JSON API: one shared [`RestTransport`] (base URL,
//! timeout, credentials) and a per-resource [`ResourceEndpoints`] table.
//! [`RestDashboardClient`] reads the overview document and [`RestLookupClient`]
//! the form field options, over the same transport.

pub mod endpoints;
mod envelope;
pub mod error;
pub mod rest;

pub use endpoints::{BodyFormat, EndpointOverrides, ResourceEndpoints};
pub use error::SetupError;
pub use rest::{
    ClientSettings, Credentials, RestCollectionClient, RestDashboardClient, RestLookupClient,
    RestTransport, DASHBOARD_PATH,
};
