//! HTTP adapters for the admin API.

mod client;
mod resources;

pub use client::ApiClient;
pub use resources::{NewsApi, OrganizationRequestsApi, ReportsApi};
