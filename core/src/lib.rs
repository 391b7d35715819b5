//! Async client for the portal REST API.
//!
//! # Overview
//! Every endpoint is a static [`OperationDescriptor`]: method, path template,
//! required parameters, query mapping and security requirement. One generic
//! pipeline in [`ApiClient`] turns a descriptor plus [`Params`] into an
//! [`HttpRequest`], attaches credentials, hands it to a [`Transport`], and
//! decodes the [`HttpResponse`]. Typed facades in [`apis`] wrap that pipeline
//! per resource.
//!
//! # Design
//! - Request building is pure: `request::build_request` touches no network,
//!   so URL and header construction is deterministic and testable.
//! - The transport is a trait; [`ReqwestTransport`] is the default.
//! - `ApiClient` holds only `Arc`s to immutable state. Clone it freely and
//!   run calls concurrently.
//! - Errors are values: a missing parameter, a transport failure, a non-2xx
//!   response and a bad body are distinct [`ApiError`] variants.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod apis;
pub mod auth;
pub mod client;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod http;
pub mod money;
pub mod portal;
pub mod request;
pub mod response;
pub mod settings;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use auth::{CredentialResolver, StaticToken};
pub use client::ApiClient;
pub use config::{Configuration, ConfigurationBuilder};
pub use descriptor::{ArrayStyle, OperationDescriptor, ParamValue, Params, QueryParam, Security};
pub use error::{ApiError, ConfigError, ResponseError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use portal::{load_customer_portal, CustomerPortal, PortalError, PortalPage};
pub use response::ApiValue;
pub use settings::{save_organization_settings, FieldErrors, SettingsError};
pub use transport::{ReqwestTransport, Transport};
