//! HTTP service: exposes the tools on a single port.
//!
//! `GET /` health and metadata, `GET /tools` definitions, `POST /tools/:id` invoke.
//! Tool outcomes (success or failure) are both HTTP 200 with the envelope as body.

mod protocol;
mod server;

pub use protocol::{ErrorBody, HealthPayload, ServiceMetadata};
pub use server::{build_registry, router, run_service, ServiceState};
