//! HTTP transport for the appointment lifecycle.
//!
//! Routes are nested under `/api/`. Protected routes run behind
//! Auth (bearer → `Principal`) → Access log → Handler.
//!
//! The router is composable: `booking_api_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::booking_api_router;
pub use server::{start_booking_api_server, BookingApiServer};
pub use types::{ApiContext, PrincipalResolver, TokenRegistry};
