//! JSON HTTP API for the clinic front end.
//!
//! Routes are nested under `/api/`. Everything except health and the
//! account endpoints requires a bearer session token; the middleware
//! stack is Auth → Rate Limit → Access Log → Handler.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::{api_router, build_router};
pub use server::{serve_until_ctrl_c, start_server, ApiServer};
pub use types::{ApiContext, DoctorContext};
