//! Access control for the drinks API.
//!
//! Protected routes are wrapped in [`require_permission`], which runs the
//! [`AccessGuard`](coffee_shop_access::AccessGuard) before the handler and
//! hands the caller's verified claims to it through the request extensions.

pub mod middleware;

pub use middleware::{PermissionGate, require_permission};
