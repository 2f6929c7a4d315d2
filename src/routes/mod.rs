//! Router Module Index
//!
//! Splits the API into groups by access level. Each group is wrapped in its own
//! `RoleGate` layer inside `create_router`, so a route's protection is decided by the
//! module it is declared in.

/// Routes reachable without a token (login and token verification).
pub mod public;

/// Routes behind a gate with an empty role requirement: any valid token passes.
pub mod authenticated;

/// Routes behind a gate requiring the `ADMIN` role.
pub mod admin;
