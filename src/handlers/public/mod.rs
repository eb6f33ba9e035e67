// handlers/public/mod.rs - endpoints reachable without a session
//
// Security Level: none
// Middleware: rate limiting only

pub mod auth;
pub mod root;
