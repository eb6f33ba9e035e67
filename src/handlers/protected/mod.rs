// handlers/protected/mod.rs - endpoints that need a live session
//
// Security Level: session cookie (`require_auth`)
// Every handler receives `Extension<AuthUser>` and scopes its queries by `uid`.

pub mod auth;
pub mod console;
pub mod data_source;
pub mod user;
