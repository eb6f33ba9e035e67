// handlers/protected/auth/mod.rs - session-scoped account endpoints

pub mod me;

pub use me::me_get;
