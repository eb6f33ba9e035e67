// handlers/protected/user/mod.rs - profile changes

pub mod user_put;

pub use user_put::user_put;
