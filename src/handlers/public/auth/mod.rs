// handlers/public/auth/mod.rs - session acquisition and release

pub mod check;
pub mod google;
pub mod login;
pub mod logout;

pub use check::check_get;
pub use google::google_get;
pub use login::login_post;
pub use logout::logout_post;
