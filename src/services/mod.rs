pub mod console_service;
pub mod data_source_service;
pub mod query_service;
pub mod session_service;
pub mod user_service;

pub use console_service::{ConsoleService, RemoveConsole, UpdateConsole};
pub use data_source_service::DataSourceService;
pub use query_service::{ExecuteRequest, QueryError, QueryService};
pub use session_service::SessionService;
pub use user_service::UserService;
