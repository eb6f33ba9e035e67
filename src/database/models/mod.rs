pub mod console;
pub mod data_source;
pub mod session;
pub mod user;

pub use console::{Console, ConsoleSummary, ConsoleUpdate, NewConsole, DEFAULT_CONSOLE_NAME};
pub use data_source::{DataSource, DataSourceUpdate, DataSourceWithConsoles, NewDataSource};
pub use session::Session;
pub use user::{User, UserUpdate};
