mod cli;
mod conn;
mod result_set;
mod transaction;
mod transport;

pub use cli::Cli;
pub use conn::Conn;
pub use result_set::{FetchedResultSet, Records, ResultSet, ResultSetState};
pub use transaction::Transaction;
pub use transport::Transport;
