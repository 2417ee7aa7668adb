mod init_logging;
mod load_dotenv;

pub use init_logging::init_logging;
pub use load_dotenv::load_dotenv;

pub mod base_path;
pub mod prompt;
pub mod time;
