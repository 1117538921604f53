// Public modules
pub mod assigner;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod parser;
pub mod report;

// Re-export commonly used types
pub use assigner::{Assigner, AssignmentResult, Group, Item};
pub use config::Config;
pub use error::{ConfigError, InvalidItemError, ParseError};
pub use io::{get_default_assignments_dir, list_assignment_files, load_assignment, save_assignment};
pub use models::AssignmentFile;
pub use parser::{parse_csv, parse_text, ParsedItems};
pub use report::ReportGenerator;
