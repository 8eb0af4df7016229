pub mod details;
pub mod process_table;
pub mod settings;
pub mod stats_view;
pub mod trends;

pub use details::*;
pub use process_table::*;
pub use settings::*;
pub use stats_view::*;
pub use trends::*;
