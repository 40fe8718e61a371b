//! Extract itemized purchases from credit card statements converted to HTML,
//! recovering the card each purchase was made on.
//!
//! ```rust,ignore
//! use card_statement_rs::{ExtractorBuilder, OutputFormat, RecordWriter};
//!
//! let statement = ExtractorBuilder::new()
//!     .content(&html)
//!     .parse()?;
//!
//! let mut writer = RecordWriter::new(std::io::stdout(), OutputFormat::Csv);
//! writer.write_records(statement.records())?;
//! ```

mod builder;
mod types;

pub mod errors;
pub mod extract;
pub mod markup;
pub mod output;

pub use builder::{ExtractorBuilder, Statement};
pub use extract::{Records, StatementDate};
pub use markup::prelude::*;
pub use output::{OutputFormat, RecordWriter};
pub use types::PurchaseRecord;
