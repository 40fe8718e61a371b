mod fields;
mod lines;
mod records;

pub use fields::{
    StatementDate, normalize_whitespace, parse_amount, parse_card_header, split_inline_row,
};
pub use lines::{Line, Lines};
pub use records::{RawRow, Records};
