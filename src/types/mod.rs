mod errors;
mod timestamp;
mod year_month;

pub use errors::TimestampError;
pub use timestamp::parse_timestamp;
pub use year_month::YearMonth;

pub type CustomerId = u32;
pub type Hour = u8;
