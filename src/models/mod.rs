mod criteria;
mod errors;
#[cfg(test)]
mod tests;
mod transaction;

use std::fmt;
use std::fmt::{Display, Formatter};

pub use criteria::{DateRange, FilterCriteria, HourRange, OrderCountRange, Selection};
pub use errors::{FilterError, IngestError};
pub use transaction::{Transaction, TransactionRow};

/// The two read-only partitions of the transaction population.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ViewKind {
    /// Every cleaned row, with or without a customer id.
    AllTransactions,
    /// Only the rows carrying a customer id.
    IdentifiedCustomers
}

impl Display for ViewKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::AllTransactions => write!(formatter, "all-transactions"),
            ViewKind::IdentifiedCustomers => write!(formatter, "identified-customers")
        }
    }
}
