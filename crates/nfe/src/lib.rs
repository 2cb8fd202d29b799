//! NFe (Nota Fiscal eletrônica) line-item extraction.
//!
//! Pure transformation: XML bytes in, supplier + key + items out.

pub mod invoice;
pub mod parser;

pub use invoice::{Invoice, InvoiceItem, Supplier};
pub use parser::{NfeError, extract_invoice, parse_invoice};
