//! MARCXML record decoding
//!
//! Bibliographic records are served as MARCXML: a `<record>` with a
//! `<leader>`, `<controlfield tag>` elements and `<datafield tag ind1 ind2>`
//! elements holding `<subfield code>` children.

pub mod record;

pub use record::{Field, MarcRecord, Subfield};
