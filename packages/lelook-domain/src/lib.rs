pub mod compare;
pub mod listing;
pub mod price;
pub mod record;

pub use compare::{ComparedProduct, MAX_COMPARED};
pub use record::{ProductRecord, ProductSource, Retrieved};
