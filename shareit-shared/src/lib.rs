pub mod pagination;
pub mod pii;

pub use pagination::{Page, PageError, DEFAULT_PAGE_SIZE};
pub use pii::Masked;
