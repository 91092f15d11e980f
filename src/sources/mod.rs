pub mod traits;
pub mod parsing;
pub mod eastmoney;
pub mod cls;
pub mod cls_headline;
pub mod jqka;
pub mod wallstreetcn;
pub mod registry;

pub use traits::{ItemLocator, ListPageKind, LoadMore, ParsedItem, SourceAdapter};
pub use registry::SourceRegistry;

#[cfg(test)]
pub(crate) mod fixture;
