pub mod element;
pub mod traits;
pub mod static_page;

#[cfg(test)]
pub(crate) mod fixture;

pub use element::ElementHandle;
pub use static_page::{StaticRenderSession, StaticSessionFactory};
pub use traits::{RenderSession, SessionFactory};

#[cfg(test)]
pub use traits::{MockRenderSession, MockSessionFactory};
