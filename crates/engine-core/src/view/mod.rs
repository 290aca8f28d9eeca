pub mod capabilities;
pub mod list_view;
pub mod mapping;
pub mod options;

pub use list_view::ListDataProviderView;
pub use mapping::{DataMapping, IdentityMapping, NameResolver, RenameMapping};
pub use options::ViewOptions;
