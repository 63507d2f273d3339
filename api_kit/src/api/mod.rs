//! Discovery of API operations from registered routes.

pub mod builder;
pub mod descriptor;
pub mod filter;
pub mod parser;
pub mod scanner;
pub mod specification;

pub use builder::{normalize_path, DescriptorBuilder};
pub use descriptor::{Attribute, Descriptor, Method, OperationKey};
pub use filter::{Filter, FilterFactory, PathPrefixFilter, TagFilter};
pub use parser::{ApiManager, RouteParser};
pub use scanner::RouterScanner;
pub use specification::Specification;
