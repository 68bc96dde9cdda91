mod errors;

pub mod bridge;
pub mod children;
pub mod config;
pub mod context;
pub mod decoration;
pub mod factories;
pub mod key;
pub mod node;
pub mod nodes;
pub mod reconcile;
pub mod resolver;
pub mod root;
pub mod visitor;

pub use children::{ChildFactory, Children, ChildrenMode};
pub use config::{GroupingMode, TreeConfig};
pub use context::TreeContext;
pub use errors::Error;
pub use key::{Key, TreeItem};
pub use node::{Node, NodeKind};
pub use root::TreeRoot;

#[cfg(test)]
mod tests;
