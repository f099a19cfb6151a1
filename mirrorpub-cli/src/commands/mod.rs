//! CLI command implementations

pub mod checkout;
pub mod document;
pub mod inspect;
pub mod mirror;
pub mod publish;

pub use checkout::CheckoutArgs;
pub use document::{AddMediaArgs, CommitArgs, NewArgs};
pub use inspect::{CurrentArgs, DiffArgs, StatusArgs, TagsArgs};
pub use mirror::{InitArgs, UpdateArgs};
pub use publish::{NolookArgs, PublishArgs};
