//! One module per subcommand.

pub mod completions;
pub mod decrypt;
pub mod inspect;
pub mod key;
pub mod version;
