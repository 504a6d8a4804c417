pub mod cat;
pub mod copy;
pub mod exists;
pub mod handlers;
pub mod rm;
pub mod which;

pub use cat::cat_command;
pub use copy::copy_command;
pub use exists::exists_command;
pub use handlers::handlers_command;
pub use rm::rm_command;
pub use which::which_command;
