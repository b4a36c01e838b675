pub mod category;
pub mod dashboard;
pub mod email;
pub mod project;
pub mod public_content;
pub mod settings;
pub mod team;
pub mod user;

pub use category::*;
pub use dashboard::*;
pub use email::*;
pub use project::*;
pub use public_content::*;
pub use settings::*;
pub use team::*;
pub use user::*;
