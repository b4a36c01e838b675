mod admin_users;
mod uploads;

pub use admin_users::*;
pub use uploads::*;
