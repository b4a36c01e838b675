pub mod prelude;

pub mod category;
pub mod profile;
pub mod project;
pub mod project_media;
pub mod sea_orm_active_enums;
pub mod site_setting;
pub mod team_member;
pub mod user;
pub mod user_role;
