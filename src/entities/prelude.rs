pub use super::category::Entity as Category;
pub use super::profile::Entity as Profile;
pub use super::project::Entity as Project;
pub use super::project_media::Entity as ProjectMedia;
pub use super::site_setting::Entity as SiteSetting;
pub use super::team_member::Entity as TeamMember;
pub use super::user::Entity as User;
pub use super::user_role::Entity as UserRoleAssignment;
