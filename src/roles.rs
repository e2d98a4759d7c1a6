pub const ADMIN: &str = "admin";
pub const USER: &str = "user";

pub fn from_admin_flag(is_admin: bool) -> &'static str {
    if is_admin {
        ADMIN
    } else {
        USER
    }
}
