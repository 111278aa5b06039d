use super::UserRole;

/// Input for [`UsersRepository::create`](super::UsersRepository::create).
/// The password is already hashed at this point.
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Option<UserRole>,
}
