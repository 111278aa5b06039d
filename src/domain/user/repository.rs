use async_trait::async_trait;

use super::{CreateUserDto, User};
use crate::shared::DomainResult;

/// Persistence port for users.
///
/// Implemented by the SeaORM repository and by the in-memory double.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Assigns id, `created_at` and the default role.
    async fn create(&self, dto: CreateUserDto) -> DomainResult<User>;
    async fn save(&self, user: User) -> DomainResult<User>;
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
