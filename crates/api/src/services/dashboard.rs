//! Admin dashboard and user administration.

use sqlx::PgPool;
use thiserror::Error;

use storehouse_core::{Role, UserId};

use crate::db::{
    CategoryRepository, DashboardRepository, ProductRepository, RepositoryError, UserRepository,
};
use crate::models::{DashboardSummary, Page, PageRequest, User};

/// Number of recent products and users shown on the dashboard.
pub const RECENT_LIMIT: i64 = 5;

/// Errors from dashboard operations.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("user not found")]
    UserNotFound,

    /// Admins may not remove their own admin role.
    #[error("you cannot remove your own admin role")]
    SelfDemotion,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct DashboardService<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Totals, price statistics, per-category counts and recent activity.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Repository` if any query fails.
    pub async fn summary(&self) -> Result<DashboardSummary, DashboardError> {
        let stats = DashboardRepository::new(self.pool);
        let totals = stats.totals().await?;
        let prices = stats.price_stats().await?;
        let categories = CategoryRepository::new(self.pool).list().await?;
        let recent_products = ProductRepository::new(self.pool).recent(RECENT_LIMIT).await?;
        let recent_users = UserRepository::new(self.pool).recent(RECENT_LIMIT).await?;

        Ok(DashboardSummary {
            totals,
            prices,
            categories,
            recent_products,
            recent_users,
        })
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Repository` if a query fails.
    pub async fn users(
        &self,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<User>, DashboardError> {
        Ok(UserRepository::new(self.pool).list(search, request).await?)
    }

    /// Change `target`'s role on behalf of `acting`.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::SelfDemotion` when an admin targets themselves
    /// with a non-admin role and `DashboardError::UserNotFound` for unknown users.
    pub async fn change_role(
        &self,
        acting: UserId,
        target: UserId,
        role: Role,
    ) -> Result<User, DashboardError> {
        ensure_not_self_demotion(acting, target, role)?;

        let user = UserRepository::new(self.pool)
            .set_role(target, role)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => DashboardError::UserNotFound,
                other => DashboardError::Repository(other),
            })?;

        tracing::info!(acting_user_id = %acting, user_id = %target, role = %role, "User role changed");
        Ok(user)
    }
}

const fn ensure_not_self_demotion(
    acting: UserId,
    target: UserId,
    role: Role,
) -> Result<(), DashboardError> {
    if acting.as_i32() == target.as_i32() && !role.is_admin() {
        return Err(DashboardError::SelfDemotion);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_demotion_rejected() {
        let me = UserId::new(1);
        assert!(matches!(
            ensure_not_self_demotion(me, me, Role::Customer),
            Err(DashboardError::SelfDemotion)
        ));
    }

    #[test]
    fn test_self_admin_noop_allowed() {
        let me = UserId::new(1);
        assert!(ensure_not_self_demotion(me, me, Role::Admin).is_ok());
    }

    #[test]
    fn test_demoting_others_allowed() {
        assert!(ensure_not_self_demotion(UserId::new(1), UserId::new(2), Role::Customer).is_ok());
    }
}
