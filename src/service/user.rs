use crate::error::AppError;
use crate::model::marketplace::USERS;
use crate::query::{DataSource, FindManyArgs, Include, Predicate};
use crate::service::parse_id;
use serde_json::Value;
use uuid::Uuid;

/// Account fields shown on a profile; moderation flags stay with the admin lists.
const PROFILE_FIELDS: &[&str] = &["id", "name", "email", "role", "isApproved", "isEmailVerified", "createdAt", "updatedAt"];

pub struct UserService;

impl UserService {
    pub async fn me(source: &dyn DataSource, user_id: Uuid) -> Result<Value, AppError> {
        Self::find(source, user_id).await
    }

    /// Public profile of any user.
    pub async fn profile(source: &dyn DataSource, id: &str) -> Result<Value, AppError> {
        Self::find(source, parse_id("id", id)?).await
    }

    async fn find(source: &dyn DataSource, id: Uuid) -> Result<Value, AppError> {
        let mut args = FindManyArgs::new(Predicate::new().eq("id", id));
        args.take = Some(1);
        args.select = Some(PROFILE_FIELDS.iter().map(|f| f.to_string()).collect());
        args.include = vec![Include::new("profile"), Include::new("guideProfile")];
        source
            .collection(USERS)?
            .find_many(&args)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::MemorySource;
    use serde_json::json;

    const USER: &str = "0b3c6d5e-3333-4c1e-9d59-0a7f3e1c2b11";

    #[tokio::test]
    async fn profile_with_both_profiles() {
        let source = MemorySource::default().with(USERS, vec![json!({"id": USER, "name": "Ana"})]);
        let user = UserService::profile(&source, USER).await.unwrap();
        assert_eq!(user["name"], "Ana");
        let args = source.get(USERS).last_find();
        assert_eq!(args.take, Some(1));
        assert_eq!(args.include, vec![Include::new("profile"), Include::new("guideProfile")]);
        let select = args.select.unwrap();
        assert!(select.iter().any(|f| f == "isEmailVerified"));
        assert!(!select.iter().any(|f| f == "password" || f == "isBanned"));
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let source = MemorySource::default().with(USERS, vec![]);
        let err = UserService::me(&source, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(m) if m == "User not found"));
        let err = UserService::profile(&source, "me").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
