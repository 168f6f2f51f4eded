//! User repository - accounts, permission codenames, and actor loading.

use std::collections::BTreeSet;

use chrono::Utc;
use colmeia_core::entities::User;
use colmeia_core::identity::Actor;
use colmeia_core::ids::PREFIX_USER;
use colmeia_core::validation::ValidationErrors;

use crate::error::DatabaseError;
use crate::helpers::{bool_value, exists, format_datetime, get_bool, parse_datetime};
use crate::repos::{REQUIRED, already_exists};
use crate::service::ColmeiaService;

const SELECT_COLS: &str = "id, username, is_superuser, is_staff, created_at";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        is_superuser: get_bool(row, 2)?,
        is_staff: get_bool(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl ColmeiaService {
    pub async fn create_user(
        &self,
        username: &str,
        is_superuser: bool,
        is_staff: bool,
    ) -> Result<User, DatabaseError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationErrors::single("username", REQUIRED).into());
        }
        if exists(
            self.db().conn(),
            "SELECT 1 FROM users WHERE username = ?1",
            vec![username.into()],
        )
        .await?
        {
            return Err(ValidationErrors::single(
                "username",
                already_exists("Usuário", "Nome de usuário"),
            )
            .into());
        }

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_USER).await?;
        let tx = self.db().begin().await?;
        tx.execute(
            "INSERT INTO users (id, username, is_superuser, is_staff, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            libsql::params![
                id.as_str(),
                username,
                bool_value(is_superuser),
                bool_value(is_staff),
                format_datetime(&now)
            ],
        )
        .await?;
        tx.commit().await?;
        tracing::info!(user_id = %id, username, is_superuser, "user created");

        self.get_user(&id).await
    }

    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM users WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_user(&row)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM users WHERE username = ?1"),
                [username],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_user(&row)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM users ORDER BY username"),
                (),
            )
            .await?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(row_to_user(&row)?);
        }
        Ok(users)
    }

    /// Grant permission codenames to a user. Already granted codenames are kept.
    pub async fn grant_permissions(
        &self,
        user_id: &str,
        codenames: &[String],
    ) -> Result<(), DatabaseError> {
        let tx = self.db().begin().await?;
        for codename in codenames {
            tx.execute(
                "INSERT OR IGNORE INTO user_permissions (user_id, codename) VALUES (?1, ?2)",
                libsql::params![user_id, codename.trim()],
            )
            .await?;
        }
        tx.commit().await?;
        tracing::info!(user_id, granted = codenames.len(), "permissions granted");
        Ok(())
    }

    pub async fn list_permissions(&self, user_id: &str) -> Result<BTreeSet<String>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT codename FROM user_permissions WHERE user_id = ?1 ORDER BY codename",
                [user_id],
            )
            .await?;
        let mut codenames = BTreeSet::new();
        while let Some(row) = rows.next().await? {
            codenames.insert(row.get::<String>(0)?);
        }
        Ok(codenames)
    }

    /// Resolve the request identity. Returns `None` for unknown user ids.
    pub async fn load_actor(&self, user_id: &str) -> Result<Option<Actor>, DatabaseError> {
        let user = match self.get_user(user_id).await {
            Ok(user) => user,
            Err(DatabaseError::NoResult) => return Ok(None),
            Err(e) => return Err(e),
        };
        let permissions = self.list_permissions(&user.id).await?;
        Ok(Some(Actor {
            user_id: user.id,
            username: user.username,
            is_superuser: user.is_superuser,
            is_staff: user.is_staff,
            permissions,
        }))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::test_support::helpers::test_service;

    use super::*;

    #[tokio::test]
    async fn create_and_lookup_user() {
        let svc = test_service().await;
        let user = svc.create_user(" maria ", false, true).await.unwrap();
        assert_eq!(user.username, "maria");
        assert!(user.is_staff);
        assert!(!user.is_superuser);

        let by_name = svc.get_user_by_username("maria").await.unwrap();
        assert_eq!(by_name, user);
        assert_eq!(svc.list_users().await.unwrap(), vec![user]);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_validation_error() {
        let svc = test_service().await;
        svc.create_user("maria", false, true).await.unwrap();
        let err = svc.create_user("maria", false, true).await.unwrap_err();
        match err {
            DatabaseError::Validation(errors) => assert!(errors.contains("username")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn actor_carries_permissions() {
        let svc = test_service().await;
        let user = svc.create_user("joao", false, true).await.unwrap();
        svc.grant_permissions(
            &user.id,
            &["apiary.view_hive".to_string(), "apiary.add_hive".to_string()],
        )
        .await
        .unwrap();
        svc.grant_permissions(&user.id, &["apiary.view_hive".to_string()])
            .await
            .unwrap();

        let actor = svc.load_actor(&user.id).await.unwrap().unwrap();
        assert_eq!(
            actor.permissions.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["apiary.add_hive", "apiary.view_hive"]
        );
        assert!(actor.has_perm("apiary.add_hive"));
        assert!(svc.load_actor("usr-ffffffff").await.unwrap().is_none());
    }
}
