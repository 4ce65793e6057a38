// src/services/user_service.rs

use std::borrow::Cow;

use sqlx::SqlitePool;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::{
        auth::{User, UserFields, UserWrite},
        batch::{validate_batch, BatchOp, BatchOutcome},
    },
    services::auth::hash_pin,
};

/// Contador de admins ativos ao longo de um lote.
/// Nenhuma mudança pode levar o contador a zero.
#[derive(Debug)]
struct AdminGuard {
    active_admins: i64,
}

impl AdminGuard {
    fn new(active_admins: i64) -> Self {
        Self { active_admins }
    }

    /// `true` se a transição pode ser aplicada; o contador já fica ajustado.
    fn permits(&mut self, was_admin: bool, will_be_admin: bool) -> bool {
        match (was_admin, will_be_admin) {
            (true, false) if self.active_admins <= 1 => false,
            (true, false) => {
                self.active_admins -= 1;
                true
            }
            (false, true) => {
                self.active_admins += 1;
                true
            }
            _ => true,
        }
    }
}

fn pin_required() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let mut error = ValidationError::new("required");
    error.message = Some(Cow::from("pin"));
    errors.add("pin", error);
    errors
}

#[derive(Clone)]
pub struct UserService {
    pool: SqlitePool,
    user_repo: UserRepository,
    pin_cost: u32,
}

impl UserService {
    pub fn new(pool: SqlitePool, user_repo: UserRepository, pin_cost: u32) -> Self {
        Self { pool, user_repo, pin_cost }
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list().await
    }

    /// Aplica o lote de usuários mantendo pelo menos um admin ativo.
    /// `current_user_id` é quem está logado: a própria conta nunca é apagada.
    pub async fn apply_user_batch(
        &self,
        current_user_id: i64,
        ops: Vec<BatchOp<UserFields>>,
    ) -> Result<BatchOutcome, AppError> {
        let ops: Vec<_> = ops.into_iter().map(|op| op.map_fields(UserFields::normalized)).collect();
        validate_batch(&ops)?;
        if ops
            .iter()
            .any(|op| matches!(op, BatchOp::Insert { fields } if fields.pin.is_none()))
        {
            return Err(AppError::ValidationError(pin_required()));
        }

        // bcrypt antes da transação: nada de hashing com o banco travado.
        let mut writes = Vec::with_capacity(ops.len());
        for op in ops {
            let write = match op {
                BatchOp::Insert { fields } => BatchOp::Insert { fields: self.to_write(fields).await? },
                BatchOp::Update { id, fields } => BatchOp::Update { id, fields: self.to_write(fields).await? },
                BatchOp::Delete { id } => BatchOp::Delete { id },
            };
            writes.push(write);
        }

        let mut outcome = BatchOutcome::new();
        let mut tx = self.pool.begin().await?;
        let mut guard = AdminGuard::new(self.user_repo.count_active_admins(&mut *tx).await?);

        for op in writes {
            match op {
                BatchOp::Insert { fields } => {
                    guard.permits(false, fields.is_active_admin());
                    self.user_repo.insert(&mut *tx, &fields).await?;
                    outcome.inserted += 1;
                }
                BatchOp::Update { id, mut fields } => {
                    let Some(existing) = self.user_repo.find_by_id(&mut *tx, id).await? else {
                        outcome.skipped += 1;
                        continue;
                    };
                    if !guard.permits(existing.is_active_admin(), fields.is_active_admin()) {
                        tracing::warn!("🛡️ '{}' é o último admin ativo; permissões mantidas", existing.username);
                        fields.is_admin = true;
                        fields.active = true;
                        outcome.warnings.push(existing.username.clone());
                    }
                    self.user_repo.update(&mut *tx, id, &fields).await?;
                    outcome.updated += 1;
                }
                BatchOp::Delete { id } => {
                    let Some(existing) = self.user_repo.find_by_id(&mut *tx, id).await? else {
                        outcome.skipped += 1;
                        continue;
                    };
                    if id == current_user_id {
                        tracing::warn!("🛡️ '{}' tentou apagar a própria conta", existing.username);
                        outcome.skipped += 1;
                        outcome.warnings.push(existing.username);
                        continue;
                    }
                    if !guard.permits(existing.is_active_admin(), false) {
                        tracing::warn!("🛡️ '{}' é o último admin ativo; não foi apagado", existing.username);
                        outcome.skipped += 1;
                        outcome.warnings.push(existing.username);
                        continue;
                    }
                    self.user_repo.delete(&mut *tx, id).await?;
                    outcome.deleted += 1;
                }
            }
        }

        tx.commit().await?;
        tracing::info!(
            "👥 Usuários: +{} ~{} -{} (ignorados: {}, avisos: {})",
            outcome.inserted,
            outcome.updated,
            outcome.deleted,
            outcome.skipped,
            outcome.warnings.len()
        );
        Ok(outcome)
    }

    async fn to_write(&self, fields: UserFields) -> Result<UserWrite, AppError> {
        let pin_hash = match &fields.pin {
            Some(pin) => Some(hash_pin(pin, self.pin_cost).await?),
            None => None,
        };
        Ok(UserWrite {
            username: fields.username,
            pin_hash,
            is_admin: fields.is_admin,
            active: fields.active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{common::error::Entity, db::test_pool};

    async fn service() -> (UserService, i64) {
        let pool = test_pool().await;
        let repo = UserRepository::new(pool.clone());
        let admin = UserWrite {
            username: "Admin".into(),
            pin_hash: Some(hash_pin("0000", 4).await.unwrap()),
            is_admin: true,
            active: true,
        };
        let admin_id = repo.insert(&pool, &admin).await.unwrap();
        (UserService::new(pool, repo, 4), admin_id)
    }

    fn parse(raw: &str) -> Vec<BatchOp<UserFields>> {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn guard_never_reaches_zero() {
        let mut guard = AdminGuard::new(1);
        assert!(!guard.permits(true, false));
        assert!(guard.permits(false, true));
        assert!(guard.permits(true, false));
        assert!(!guard.permits(true, false));
        assert!(guard.permits(true, true));
        assert!(guard.permits(false, false));
    }

    #[tokio::test]
    async fn last_admin_demotion_is_reverted_with_warning() {
        let (users, admin_id) = service().await;
        let outcome = users
            .apply_user_batch(
                999,
                parse(&format!(
                    r#"[{{"op": "update", "id": {admin_id}, "username": "Admin", "is_admin": false}}]"#
                )),
            )
            .await
            .unwrap();

        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.warnings, vec!["Admin".to_string()]);
        let admin = users.list().await.unwrap().into_iter().find(|u| u.id == admin_id).unwrap();
        assert!(admin.is_active_admin());
    }

    #[tokio::test]
    async fn promotion_in_same_batch_allows_demotion() {
        let (users, admin_id) = service().await;
        let outcome = users
            .apply_user_batch(
                999,
                parse(&format!(
                    r#"[
                        {{"op": "insert", "username": "Chefin", "pin": "4321", "is_admin": true}},
                        {{"op": "update", "id": {admin_id}, "username": "Admin", "active": false}}
                    ]"#
                )),
            )
            .await
            .unwrap();

        assert!(outcome.warnings.is_empty());
        let list = users.list().await.unwrap();
        assert_eq!(list.iter().filter(|u| u.is_active_admin()).count(), 1);
        assert!(list.iter().any(|u| u.username == "Chefin" && u.is_active_admin()));
    }

    #[tokio::test]
    async fn cannot_delete_last_admin_or_self() {
        let (users, admin_id) = service().await;

        let outcome = users
            .apply_user_batch(999, parse(&format!(r#"[{{"op": "delete", "id": {admin_id}}}]"#)))
            .await
            .unwrap();
        assert_eq!((outcome.deleted, outcome.skipped), (0, 1));

        let outcome = users
            .apply_user_batch(
                admin_id,
                parse(&format!(
                    r#"[
                        {{"op": "insert", "username": "Zweit", "pin": "1111", "is_admin": true}},
                        {{"op": "delete", "id": {admin_id}}}
                    ]"#
                )),
            )
            .await
            .unwrap();
        assert_eq!((outcome.inserted, outcome.deleted, outcome.skipped), (1, 0, 1));
        assert_eq!(outcome.warnings, vec!["Admin".to_string()]);
    }

    #[tokio::test]
    async fn insert_requires_pin_and_unique_name() {
        let (users, _) = service().await;

        let err = users
            .apply_user_batch(1, parse(r#"[{"op": "insert", "username": "Ohne"}]"#))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = users
            .apply_user_batch(1, parse(r#"[{"op": "insert", "username": "Admin", "pin": "1234"}]"#))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateName(Entity::User)));
        assert_eq!(users.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_without_pin_keeps_old_hash() {
        let (users, admin_id) = service().await;
        let before = users.list().await.unwrap()[0].pin_hash.clone();

        users
            .apply_user_batch(
                admin_id,
                parse(&format!(
                    r#"[{{"op": "update", "id": {admin_id}, "username": "Chef", "pin": "", "is_admin": true}}]"#
                )),
            )
            .await
            .unwrap();

        let after = &users.list().await.unwrap()[0];
        assert_eq!(after.username, "Chef");
        assert_eq!(after.pin_hash, before);
    }
}
