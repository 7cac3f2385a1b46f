//! In-memory `AccountStore` used by unit tests in place of Postgres.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::accounts::model::{Account, NewAccount};
use crate::accounts::store::{AccountStore, StoreError};

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<Vec<Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, email: &str) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    /// Overwrites a record directly, bypassing the trait. Lets tests force
    /// states like an already-expired reset token.
    pub fn put(&self, account: Account) {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(slot) = accounts.iter_mut().find(|a| a.id == account.id) {
            *slot = account;
        } else {
            accounts.push(account);
        }
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.get(email))
    }

    async fn find_by_active_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| {
                a.reset_token.as_deref() == Some(token)
                    && a.reset_token_expiry.map(|exp| exp > now).unwrap_or(false)
            })
            .cloned())
    }

    async fn create(&self, new: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        // Check and insert under one lock, like the unique index does.
        if accounts.iter().any(|a| a.email == new.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let account = Account {
            id: Uuid::new_v4(),
            fullname: new.fullname,
            email: new.email,
            password_hash: new.password_hash,
            school: new.school,
            reset_token: None,
            reset_token_expiry: None,
            created_at: OffsetDateTime::now_utc(),
        };
        accounts.push(account.clone());
        Ok(account)
    }

    async fn save(&self, account: &Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().unwrap();
        let slot = accounts
            .iter_mut()
            .find(|a| a.id == account.id)
            .ok_or_else(|| StoreError::Other(anyhow::anyhow!("no such account")))?;
        slot.password_hash = account.password_hash.clone();
        slot.reset_token = account.reset_token.clone();
        slot.reset_token_expiry = account.reset_token_expiry;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            fullname: "Test User".into(),
            email: email.into(),
            password_hash: "$argon2id$fake".into(),
            school: None,
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let store = MemoryAccountStore::new();
        store.create(new_account("a@x.com")).await.unwrap();
        let err = store.create(new_account("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn expired_token_behaves_like_no_match() {
        let store = MemoryAccountStore::new();
        let mut acc = store.create(new_account("a@x.com")).await.unwrap();
        let now = OffsetDateTime::now_utc();

        acc.set_pending_reset("deadbeef".into(), now + time::Duration::hours(1));
        store.save(&acc).await.unwrap();
        assert!(store
            .find_by_active_reset_token("deadbeef", now)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_by_active_reset_token("wrong", now)
            .await
            .unwrap()
            .is_none());

        // Past expiry: same outcome as a wrong token.
        acc.set_pending_reset("deadbeef".into(), now - time::Duration::seconds(1));
        store.save(&acc).await.unwrap();
        assert!(store
            .find_by_active_reset_token("deadbeef", now)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn save_persists_all_mutable_fields_together() {
        let store = MemoryAccountStore::new();
        let mut acc = store.create(new_account("a@x.com")).await.unwrap();
        acc.password_hash = "$argon2id$new".into();
        acc.set_pending_reset(
            "cafebabe".into(),
            OffsetDateTime::now_utc() + time::Duration::hours(1),
        );
        store.save(&acc).await.unwrap();

        let stored = store.get("a@x.com").unwrap();
        assert_eq!(stored.password_hash, "$argon2id$new");
        assert_eq!(stored.reset_token.as_deref(), Some("cafebabe"));
    }
}
