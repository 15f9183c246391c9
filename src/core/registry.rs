//! Username → account registry
//!
//! This module provides the `AccountRegistry` struct, the single source of
//! truth mapping usernames to shared [`Account`] handles.
//!
//! # Design
//!
//! The registry uses `DashMap` (a concurrent HashMap) whose shard locks only
//! ever guard the map structure. Lookups clone the `Arc<Account>` out and
//! release the shard before returning, so no caller can end up waiting on an
//! account lock while holding a registry lock.
//!
//! # Exactly-once creation
//!
//! Creation goes through the entry API: the shard stays write-locked between
//! the absence check and the insert, so concurrent `get_or_create` calls for
//! the same username observe one creation and receive the same account.

use crate::core::account::Account;
use crate::types::{Coins, LedgerError};
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe username → account map with lazy, exactly-once creation
///
/// Constructed once and handed to callers by reference (or `Arc`); there is
/// no process-wide instance.
#[derive(Debug)]
pub struct AccountRegistry {
    /// Accounts by username
    accounts: DashMap<String, Arc<Account>>,

    /// Starting balance of every new account
    initial_grant: Coins,
}

impl AccountRegistry {
    /// Create an empty registry granting `initial_grant` coins to new accounts
    pub fn new(initial_grant: Coins) -> Self {
        Self {
            accounts: DashMap::new(),
            initial_grant,
        }
    }

    /// Starting balance of every new account
    pub fn initial_grant(&self) -> Coins {
        self.initial_grant
    }

    /// Get the account for `username`, creating it on first reference
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<Account>)` - The one account registered for this username
    /// * `Err(LedgerError::InvalidUsername)` - If the username is blank
    ///
    /// # Thread Safety
    ///
    /// If multiple threads race to create the same username, exactly one
    /// creates it (and applies the initial grant); all receive the same `Arc`.
    pub fn get_or_create(&self, username: &str) -> Result<Arc<Account>, LedgerError> {
        validate_username(username)?;

        if let Some(existing) = self.accounts.get(username) {
            return Ok(Arc::clone(existing.value()));
        }

        let entry = self
            .accounts
            .entry(username.to_string())
            .or_insert_with(|| {
                tracing::info!(
                    username,
                    initial_grant = self.initial_grant,
                    "account created"
                );
                Arc::new(Account::new(username.to_string(), self.initial_grant))
            });

        Ok(Arc::clone(entry.value()))
    }

    /// Look up an existing account without creating one
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<Account>)` - If the account exists
    /// * `Err(LedgerError::UserNotFound)` - If it does not
    pub fn get(&self, username: &str) -> Result<Arc<Account>, LedgerError> {
        self.accounts
            .get(username)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| LedgerError::user_not_found(username))
    }

    /// Whether an account exists for `username`
    pub fn contains(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    /// All registered accounts, sorted by username
    ///
    /// Handles are collected first and the map is released before returning,
    /// so callers may lock the accounts freely.
    pub fn accounts(&self) -> Vec<Arc<Account>> {
        let mut accounts: Vec<Arc<Account>> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        accounts.sort_by(|a, b| a.username().cmp(b.username()));
        accounts
    }

    /// Number of registered accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether no account has been registered yet
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

fn validate_username(username: &str) -> Result<(), LedgerError> {
    if username.trim().is_empty() {
        return Err(LedgerError::invalid_username(username));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::thread;

    #[test]
    fn test_get_or_create_creates_with_initial_grant() {
        let registry = AccountRegistry::new(1000);

        let account = registry.get_or_create("alice").unwrap();

        assert_eq!(account.username(), "alice");
        assert_eq!(account.snapshot(None).unwrap().balance, 1000);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_or_create_returns_existing_account() {
        let registry = AccountRegistry::new(1000);

        let first = registry.get_or_create("alice").unwrap();
        first.lock(None).unwrap().balance = 10;

        let second = registry.get_or_create("alice").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.snapshot(None).unwrap().balance, 10);
    }

    #[rstest]
    #[case::empty("")]
    #[case::spaces("   ")]
    #[case::tab("\t")]
    fn test_get_or_create_rejects_blank_username(#[case] username: &str) {
        let registry = AccountRegistry::new(1000);

        let result = registry.get_or_create(username);

        assert_eq!(result.unwrap_err(), LedgerError::invalid_username(username));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_get_does_not_create() {
        let registry = AccountRegistry::new(1000);

        let result = registry.get("ghost");

        assert_eq!(result.unwrap_err(), LedgerError::user_not_found("ghost"));
        assert!(!registry.contains("ghost"));
    }

    #[test]
    fn test_accounts_are_sorted_by_username() {
        let registry = AccountRegistry::new(1000);
        for name in ["carol", "alice", "bob"] {
            registry.get_or_create(name).unwrap();
        }

        let names: Vec<String> = registry
            .accounts()
            .iter()
            .map(|a| a.username().to_string())
            .collect();

        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_concurrent_get_or_create_same_account() {
        let registry = Arc::new(AccountRegistry::new(1000));
        let mut handles = vec![];

        for _ in 0..100 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || registry.get_or_create("alice").unwrap()));
        }

        let accounts: Vec<Arc<Account>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(registry.len(), 1);
        assert!(accounts.iter().all(|a| Arc::ptr_eq(a, &accounts[0])));
        assert_eq!(accounts[0].snapshot(None).unwrap().balance, 1000);
    }

    #[test]
    fn test_concurrent_get_or_create_different_accounts() {
        let registry = Arc::new(AccountRegistry::new(1000));
        let mut handles = vec![];

        for i in 0..10 {
            let registry = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                let name = format!("user-{}", i);
                let account = registry.get_or_create(&name).unwrap();
                assert_eq!(account.username(), name);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 10);
    }
}
