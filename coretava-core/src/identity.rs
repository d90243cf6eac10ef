//! Read-or-create of the opaque customer id.

use crate::{IdentityConfig, IdentityError};
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub expires: DateTime<Utc>,
}

impl Cookie {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires > now && !self.value.trim().is_empty()
    }
}

/// Where the customer id is persisted between sessions.
pub trait CookieStore {
    fn get(&self, name: &str) -> Result<Option<Cookie>, IdentityError>;
    fn set(&mut self, cookie: Cookie) -> Result<(), IdentityError>;
}

#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    cookies: HashMap<String, Cookie>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieStore for MemoryCookieStore {
    fn get(&self, name: &str) -> Result<Option<Cookie>, IdentityError> {
        Ok(self.cookies.get(name).cloned())
    }

    fn set(&mut self, cookie: Cookie) -> Result<(), IdentityError> {
        self.cookies.insert(cookie.name.clone(), cookie);
        Ok(())
    }
}

/// Cookie jar kept as a JSON object on disk, keyed by cookie name.
#[derive(Debug, Clone)]
pub struct FileCookieStore {
    path: PathBuf,
}

impl FileCookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<HashMap<String, Cookie>, IdentityError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(source) => Err(IdentityError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl CookieStore for FileCookieStore {
    fn get(&self, name: &str) -> Result<Option<Cookie>, IdentityError> {
        Ok(self.read_all()?.remove(name))
    }

    fn set(&mut self, cookie: Cookie) -> Result<(), IdentityError> {
        let mut cookies = self.read_all()?;
        cookies.insert(cookie.name.clone(), cookie);
        let content = serde_json::to_string_pretty(&cookies)?;
        std::fs::write(&self.path, content).map_err(|source| IdentityError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Hands out the stable customer id, minting one on first visit.
#[derive(Debug, Clone)]
pub struct CustomerIdManager {
    cookie_name: String,
    lifetime_years: u32,
}

impl CustomerIdManager {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            lifetime_years: config.lifetime_years,
        }
    }

    pub fn customer_id(
        &self,
        store: &mut impl CookieStore,
        now: DateTime<Utc>,
    ) -> Result<String, IdentityError> {
        if let Some(cookie) = store.get(&self.cookie_name)? {
            if cookie.is_live(now) {
                return Ok(cookie.value);
            }
            tracing::debug!(cookie = %self.cookie_name, "customer id cookie expired");
        }

        let value = uuid::Uuid::new_v4().to_string();
        let expires = now
            .checked_add_months(Months::new(self.lifetime_years.saturating_mul(12)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        store.set(Cookie {
            name: self.cookie_name.clone(),
            value: value.clone(),
            expires,
        })?;
        tracing::info!(cookie = %self.cookie_name, %expires, "minted customer id");
        Ok(value)
    }
}
