use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

pub const ROLE_CUSTOMER: &str = "CUSTOMER";

/// JWT payload resolved by the identity layer. `sub` is the opaque holder
/// identifier the reservation core trusts as given; the core never looks
/// behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

impl Claims {
    /// Mint an anonymous customer identity, valid for `ttl_seconds`.
    pub fn guest(ttl_seconds: u64) -> Self {
        Self {
            sub: format!("guest-{}", Uuid::new_v4()),
            role: ROLE_CUSTOMER.to_owned(),
            exp: (Utc::now() + Duration::seconds(ttl_seconds as i64)).timestamp() as usize,
        }
    }

    /// Returns the holder id if this identity may book seats.
    pub fn require_customer(&self) -> CoreResult<&str> {
        if self.role != ROLE_CUSTOMER {
            return Err(CoreError::Unauthorized(format!(
                "role {} cannot reserve seats",
                self.role
            )));
        }
        Ok(&self.sub)
    }
}
