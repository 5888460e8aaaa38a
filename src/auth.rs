use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// Resolved once at the system boundary; the engine never sees actor
// identity.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthorizationContext {
    pub is_admin: bool,
    pub is_cfo: bool,
    pub business_unit_codes: BTreeSet<String>,
}

impl AuthorizationContext {
    pub fn unrestricted() -> Self {
        Self {
            is_admin: true,
            is_cfo: false,
            business_unit_codes: BTreeSet::new(),
        }
    }

    pub fn for_business_units<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_admin: false,
            is_cfo: false,
            business_unit_codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    // Admin and CFO see everything; a record without a unit code is
    // visible to all.
    pub fn may_view(&self, business_unit: Option<&str>) -> bool {
        if self.is_admin || self.is_cfo {
            return true;
        }
        match business_unit {
            Some(code) => self.business_unit_codes.contains(code),
            None => true,
        }
    }

    pub fn may_submit(&self, business_unit: Option<&str>) -> bool {
        self.may_view(business_unit)
    }
}
