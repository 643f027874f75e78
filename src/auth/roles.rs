//! Role model
//!
//! A single role per user; route groups carry static allow-lists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User roles, stored on the user record and carried in JWT claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    SalesManager,
    SalesExec,
    InventoryMgr,
    Support,
    Hr,
    Finance,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SalesManager => "sales_manager",
            Role::SalesExec => "sales_exec",
            Role::InventoryMgr => "inventory_mgr",
            Role::Support => "support",
            Role::Hr => "hr",
            Role::Finance => "finance",
            Role::Customer => "customer",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "sales_manager" => Some(Role::SalesManager),
            "sales_exec" => Some(Role::SalesExec),
            "inventory_mgr" => Some(Role::InventoryMgr),
            "support" => Some(Role::Support),
            "hr" => Some(Role::Hr),
            "finance" => Some(Role::Finance),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static allow-lists for route groups
pub mod allow {
    use super::Role::{self, *};

    /// Lead, opportunity, quotation and order routes
    pub const SALES_TEAM: &[Role] = &[Admin, SalesManager, SalesExec];
    /// Destructive sales operations (delete lead/opportunity)
    pub const SALES_MANAGERS: &[Role] = &[Admin, SalesManager];
    /// Customer routes include support staff
    pub const CUSTOMER_TEAM: &[Role] = &[Admin, SalesManager, SalesExec, Support];
    /// Invoice reads are open to the sales side as well
    pub const INVOICE_READ: &[Role] = &[Admin, Finance, SalesManager, SalesExec];
    /// Invoice writes and payment recording
    pub const INVOICE_WRITE: &[Role] = &[Admin, Finance, SalesManager];
    /// Ledger reads: finance plus the sales side
    pub const FINANCE_READ: &[Role] = &[Admin, Finance, SalesManager, SalesExec];
    /// Accounts and transactions
    pub const FINANCE_TEAM: &[Role] = &[Admin, Finance];
    /// Any staff role, used for catalog reads
    pub const STAFF: &[Role] = &[
        Admin,
        SalesManager,
        SalesExec,
        InventoryMgr,
        Support,
        Hr,
        Finance,
    ];
    /// Employees, departments, attendance, leaves, payroll
    pub const HR_TEAM: &[Role] = &[Admin, Hr];
    /// Product catalog writes
    pub const PRODUCT_WRITE: &[Role] = &[Admin, InventoryMgr];
    /// User administration
    pub const ADMIN_ONLY: &[Role] = &[Admin];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_strings() {
        for role in [
            Role::Admin,
            Role::SalesManager,
            Role::SalesExec,
            Role::InventoryMgr,
            Role::Support,
            Role::Hr,
            Role::Finance,
            Role::Customer,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::SalesManager).unwrap();
        assert_eq!(json, "\"sales_manager\"");
        let role: Role = serde_json::from_str("\"inventory_mgr\"").unwrap();
        assert_eq!(role, Role::InventoryMgr);
    }
}
