//! Tables, stored procedures and request options of the shop schema

use std::fmt;

/// Tables of the shop schema reachable through the REST API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Clients,
    Checkins,
    CheckinItems,
    CheckinMedia,
    ServiceApprovals,
    PartsServiceSessions,
    CheckoutSessions,
}

impl Table {
    /// Table name as exposed by the REST API
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Clients => "clients",
            Table::Checkins => "checkins",
            Table::CheckinItems => "checkin_items",
            Table::CheckinMedia => "checkin_media",
            Table::ServiceApprovals => "service_approvals",
            Table::PartsServiceSessions => "parts_service_sessions",
            Table::CheckoutSessions => "checkout_sessions",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored procedures exposed under `/rest/v1/rpc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcFunction {
    GenerateClientNumber,
    GenerateClientCredentials,
    VerifyClientCredentials,
    GetIncompleteClients,
    CleanupPendingClients,
    HasRole,
}

impl RpcFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcFunction::GenerateClientNumber => "generate_client_number",
            RpcFunction::GenerateClientCredentials => "generate_client_credentials",
            RpcFunction::VerifyClientCredentials => "verify_client_credentials",
            RpcFunction::GetIncompleteClients => "get_incomplete_clients",
            RpcFunction::CleanupPendingClients => "cleanup_pending_clients",
            RpcFunction::HasRole => "has_role",
        }
    }
}

impl fmt::Display for RpcFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count options for queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountOption {
    /// Exact count
    Exact,
}

impl CountOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountOption::Exact => "exact",
        }
    }
}

/// Options for returning data from writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOption {
    /// Return the written rows
    Representation,

    /// Return nothing
    Minimal,
}

impl ReturnOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnOption::Representation => "representation",
            ReturnOption::Minimal => "minimal",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}
