//! Core data types for the ingestion pipeline
//! Pure data structures with no behavior beyond code-table lookups

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account type, resolved from the bureau `Account_Type` code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Personal Loan")]
    PersonalLoan,
    #[serde(rename = "Home Loan")]
    HomeLoan,
    Other,
}

impl AccountType {
    /// Bureau code table. Anything not listed is `Other`.
    const CODES: [(&'static str, AccountType); 3] = [
        ("10", AccountType::CreditCard),
        ("51", AccountType::PersonalLoan),
        ("52", AccountType::HomeLoan),
    ];

    pub fn from_code(code: &str) -> Self {
        Self::CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, t)| *t)
            .unwrap_or(AccountType::Other)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccountType::CreditCard => "Credit Card",
            AccountType::PersonalLoan => "Personal Loan",
            AccountType::HomeLoan => "Home Loan",
            AccountType::Other => "Other",
        }
    }

    /// Inverse of `label`, used when reading rows back from storage
    pub fn from_label(label: &str) -> Self {
        match label {
            "Credit Card" => AccountType::CreditCard,
            "Personal Loan" => AccountType::PersonalLoan,
            "Home Loan" => AccountType::HomeLoan,
            _ => AccountType::Other,
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Account status, resolved from the bureau `Account_Status` code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Closed,
    Unknown,
}

impl AccountStatus {
    /// Bureau code table. Several codes collapse to `Active`.
    const CODES: [(&'static str, AccountStatus); 4] = [
        ("11", AccountStatus::Active),
        ("13", AccountStatus::Closed),
        ("53", AccountStatus::Active),
        ("71", AccountStatus::Active),
    ];

    pub fn from_code(code: &str) -> Self {
        Self::CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, s)| *s)
            .unwrap_or(AccountStatus::Unknown)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccountStatus::Active => "Active",
            AccountStatus::Closed => "Closed",
            AccountStatus::Unknown => "Unknown",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "Active" => AccountStatus::Active,
            "Closed" => AccountStatus::Closed,
            _ => AccountStatus::Unknown,
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Revolving vs installment credit. Only `"R"` is revolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortfolioType {
    Revolving,
    Installment,
}

impl PortfolioType {
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("R") => PortfolioType::Revolving,
            _ => PortfolioType::Installment,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PortfolioType::Revolving => "Revolving",
            PortfolioType::Installment => "Installment",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "Revolving" => PortfolioType::Revolving,
            _ => PortfolioType::Installment,
        }
    }
}

impl std::fmt::Display for PortfolioType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicDetails {
    pub name: String,
    pub mobile_phone: String,
    pub pan: String,
    pub credit_score: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_accounts: i64,
    pub active_accounts: i64,
    pub closed_accounts: i64,
    pub current_balance: i64,
    pub secured_amount: i64,
    pub unsecured_amount: i64,
    pub last_7_days_enquiries: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditAccount {
    pub bank: String,
    pub account_number: String,
    pub account_type: AccountType,
    pub portfolio_type: PortfolioType,
    pub current_balance: i64,
    pub amount_overdue: i64,
    pub account_status: AccountStatus,
    pub open_date: String,
    pub closed_date: String,
    pub credit_limit: i64,
    pub address: String,
}

/// Canonical record extracted from one bureau report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditReport {
    pub report_number: String,
    pub report_date: String,
    pub basic_details: BasicDetails,
    pub report_summary: ReportSummary,
    pub credit_accounts: Vec<CreditAccount>,
}

/// A report as persisted, with storage metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    pub id: i32,
    #[serde(flatten)]
    pub report: CreditReport,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What an upsert did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Inserted,
    Updated,
}

impl std::fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteOutcome::Inserted => write!(f, "inserted"),
            WriteOutcome::Updated => write!(f, "updated"),
        }
    }
}

/// Batch ingestion statistics
#[derive(Debug, Default, Clone)]
pub struct IngestStats {
    pub inserted: usize,
    pub updated: usize,
    pub errors: usize,
}

impl IngestStats {
    pub fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Inserted => self.inserted += 1,
            WriteOutcome::Updated => self.updated += 1,
        }
    }
}

impl std::fmt::Display for IngestStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "inserted: {}, updated: {}, errors: {}",
            self.inserted, self.updated, self.errors
        )
    }
}

/// Database row from credit_reports table
#[derive(Debug, sqlx::FromRow)]
pub struct ReportRow {
    pub id: i32,
    pub report_number: String,
    pub report_date: String,
    pub name: String,
    pub mobile_phone: String,
    pub pan: String,
    pub credit_score: i64,
    pub total_accounts: i64,
    pub active_accounts: i64,
    pub closed_accounts: i64,
    pub current_balance: i64,
    pub secured_amount: i64,
    pub unsecured_amount: i64,
    pub last_7_days_enquiries: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReportRow {
    pub fn into_stored(self, credit_accounts: Vec<CreditAccount>) -> StoredReport {
        StoredReport {
            id: self.id,
            report: CreditReport {
                report_number: self.report_number,
                report_date: self.report_date,
                basic_details: BasicDetails {
                    name: self.name,
                    mobile_phone: self.mobile_phone,
                    pan: self.pan,
                    credit_score: self.credit_score,
                },
                report_summary: ReportSummary {
                    total_accounts: self.total_accounts,
                    active_accounts: self.active_accounts,
                    closed_accounts: self.closed_accounts,
                    current_balance: self.current_balance,
                    secured_amount: self.secured_amount,
                    unsecured_amount: self.unsecured_amount,
                    last_7_days_enquiries: self.last_7_days_enquiries,
                },
                credit_accounts,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Database row from credit_accounts table
#[derive(Debug, sqlx::FromRow)]
pub struct AccountRow {
    pub report_id: i32,
    pub bank: String,
    pub account_number: String,
    pub account_type: String,
    pub portfolio_type: String,
    pub current_balance: i64,
    pub amount_overdue: i64,
    pub account_status: String,
    pub open_date: String,
    pub closed_date: String,
    pub credit_limit: i64,
    pub address: String,
}

impl From<AccountRow> for CreditAccount {
    fn from(row: AccountRow) -> Self {
        CreditAccount {
            bank: row.bank,
            account_number: row.account_number,
            account_type: AccountType::from_label(&row.account_type),
            portfolio_type: PortfolioType::from_label(&row.portfolio_type),
            current_balance: row.current_balance,
            amount_overdue: row.amount_overdue,
            account_status: AccountStatus::from_label(&row.account_status),
            open_date: row.open_date,
            closed_date: row.closed_date,
            credit_limit: row.credit_limit,
            address: row.address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_codes() {
        assert_eq!(AccountType::from_code("10"), AccountType::CreditCard);
        assert_eq!(AccountType::from_code("51"), AccountType::PersonalLoan);
        assert_eq!(AccountType::from_code("52"), AccountType::HomeLoan);
        assert_eq!(AccountType::from_code("99"), AccountType::Other);
        assert_eq!(AccountType::from_code(""), AccountType::Other);
    }

    #[test]
    fn test_account_status_codes() {
        assert_eq!(AccountStatus::from_code("11"), AccountStatus::Active);
        assert_eq!(AccountStatus::from_code("13"), AccountStatus::Closed);
        assert_eq!(AccountStatus::from_code("53"), AccountStatus::Active);
        assert_eq!(AccountStatus::from_code("71"), AccountStatus::Active);
        assert_eq!(AccountStatus::from_code("99"), AccountStatus::Unknown);
    }

    #[test]
    fn test_portfolio_type_is_binary() {
        assert_eq!(PortfolioType::from_code(Some("R")), PortfolioType::Revolving);
        assert_eq!(PortfolioType::from_code(Some("I")), PortfolioType::Installment);
        assert_eq!(PortfolioType::from_code(Some("r")), PortfolioType::Installment);
        assert_eq!(PortfolioType::from_code(None), PortfolioType::Installment);
    }

    #[test]
    fn test_labels_round_trip_through_storage() {
        for t in [
            AccountType::CreditCard,
            AccountType::PersonalLoan,
            AccountType::HomeLoan,
            AccountType::Other,
        ] {
            assert_eq!(AccountType::from_label(t.label()), t);
        }
        for s in [AccountStatus::Active, AccountStatus::Closed, AccountStatus::Unknown] {
            assert_eq!(AccountStatus::from_label(s.label()), s);
        }
    }

    #[test]
    fn test_json_field_names() {
        let summary = ReportSummary {
            last_7_days_enquiries: 4,
            ..Default::default()
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["last7DaysEnquiries"], 4);
        assert_eq!(json["totalAccounts"], 0);

        let json = serde_json::to_value(AccountType::CreditCard).unwrap();
        assert_eq!(json, "Credit Card");
    }
}
