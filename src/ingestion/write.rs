//! Write functions - persist reports as an idempotent upsert keyed on report number

use crate::ingestion::error::StoreError;
use crate::ingestion::types::{
    AccountRow, CreditAccount, CreditReport, ReportRow, StoredReport, WriteOutcome,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};

/// Persistence collaborator for extracted reports
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert the report, or fully replace the one sharing its report number
    async fn upsert(&self, report: &CreditReport) -> Result<(StoredReport, WriteOutcome), StoreError>;

    /// All reports, most recently created first
    async fn list(&self) -> Result<Vec<StoredReport>, StoreError>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgReportStore {
    db: PgPool,
}

impl PgReportStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(db))
    }

    /// Apply the schema in `migrations/`
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        info!("Database migrations applied");
        Ok(())
    }

    async fn replace_accounts(
        tx: &mut Transaction<'_, Postgres>,
        report_id: i32,
        accounts: &[CreditAccount],
    ) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM credit_accounts WHERE report_id = $1")
            .bind(report_id)
            .execute(&mut **tx)
            .await?;

        for (position, account) in accounts.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO credit_accounts (
                    report_id, position, bank, account_number, account_type, portfolio_type,
                    current_balance, amount_overdue, account_status, open_date, closed_date,
                    credit_limit, address
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(report_id)
            .bind(position as i32)
            .bind(&account.bank)
            .bind(&account.account_number)
            .bind(account.account_type.label())
            .bind(account.portfolio_type.label())
            .bind(account.current_balance)
            .bind(account.amount_overdue)
            .bind(account.account_status.label())
            .bind(&account.open_date)
            .bind(&account.closed_date)
            .bind(account.credit_limit)
            .bind(&account.address)
            .execute(&mut **tx)
            .await?;
        }

        debug!("Wrote {} accounts for report id {}", accounts.len(), report_id);
        Ok(())
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn upsert(&self, report: &CreditReport) -> Result<(StoredReport, WriteOutcome), StoreError> {
        let mut tx = self.db.begin().await?;

        // ON CONFLICT keeps the existence check and the write atomic;
        // xmax = 0 only for freshly inserted tuples
        let (report_id, inserted) = sqlx::query_as::<_, (i32, bool)>(
            r#"
            INSERT INTO credit_reports (
                report_number, report_date, name, mobile_phone, pan, credit_score,
                total_accounts, active_accounts, closed_accounts, current_balance,
                secured_amount, unsecured_amount, last_7_days_enquiries
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (report_number) DO UPDATE SET
                report_date = EXCLUDED.report_date,
                name = EXCLUDED.name,
                mobile_phone = EXCLUDED.mobile_phone,
                pan = EXCLUDED.pan,
                credit_score = EXCLUDED.credit_score,
                total_accounts = EXCLUDED.total_accounts,
                active_accounts = EXCLUDED.active_accounts,
                closed_accounts = EXCLUDED.closed_accounts,
                current_balance = EXCLUDED.current_balance,
                secured_amount = EXCLUDED.secured_amount,
                unsecured_amount = EXCLUDED.unsecured_amount,
                last_7_days_enquiries = EXCLUDED.last_7_days_enquiries,
                updated_at = NOW()
            RETURNING id, (xmax = 0) AS inserted
            "#,
        )
        .bind(&report.report_number)
        .bind(&report.report_date)
        .bind(&report.basic_details.name)
        .bind(&report.basic_details.mobile_phone)
        .bind(&report.basic_details.pan)
        .bind(report.basic_details.credit_score)
        .bind(report.report_summary.total_accounts)
        .bind(report.report_summary.active_accounts)
        .bind(report.report_summary.closed_accounts)
        .bind(report.report_summary.current_balance)
        .bind(report.report_summary.secured_amount)
        .bind(report.report_summary.unsecured_amount)
        .bind(report.report_summary.last_7_days_enquiries)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_accounts(&mut tx, report_id, &report.credit_accounts).await?;

        let row = sqlx::query_as::<_, ReportRow>("SELECT * FROM credit_reports WHERE id = $1")
            .bind(report_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let outcome = if inserted {
            WriteOutcome::Inserted
        } else {
            WriteOutcome::Updated
        };
        debug!("Report {} {} (id: {})", report.report_number, outcome, report_id);

        Ok((row.into_stored(report.credit_accounts.clone()), outcome))
    }

    async fn list(&self) -> Result<Vec<StoredReport>, StoreError> {
        let rows = sqlx::query_as::<_, ReportRow>(
            "SELECT * FROM credit_reports ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let account_rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT report_id, bank, account_number, account_type, portfolio_type,
                   current_balance, amount_overdue, account_status, open_date, closed_date,
                   credit_limit, address
            FROM credit_accounts
            WHERE report_id = ANY($1)
            ORDER BY report_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut accounts: HashMap<i32, Vec<CreditAccount>> = HashMap::new();
        for row in account_rows {
            accounts.entry(row.report_id).or_default().push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let report_accounts = accounts.remove(&row.id).unwrap_or_default();
                row.into_stored(report_accounts)
            })
            .collect())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i32,
    reports: Vec<StoredReport>,
}

/// In-process store with the same upsert semantics, for tests and local runs
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    state: Mutex<MemoryState>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // A panicked writer never leaves a half-replaced record behind
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn upsert(&self, report: &CreditReport) -> Result<(StoredReport, WriteOutcome), StoreError> {
        let mut state = self.lock();
        let now = Utc::now();

        if let Some(existing) = state
            .reports
            .iter_mut()
            .find(|r| r.report.report_number == report.report_number)
        {
            existing.report = report.clone();
            existing.updated_at = now;
            return Ok((existing.clone(), WriteOutcome::Updated));
        }

        state.next_id += 1;
        let stored = StoredReport {
            id: state.next_id,
            report: report.clone(),
            created_at: now,
            updated_at: now,
        };
        state.reports.push(stored.clone());
        Ok((stored, WriteOutcome::Inserted))
    }

    async fn list(&self) -> Result<Vec<StoredReport>, StoreError> {
        let mut reports = self.lock().reports.clone();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::types::{
        AccountStatus, AccountType, BasicDetails, PortfolioType, ReportSummary,
    };

    fn mock_report(report_number: &str, score: i64) -> CreditReport {
        CreditReport {
            report_number: report_number.to_string(),
            report_date: "20240115".to_string(),
            basic_details: BasicDetails {
                name: "Test Person".to_string(),
                mobile_phone: "9000000000".to_string(),
                pan: "N/A".to_string(),
                credit_score: score,
            },
            report_summary: ReportSummary {
                total_accounts: 1,
                active_accounts: 1,
                ..Default::default()
            },
            credit_accounts: vec![CreditAccount {
                bank: "Test Bank".to_string(),
                account_number: "0001".to_string(),
                account_type: AccountType::HomeLoan,
                portfolio_type: PortfolioType::Installment,
                current_balance: 100,
                amount_overdue: 0,
                account_status: AccountStatus::Active,
                open_date: "20200101".to_string(),
                closed_date: String::new(),
                credit_limit: 0,
                address: String::new(),
            }],
        }
    }

    #[tokio::test]
    async fn test_memory_upsert_inserts_then_updates() {
        let store = MemoryReportStore::new();

        let (first, outcome) = store.upsert(&mock_report("R1", 700)).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Inserted);

        let mut changed = mock_report("R1", 650);
        changed.credit_accounts.clear();
        let (second, outcome) = store.upsert(&changed).await.unwrap();

        assert_eq!(outcome, WriteOutcome::Updated);
        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.report, changed);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_memory_list_newest_first() {
        let store = MemoryReportStore::new();
        store.upsert(&mock_report("R1", 700)).await.unwrap();
        store.upsert(&mock_report("R2", 710)).await.unwrap();
        store.upsert(&mock_report("R1", 720)).await.unwrap();

        let numbers: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.report.report_number)
            .collect();

        // Re-ingesting R1 does not move it ahead of R2
        assert_eq!(numbers, vec!["R2", "R1"]);
    }

    #[tokio::test]
    #[ignore] // Needs TEST_DATABASE_URL pointing at a scratch database
    async fn test_pg_upsert_overwrites() {
        let url = std::env::var("TEST_DATABASE_URL").unwrap();
        let store = PgReportStore::connect(&url, 2).await.unwrap();
        store.migrate().await.unwrap();

        let number = format!("TEST-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
        let (_, outcome) = store.upsert(&mock_report(&number, 700)).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Inserted);

        let (stored, outcome) = store.upsert(&mock_report(&number, 640)).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Updated);
        assert_eq!(stored.report.basic_details.credit_score, 640);

        let matching: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.report.report_number == number)
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].report, mock_report(&number, 640));
    }
}
