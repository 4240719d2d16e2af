use crate::domain::entities::account::Account;
use crate::domain::entities::agent_run::AgentRunRecord;
use crate::domain::entities::portfolio::Portfolio;
use crate::domain::entities::transaction::Transaction;
use crate::domain::error::DomainError;
use crate::domain::values::persona::Persona;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub persona: Option<Persona>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

/// Storage for portfolios, the transaction audit trail, run records, and
/// accounts. Portfolios are upserted; transactions and run records are
/// append-only.
pub trait PersistenceStore: Send + Sync {
    fn load_portfolio(
        &self,
        account_id: &str,
        persona: Persona,
    ) -> Result<Option<Portfolio>, DomainError>;

    fn save_portfolio(&self, portfolio: &Portfolio) -> Result<(), DomainError>;

    fn append_transaction(&self, transaction: &Transaction) -> Result<(), DomainError>;

    fn list_transactions(
        &self,
        account_id: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, DomainError>;

    fn save_run_record(&self, record: &AgentRunRecord) -> Result<(), DomainError>;

    fn load_latest_run_record(
        &self,
        account_id: &str,
        persona: Persona,
    ) -> Result<Option<AgentRunRecord>, DomainError>;

    fn create_account(&self, account: &Account) -> Result<(), DomainError>;

    fn get_account(&self, account_id: &str) -> Result<Option<Account>, DomainError>;

    fn list_accounts(&self) -> Result<Vec<Account>, DomainError>;
}
