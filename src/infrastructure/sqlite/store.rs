use crate::domain::entities::account::Account;
use crate::domain::entities::agent_run::AgentRunRecord;
use crate::domain::entities::portfolio::{Portfolio, Position};
use crate::domain::entities::transaction::Transaction;
use crate::domain::error::DomainError;
use crate::domain::ports::persistence::{PersistenceStore, TransactionFilter};
use crate::domain::values::persona::Persona;
use crate::domain::values::recommendation::TradeRecommendation;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::str::FromStr;
use std::sync::Mutex;

/// Sqlite-backed persistence. A single connection behind a mutex serializes
/// every portfolio mutation.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn row_to_portfolio(row: &rusqlite::Row) -> Result<Portfolio, rusqlite::Error> {
        let persona_str: String = row.get(2)?;
        let positions_json: String = row.get(4)?;
        let created_str: String = row.get(5)?;
        let updated_str: String = row.get(6)?;

        Ok(Portfolio {
            id: row.get(0)?,
            account_id: row.get(1)?,
            persona: parse_persona(&persona_str)?,
            cash: row.get(3)?,
            positions: parse_json::<Vec<Position>>(&positions_json)?,
            created_at: parse_timestamp(&created_str),
            updated_at: parse_timestamp(&updated_str),
        })
    }

    fn row_to_transaction(row: &rusqlite::Row) -> Result<Transaction, rusqlite::Error> {
        let persona_str: String = row.get(3)?;
        let action_str: String = row.get(4)?;
        let created_str: String = row.get(9)?;

        Ok(Transaction {
            id: row.get(0)?,
            portfolio_id: row.get(1)?,
            account_id: row.get(2)?,
            persona: parse_persona(&persona_str)?,
            action: action_str.parse().map_err(conversion_error)?,
            symbol: row.get(5)?,
            shares: row.get(6)?,
            price: row.get(7)?,
            reasoning: row.get(8)?,
            created_at: parse_timestamp(&created_str),
        })
    }

    fn row_to_run_record(row: &rusqlite::Row) -> Result<AgentRunRecord, rusqlite::Error> {
        let persona_str: String = row.get(2)?;
        let run_date_str: String = row.get(3)?;
        let recommendations_json: String = row.get(5)?;
        let executed_json: String = row.get(6)?;

        Ok(AgentRunRecord {
            id: row.get(0)?,
            account_id: row.get(1)?,
            persona: parse_persona(&persona_str)?,
            run_date: parse_timestamp(&run_date_str),
            analysis: row.get(4)?,
            recommendations: parse_json::<Vec<TradeRecommendation>>(&recommendations_json)?,
            executed_trades: parse_json::<Vec<String>>(&executed_json)?,
            value_before: row.get(7)?,
            value_after: row.get(8)?,
            duration_seconds: row.get(9)?,
        })
    }

    fn row_to_account(row: &rusqlite::Row) -> Result<Account, rusqlite::Error> {
        let created_str: String = row.get(3)?;
        Ok(Account {
            id: row.get(0)?,
            email: row.get(1)?,
            alerts_enabled: row.get::<_, i64>(2)? != 0,
            created_at: parse_timestamp(&created_str),
        })
    }
}

impl PersistenceStore for SqliteStore {
    fn load_portfolio(
        &self,
        account_id: &str,
        persona: Persona,
    ) -> Result<Option<Portfolio>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, account_id, persona, cash, positions, created_at, updated_at
                 FROM portfolios WHERE account_id = ?1 AND persona = ?2",
            )
            .map_err(db_error)?;
        let mut rows = stmt
            .query_map(
                params![account_id, persona.to_string()],
                Self::row_to_portfolio,
            )
            .map_err(db_error)?;
        rows.next().transpose().map_err(db_error)
    }

    fn save_portfolio(&self, portfolio: &Portfolio) -> Result<(), DomainError> {
        let positions = serde_json::to_string(&portfolio.positions)
            .map_err(|e| DomainError::Persistence(format!("Failed to encode positions: {e}")))?;
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO portfolios (id, account_id, persona, cash, positions, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                 cash = excluded.cash,
                 positions = excluded.positions,
                 updated_at = excluded.updated_at",
            params![
                portfolio.id,
                portfolio.account_id,
                portfolio.persona.to_string(),
                portfolio.cash,
                positions,
                portfolio.created_at.to_rfc3339(),
                portfolio.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Persistence(format!("Failed to save portfolio: {e}")))?;
        Ok(())
    }

    fn append_transaction(&self, transaction: &Transaction) -> Result<(), DomainError> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO transactions (id, portfolio_id, account_id, persona, action, symbol, shares, price, reasoning, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                transaction.id,
                transaction.portfolio_id,
                transaction.account_id,
                transaction.persona.to_string(),
                transaction.action.to_string(),
                transaction.symbol,
                transaction.shares,
                transaction.price,
                transaction.reasoning,
                transaction.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Persistence(format!("Failed to append transaction: {e}")))?;
        Ok(())
    }

    fn list_transactions(
        &self,
        account_id: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut sql = String::from(
            "SELECT id, portfolio_id, account_id, persona, action, symbol, shares, price, reasoning, created_at
             FROM transactions WHERE account_id = ?1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> =
            vec![Box::new(account_id.to_string())];

        if let Some(persona) = filter.persona {
            sql.push_str(&format!(" AND persona = ?{}", param_values.len() + 1));
            param_values.push(Box::new(persona.to_string()));
        }
        if let Some(since) = &filter.since {
            sql.push_str(&format!(" AND created_at >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(since.to_rfc3339()));
        }
        sql.push_str(" ORDER BY created_at DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT ?{}", param_values.len() + 1));
            param_values.push(Box::new(limit as i64));
        }

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql).map_err(db_error)?;
        let transactions = stmt
            .query_map(params_refs.as_slice(), Self::row_to_transaction)
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        Ok(transactions)
    }

    fn save_run_record(&self, record: &AgentRunRecord) -> Result<(), DomainError> {
        let recommendations = serde_json::to_string(&record.recommendations).map_err(|e| {
            DomainError::Persistence(format!("Failed to encode recommendations: {e}"))
        })?;
        let executed = serde_json::to_string(&record.executed_trades)
            .map_err(|e| DomainError::Persistence(format!("Failed to encode trade ids: {e}")))?;
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO agent_runs (id, account_id, persona, run_date, analysis, recommendations, executed_trades, value_before, value_after, duration_seconds)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.id,
                record.account_id,
                record.persona.to_string(),
                record.run_date.to_rfc3339(),
                record.analysis,
                recommendations,
                executed,
                record.value_before,
                record.value_after,
                record.duration_seconds,
            ],
        )
        .map_err(|e| DomainError::Persistence(format!("Failed to save run record: {e}")))?;
        Ok(())
    }

    fn load_latest_run_record(
        &self,
        account_id: &str,
        persona: Persona,
    ) -> Result<Option<AgentRunRecord>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, account_id, persona, run_date, analysis, recommendations, executed_trades, value_before, value_after, duration_seconds
                 FROM agent_runs WHERE account_id = ?1 AND persona = ?2
                 ORDER BY run_date DESC LIMIT 1",
            )
            .map_err(db_error)?;
        let mut rows = stmt
            .query_map(
                params![account_id, persona.to_string()],
                Self::row_to_run_record,
            )
            .map_err(db_error)?;
        rows.next().transpose().map_err(db_error)
    }

    fn create_account(&self, account: &Account) -> Result<(), DomainError> {
        let conn = lock(&self.conn)?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO accounts (id, email, alerts_enabled, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    account.id,
                    account.email,
                    account.alerts_enabled as i64,
                    account.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| DomainError::Persistence(format!("Failed to create account: {e}")))?;
        if inserted == 0 {
            return Err(DomainError::Validation(format!(
                "Account already exists: {}",
                account.id
            )));
        }
        Ok(())
    }

    fn get_account(&self, account_id: &str) -> Result<Option<Account>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare("SELECT id, email, alerts_enabled, created_at FROM accounts WHERE id = ?1")
            .map_err(db_error)?;
        let mut rows = stmt
            .query_map(params![account_id], Self::row_to_account)
            .map_err(db_error)?;
        rows.next().transpose().map_err(db_error)
    }

    fn list_accounts(&self) -> Result<Vec<Account>, DomainError> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, email, alerts_enabled, created_at FROM accounts ORDER BY created_at",
            )
            .map_err(db_error)?;
        let accounts = stmt
            .query_map([], Self::row_to_account)
            .map_err(db_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error)?;
        Ok(accounts)
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<std::sync::MutexGuard<'_, Connection>, DomainError> {
    conn.lock()
        .map_err(|e| DomainError::Persistence(e.to_string()))
}

fn db_error(e: rusqlite::Error) -> DomainError {
    DomainError::Persistence(e.to_string())
}

fn conversion_error(e: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(DomainError::Validation(e)),
    )
}

fn parse_persona(s: &str) -> Result<Persona, rusqlite::Error> {
    Persona::from_str(s).map_err(conversion_error)
}

fn parse_json<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, rusqlite::Error> {
    serde_json::from_str(s).map_err(|e| conversion_error(e.to_string()))
}

/// Stored timestamps are written by us in RFC3339; a row that fails to parse
/// falls back to now rather than poisoning the whole query.
fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
