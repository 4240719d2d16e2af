use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS accounts (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            alerts_enabled INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS portfolios (
            id TEXT PRIMARY KEY,
            account_id TEXT NOT NULL,
            persona TEXT NOT NULL,
            cash REAL NOT NULL,
            positions TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(account_id, persona)
        );

        CREATE TABLE IF NOT EXISTS transactions (
            id TEXT PRIMARY KEY,
            portfolio_id TEXT NOT NULL,
            account_id TEXT NOT NULL,
            persona TEXT NOT NULL,
            action TEXT NOT NULL,
            symbol TEXT NOT NULL,
            shares REAL NOT NULL,
            price REAL NOT NULL,
            reasoning TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS agent_runs (
            id TEXT PRIMARY KEY,
            account_id TEXT NOT NULL,
            persona TEXT NOT NULL,
            run_date TEXT NOT NULL,
            analysis TEXT NOT NULL,
            recommendations TEXT NOT NULL DEFAULT '[]',
            executed_trades TEXT NOT NULL DEFAULT '[]',
            value_before REAL NOT NULL,
            value_after REAL NOT NULL,
            duration_seconds REAL NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_portfolios_account ON portfolios(account_id, persona);
        CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_transactions_symbol ON transactions(symbol);
        CREATE INDEX IF NOT EXISTS idx_agent_runs_account ON agent_runs(account_id, persona, run_date);
        ",
    )
    .map_err(|e| format!("Migration failed: {e}"))
}
