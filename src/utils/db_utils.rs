use sqlx::mysql::MySqlDatabaseError;

/// MySQL error number for `ER_LOCK_WAIT_TIMEOUT`.
const ER_LOCK_WAIT_TIMEOUT: u16 = 1205;
/// MySQL error number for `ER_LOCK_DEADLOCK`.
const ER_LOCK_DEADLOCK: u16 = 1213;

fn mysql_error_number(e: &sqlx::Error) -> Option<u16> {
    match e {
        sqlx::Error::Database(db_err) => db_err
            .try_downcast_ref::<MySqlDatabaseError>()
            .map(|mysql| mysql.number()),
        _ => None,
    }
}

/// Unique/foreign key violation (SQLSTATE 23000).
pub fn is_duplicate_key(e: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = e {
        return db_err.code().as_deref() == Some("23000");
    }
    false
}

/// The transaction waited longer than `innodb_lock_wait_timeout` for a row lock.
pub fn is_lock_wait_timeout(e: &sqlx::Error) -> bool {
    mysql_error_number(e) == Some(ER_LOCK_WAIT_TIMEOUT)
}

/// InnoDB picked this transaction as a deadlock victim and rolled it back.
pub fn is_deadlock(e: &sqlx::Error) -> bool {
    mysql_error_number(e) == Some(ER_LOCK_DEADLOCK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_not_classified() {
        let e = sqlx::Error::RowNotFound;
        assert!(!is_duplicate_key(&e));
        assert!(!is_lock_wait_timeout(&e));
        assert!(!is_deadlock(&e));
    }
}
