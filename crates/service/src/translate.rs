//! Store failure -> `ServiceError` mapping, applied at every service call site.

use sea_orm::{DbErr, SqlErr};
use tracing::error;

use crate::errors::ServiceError;
use crate::store::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    List,
    Read,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Read => "read",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

enum Constraint {
    ForeignKey,
    Unique,
}

fn constraint_of(err: &DbErr) -> Option<Constraint> {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => return Some(Constraint::ForeignKey),
        Some(SqlErr::UniqueConstraintViolation(_)) => return Some(Constraint::Unique),
        _ => {}
    }
    // drivers that do not expose error codes
    let msg = err.to_string().to_lowercase();
    if msg.contains("foreign key constraint") {
        Some(Constraint::ForeignKey)
    } else if msg.contains("unique constraint") || msg.contains("duplicate key") {
        Some(Constraint::Unique)
    } else {
        None
    }
}

/// Maps failures of one operation on one resource.
#[derive(Clone, Copy, Debug)]
pub struct ErrorTranslator {
    resource: &'static str,
    operation: Operation,
    id: Option<i32>,
}

impl ErrorTranslator {
    pub fn new(resource: &'static str, operation: Operation) -> Self { Self { resource, operation, id: None } }

    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn translate(&self, err: StoreError) -> ServiceError {
        match err {
            StoreError::RowAbsent(id) => ServiceError::not_found(self.resource, id),
            StoreError::DanglingReference { resource, id } => ServiceError::not_found(resource, id),
            StoreError::UnknownSortKey(key) => ServiceError::validation("sort", format!("unknown sort property `{key}`")),
            StoreError::Db(e) => self.translate_db(e),
        }
    }

    fn translate_db(&self, err: DbErr) -> ServiceError {
        // a lazy reference that pointed at nothing surfaces here on flush
        if let (DbErr::RecordNotUpdated | DbErr::RecordNotFound(_), Some(id)) = (&err, self.id) {
            return ServiceError::not_found(self.resource, id);
        }
        match (constraint_of(&err), self.operation, self.id) {
            (Some(Constraint::ForeignKey), Operation::Delete, Some(id)) => {
                ServiceError::IntegrityConflict { resource: self.resource, id }
            }
            (Some(Constraint::ForeignKey), _, _) => {
                ServiceError::validation("references", "referenced record does not exist")
            }
            (Some(Constraint::Unique), _, _) => ServiceError::validation("unique", "value already in use"),
            (None, _, _) => {
                error!(
                    resource = self.resource,
                    operation = self.operation.as_str(),
                    id = ?self.id,
                    error = %err,
                    "unmapped storage failure"
                );
                ServiceError::Storage
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_absent_is_not_found() {
        let t = ErrorTranslator::new("product", Operation::Delete).with_id(1000);
        let err = t.translate(StoreError::RowAbsent(1000));
        assert!(matches!(err, ServiceError::NotFound { resource: "product", id: 1000 }));
    }

    #[test]
    fn deferred_update_failure_is_not_found() {
        let t = ErrorTranslator::new("category", Operation::Update).with_id(7);
        assert!(matches!(
            t.translate(DbErr::RecordNotUpdated.into()),
            ServiceError::NotFound { resource: "category", id: 7 }
        ));
        assert!(matches!(
            t.translate(DbErr::RecordNotFound("gone".into()).into()),
            ServiceError::NotFound { resource: "category", id: 7 }
        ));
    }

    #[test]
    fn dangling_reference_names_the_target() {
        let t = ErrorTranslator::new("product", Operation::Insert);
        let err = t.translate(StoreError::DanglingReference { resource: "category", id: 42 });
        assert!(matches!(err, ServiceError::NotFound { resource: "category", id: 42 }));
    }

    #[test]
    fn constraint_messages_are_recognised() {
        let t = ErrorTranslator::new("category", Operation::Delete).with_id(1);
        let fk = DbErr::Custom("FOREIGN KEY constraint failed".into());
        assert!(matches!(t.translate(fk.into()), ServiceError::IntegrityConflict { resource: "category", id: 1 }));

        let t = ErrorTranslator::new("user", Operation::Insert);
        let dup = DbErr::Custom("UNIQUE constraint failed: user.email".into());
        assert!(matches!(t.translate(dup.into()), ServiceError::Validation { ref field, .. } if field == "unique"));
    }

    #[test]
    fn everything_else_is_storage() {
        let t = ErrorTranslator::new("product", Operation::List);
        assert!(matches!(t.translate(DbErr::Custom("disk on fire".into()).into()), ServiceError::Storage));
        let err = t.translate(StoreError::UnknownSortKey("colour".into()));
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "sort"));
    }
}
