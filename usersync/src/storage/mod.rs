mod data_store;
mod schema_validation;

pub(crate) use data_store::{DB_TABLE_USERS, GENERIC_DATA_STORE};

// Re-export schema validation function for internal use
pub(crate) use schema_validation::validate_postgres_table_schema;
