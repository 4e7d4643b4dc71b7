//! Repository functions — one function per database operation.
//!
//! Every function takes a `&DbPool`, leases one connection, runs exactly one
//! statement, releases the lease and only then returns its
//! `Result<T, DbError>`.

pub mod pages;
