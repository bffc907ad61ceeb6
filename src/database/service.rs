//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::database::{DatabasePool, ReminderRepository, UserRepository};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub reminders: ReminderRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            reminders: ReminderRepository::new(pool),
        }
    }
}
