//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod rent;
pub mod rent_history;
pub mod student;

// Re-export specific types to avoid conflicts
pub use category::{
    CategoryStatus, Column as CategoryColumn, Entity as Category, Model as CategoryModel,
};
pub use rent::{Column as RentColumn, Entity as Rent, Model as RentModel, RentStatus};
pub use rent_history::{
    ApprovalStatus, Column as RentHistoryColumn, Entity as RentHistory,
    Model as RentHistoryModel,
};
pub use student::{
    Column as StudentColumn, Entity as Student, Model as StudentModel, StudentStatus,
};
