pub mod database;
pub mod import;
pub mod jwt;
pub mod report;

pub use database::MongoDb;
pub use jwt::{Claims, JwtService};
