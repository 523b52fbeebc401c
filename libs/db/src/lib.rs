mod r#enum;
mod schema;

pub use r#enum::*;
pub use schema::*;
