pub mod contact;
pub mod documents;
pub mod health;
