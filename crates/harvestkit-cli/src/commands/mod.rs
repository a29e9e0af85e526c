pub mod check;
pub mod config;
pub mod doctor;
pub mod publish;
pub mod sync_wiki;
pub mod validate;
