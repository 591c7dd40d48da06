pub mod import;
pub mod route;
