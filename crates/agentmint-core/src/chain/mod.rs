pub mod provider;
pub mod registrar;
