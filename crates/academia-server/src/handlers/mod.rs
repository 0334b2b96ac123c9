pub mod guard;
pub mod login;
pub mod rut;
