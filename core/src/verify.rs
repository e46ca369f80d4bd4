pub mod exec;
pub mod resource;
pub mod verifier;

pub use exec::ExecContext;
pub use verifier::Verifier;
