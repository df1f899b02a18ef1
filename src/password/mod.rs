mod policy;
mod strength;

pub use policy::{PasswordPolicy, PolicyViolation, validate_password};
pub use strength::{PasswordCheckResult, check_password, strength};
