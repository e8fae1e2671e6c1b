pub mod handlers;
pub mod legacy;
pub mod record;
