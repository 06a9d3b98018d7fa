pub mod record;
pub mod support;
