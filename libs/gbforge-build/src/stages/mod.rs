pub mod assemble;
pub mod fix;
pub mod link;
