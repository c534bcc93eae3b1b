pub mod interface;
pub mod sysfs;
