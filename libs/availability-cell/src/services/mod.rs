pub mod closure;
pub mod slots;
