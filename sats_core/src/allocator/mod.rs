pub mod weight_allocator;
pub mod weight_vector;
