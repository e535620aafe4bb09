pub mod analysis;
pub mod feedback;
pub mod guest_data;
pub mod toll_data;
pub mod user;
