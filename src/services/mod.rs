pub mod booking_id;
pub mod conversation;
pub mod delay_queue;
pub mod pump;
pub mod session;
pub mod ticket;
pub mod transcript;
