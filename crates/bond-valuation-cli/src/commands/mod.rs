pub mod bond;
pub mod sensitivity;
pub mod time_value;
