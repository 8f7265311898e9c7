pub mod doctor;
pub mod gateway;
pub mod kb;
pub mod onboard;
pub mod simulate;
pub mod status;
