pub mod logout;
pub mod save;
pub mod session_renewal;
