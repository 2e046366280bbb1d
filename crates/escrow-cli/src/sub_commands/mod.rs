pub mod address;
pub mod balance;
pub mod deploy;
pub mod escrow;
pub mod job_status;
pub mod pay;
