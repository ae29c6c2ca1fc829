pub mod ata;

pub use ata::associated_token_address;
