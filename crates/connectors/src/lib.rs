pub mod error;
pub mod provider;

pub mod events {
    pub mod bus;
}

pub mod memory {
    pub mod array;
    pub mod options;
}
