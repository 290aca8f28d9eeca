pub mod capability;
pub mod error;
pub mod events;

pub mod core {
    pub mod key;
    pub mod value;
}

pub mod fetch {
    pub mod keys;
    pub mod list;
    pub mod offset;
}

pub mod query {
    pub mod attributes;
    pub mod filter;
    pub mod sort;
}

pub mod records {
    pub mod item;
    pub mod row;
}
