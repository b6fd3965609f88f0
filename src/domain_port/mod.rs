// store

mod token_store;

pub use token_store::*;

// capability

mod clock;

pub use clock::*;
