pub mod dice;
pub mod events;
pub mod token;

pub use dice::IDice;
pub use events::{ContractEvent, DecodedEvent, EventKind};
pub use token::IERC20;
