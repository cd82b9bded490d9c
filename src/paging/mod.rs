//! `PagingState`, its cursor convention, and the `ResultParser` contract.

mod parser;
mod state;

pub use parser::{
    result_parser, result_parser1, MultiStateParser, ParseOutcome, ResultParser,
    SingleStateParser, StateKey, StateUpdate,
};
pub use state::{CursorState, PagingState};
