//! UI state and the pure reducers that update it.
//!
//! ```text
//! AppAction ──→ ArticleRequest ──→ perform ──→ ArticleAction ──→ Reducer ──→ State ──→ draw
//! ```

mod article;
mod flash;

pub use article::{ArticleReducer, ArticleState};
pub use flash::{FlashAction, FlashReducer, FlashState};

/// Transforms state in response to an action.
///
/// The only place state transitions happen. Must be pure: (State, Action) -> State.
pub trait Reducer {
    type State: Clone + PartialEq + Default;
    type Action;

    fn reduce(state: Self::State, action: Self::Action) -> Self::State;
}
