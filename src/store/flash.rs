use std::time::Instant;

use crate::models::FlashMessage;

use super::Reducer;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlashState {
    pub messages: Vec<FlashMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlashAction {
    Add(FlashMessage),
    Remove(String),
    /// Drops every message whose deadline is at or before the given instant.
    Expire(Instant),
}

pub struct FlashReducer;

impl Reducer for FlashReducer {
    type State = FlashState;
    type Action = FlashAction;

    fn reduce(mut state: FlashState, action: FlashAction) -> FlashState {
        match action {
            FlashAction::Add(message) => state.messages.push(message),
            FlashAction::Remove(id) => state.messages.retain(|m| m.id != id),
            FlashAction::Expire(now) => state.messages.retain(|m| m.expires_at > now),
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FlashKind;
    use std::time::Duration;

    #[test]
    fn add_then_remove_by_id() {
        let keep = FlashMessage::new(FlashKind::Info, "keep", Duration::from_secs(5));
        let drop = FlashMessage::new(FlashKind::Error, "drop", Duration::from_secs(5));
        let drop_id = drop.id.clone();

        let state = FlashReducer::reduce(FlashState::default(), FlashAction::Add(keep.clone()));
        let state = FlashReducer::reduce(state, FlashAction::Add(drop));
        assert_eq!(state.messages.len(), 2);

        let state = FlashReducer::reduce(state, FlashAction::Remove(drop_id));
        assert_eq!(state.messages, vec![keep]);
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let msg = FlashMessage::new(FlashKind::Success, "saved", Duration::from_secs(5));
        let state = FlashReducer::reduce(FlashState::default(), FlashAction::Add(msg));
        let state = FlashReducer::reduce(state, FlashAction::Remove("nope".into()));
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn expire_drops_only_elapsed_messages() {
        let short = FlashMessage::new(FlashKind::Info, "short", Duration::from_secs(1));
        let long = FlashMessage::new(FlashKind::Info, "long", Duration::from_secs(60));
        let later = short.expires_at + Duration::from_millis(1);

        let state = FlashReducer::reduce(FlashState::default(), FlashAction::Add(short));
        let state = FlashReducer::reduce(state, FlashAction::Add(long));
        let state = FlashReducer::reduce(state, FlashAction::Expire(later));

        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].message, "long");
    }
}
