use crate::message::{Action, ActionKind};

/// Ordered record of the persisted actions since the last clear. Replayed in
/// full to every late joiner before it receives live broadcasts.
pub struct ActionLog {
    actions: Vec<Action>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Applies the classification table for one inbound action. A clear is
    /// appended and then truncated away in the same step, so the net state is
    /// an empty log and no observer can see the intermediate one.
    pub fn record(&mut self, action: &Action) {
        match action.classify() {
            ActionKind::Draw => self.append(action.clone()),
            ActionKind::Clear => {
                self.append(action.clone());
                self.truncate();
                log::debug!("action log truncated by clear");
            }
            ActionKind::Transient => {}
        }
    }

    pub fn append(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Empties the log. An empty canvas needs no record of the clear that
    /// produced it.
    pub fn truncate(&mut self) {
        self.actions.clear();
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(id: u64) -> Action {
        Action::decode(&format!(r#"{{"type":"draw","id":{}}}"#, id)).unwrap()
    }

    #[test]
    fn it_records_draw_actions_in_arrival_order() {
        let mut log = ActionLog::new();
        log.record(&draw(1));
        log.record(&draw(2));
        log.record(&draw(3));

        let ids: Vec<_> = log
            .actions()
            .iter()
            .map(|action| action.payload["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn it_keeps_transient_actions_out_of_the_log() {
        let mut log = ActionLog::new();
        log.record(&Action::decode(r#"{"type":"hand","x":1,"y":2}"#).unwrap());
        assert!(log.is_empty());
    }

    #[test]
    fn a_clear_leaves_the_log_empty() {
        let mut log = ActionLog::new();
        log.record(&draw(1));
        log.record(&draw(2));
        log.record(&Action::decode(r#"{"type":"clear"}"#).unwrap());
        assert!(log.is_empty());
    }

    #[test]
    fn a_clear_on_an_empty_log_is_a_noop() {
        let mut log = ActionLog::new();
        log.record(&Action::decode(r#"{"type":"clear"}"#).unwrap());
        assert!(log.is_empty());
    }

    #[test]
    fn drawing_resumes_after_a_clear() {
        let mut log = ActionLog::new();
        log.record(&draw(1));
        log.record(&Action::decode(r#"{"type":"clear"}"#).unwrap());
        log.record(&draw(2));

        assert_eq!(log.len(), 1);
        assert_eq!(log.actions()[0].payload["id"], 2);
    }
}
