use uuid::Uuid;

use crate::models::message::Message;

/// One ongoing conversation
///
/// A session starts with the system instruction and grows by whole turns. Messages are
/// only added through [`Session::commit`], which the agent calls once a turn has fully
/// completed, so an abandoned or failed turn leaves the history untouched.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    messages: Vec<Message>,
}

impl Session {
    pub fn new<S: Into<String>>(system_prompt: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: vec![Message::system(system_prompt)],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub(crate) fn commit(&mut self, turn: Vec<Message>) {
        self.messages.extend(turn);
    }
}
