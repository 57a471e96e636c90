use std::fmt;

/// Notifications emitted by the preset index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetEvent {
    /// The recency ledger was modified
    RecentsChange,
}

/// Handle returned by [`Listeners::on`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Handler = Box<dyn Fn(PresetEvent) + Send + Sync>;

/// Registry of event handlers, called synchronously in subscription order
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    handlers: Vec<(ListenerId, PresetEvent, Handler)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, event: PresetEvent, handler: F) -> ListenerId
    where
        F: Fn(PresetEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, event, Box::new(handler)));
        id
    }

    /// Remove a handler; false if it was not registered
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _, _)| *h != id);
        self.handlers.len() != before
    }

    pub fn emit(&self, event: PresetEvent) {
        for (_, subscribed, handler) in &self.handlers {
            if *subscribed == event {
                handler(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.handlers.len())
            .finish()
    }
}
