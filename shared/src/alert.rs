use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

impl Alert {
    pub fn new(level: AlertLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(AlertLevel::Danger, message)
    }
}

impl From<ValidationError> for Alert {
    fn from(err: ValidationError) -> Self {
        Alert::warning(err.to_string())
    }
}

/// Alerts currently on screen, keyed so each can be dismissed on its own
/// timer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alerts {
    next_id: u32,
    items: Vec<(u32, Alert)>,
}

impl Alerts {
    pub fn push(&mut self, alert: Alert) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.items.push((id, alert));
        id
    }

    pub fn dismiss(&mut self, id: u32) {
        self.items.retain(|(item, _)| *item != id);
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Alert)> {
        self.items.iter().map(|(id, alert)| (*id, alert))
    }

    pub fn last(&self) -> Option<&Alert> {
        self.items.last().map(|(_, alert)| alert)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
