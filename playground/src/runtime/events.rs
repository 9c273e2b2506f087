use std::sync::mpsc;

use super::tabs::Tab;
use crate::core::logging::{error, info, warn};

/// Requests from experiences (or key handlers) to the application model.
/// Drained once per update before the active experience runs.
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    Alert(String),
    AlertAndLog(String, log::Level),
    NextTab,
    Quit,
    SelectTab(Tab),
    ToggleHud,
}

#[derive(Clone, Debug)]
pub struct AppEventSender {
    tx: mpsc::Sender<AppEvent>,
}

impl AppEventSender {
    pub fn emit(&self, event: AppEvent) {
        if let Err(e) = self.tx.send(event) {
            error!("Dropped app event: {:?}", e.0);
        }
    }

    pub fn alert(&self, message: impl Into<String>) {
        self.emit(AppEvent::Alert(message.into()));
    }

    pub fn alert_and_log(&self, message: impl Into<String>, level: log::Level) {
        let message = message.into();
        match level {
            log::Level::Error => error!("{}", message),
            log::Level::Warn => warn!("{}", message),
            _ => info!("{}", message),
        }
        self.emit(AppEvent::AlertAndLog(message, level));
    }
}

pub type AppEventReceiver = mpsc::Receiver<AppEvent>;

pub fn app_event_channel() -> (AppEventSender, AppEventReceiver) {
    let (tx, rx) = mpsc::channel();
    (AppEventSender { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_order() {
        let (tx, rx) = app_event_channel();
        tx.emit(AppEvent::SelectTab(Tab::Garden));
        tx.alert("hello");
        tx.emit(AppEvent::NextTab);

        let events: Vec<AppEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                AppEvent::SelectTab(Tab::Garden),
                AppEvent::Alert("hello".into()),
                AppEvent::NextTab,
            ]
        );
    }

    #[test]
    fn emitting_after_receiver_dropped_does_not_panic() {
        let (tx, rx) = app_event_channel();
        drop(rx);
        tx.emit(AppEvent::Quit);
    }
}
