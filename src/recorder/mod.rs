pub mod events;
pub mod frames;
pub mod listeners;
pub mod notify;
pub mod recorder;
pub mod translator;
pub mod wait;

pub use events::{UiEvent, UiEventKind};
pub use frames::FrameTracker;
pub use listeners::{Binding, ListenerRegistry, Subscription, SubscriptionId};
pub use notify::{Notification, NotificationLog, StatementObserver, notification_for};
pub use recorder::{OVERLAY_CLASS, Recorder, RecorderIdentity, StartOptions, browser_name};
pub use translator::Translator;
pub use wait::{Clock, ManualClock, SystemClock, WaitBucketer};
