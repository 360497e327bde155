/// Local notifications for the view layer, drained after every stimulus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    AttentionChanged(bool),
    /// The countdown moved to a value below the "ending soon" threshold.
    EndingSoon(u32),
    EndingSoonCleared,
    ConnectionLost,
}
