/// Which screen the terminal front-end is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    Welcome,
    Quiz,
    Result,
    /// Read-only walk over the finished session.
    Review,
}
